use std::io;

use eclipse_gen::error::Error;

#[test]
fn test_error_conversion() {
    let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
    let err: Error = io_err.into();

    match err {
        Error::IoError(_) => (),
        _ => panic!("Expected IoError variant"),
    }
}

#[test]
fn test_error_display() {
    let err = Error::ConfigError("invalid description".to_string());
    assert_eq!(err.to_string(), "Configuration error: invalid description.");

    let err = Error::UnresolvedVariableError {
        file: ".classpath".to_string(),
        variable: "IDE_NOPE".to_string(),
    };
    assert_eq!(err.to_string(), "Template '.classpath' references unknown variable 'IDE_NOPE'.");

    let err = Error::DestinationCollisionError {
        project: "Fennec".to_string(),
        destination: "src".to_string(),
    };
    assert_eq!(err.to_string(), "Project 'Fennec' stages more than one file at 'src'.");
}

#[test]
fn test_error_project() {
    let err = Error::DuplicateProjectError { project: "Fennec".to_string() };
    assert_eq!(err.project(), Some("Fennec"));
    assert!(err.is_configuration());

    let err = Error::InvalidDestinationError {
        project: "Fennec".to_string(),
        destination: "../Victim".to_string(),
    };
    assert_eq!(err.project(), Some("Fennec"));
    assert!(err.is_configuration());

    let err = Error::TemplateDoesNotExistsError { template_dir: "/t".to_string() };
    assert_eq!(err.project(), None);
    assert!(!err.is_configuration());
}
