//! Error handling for eclipse-gen.
//! Defines the error type and result alias used throughout the generator.

use thiserror::Error;

/// Errors that can occur while generating IDE projects.
///
/// Configuration errors are detected before anything is written to disk;
/// filesystem and template errors abort the descriptor being processed.
#[derive(Error, Debug)]
pub enum Error {
    /// Represents errors that occur during file system operations
    #[error("IO error: {0}.")]
    IoError(#[from] std::io::Error),

    /// Represents errors while walking a directory tree
    #[error("Directory walk error: {0}.")]
    WalkError(#[from] walkdir::Error),

    /// Represents errors in glob patterns used by pattern copies
    #[error("Glob pattern error: {0}.")]
    GlobError(#[from] globset::Error),

    /// Represents errors that occur during template parsing or rendering
    #[error("Template rendering error: {0}.")]
    MinijinjaError(#[from] minijinja::Error),

    /// Represents errors in the build description document
    #[error("Configuration error: {0}.")]
    ConfigError(String),

    #[error("Project '{project}' is missing required field '{field}'.")]
    MissingFieldError { project: String, field: String },

    #[error("Project name '{project}' cannot be used as a directory name.")]
    InvalidProjectNameError { project: String },

    /// Two staged files would land on the same output path
    #[error("Project '{project}' stages more than one file at '{destination}'.")]
    DestinationCollisionError { project: String, destination: String },

    /// A staged file would land outside the project directory or on the directory itself
    #[error("Project '{project}' stages a file at '{destination}', outside its project directory.")]
    InvalidDestinationError { project: String, destination: String },

    /// Two descriptors target the same output project directory
    #[error("Project '{project}' was already generated in this run.")]
    DuplicateProjectError { project: String },

    #[error("Template directory '{template_dir}' does not exist.")]
    TemplateDoesNotExistsError { template_dir: String },

    #[error("Template '{file}' references unknown variable '{variable}'.")]
    UnresolvedVariableError { file: String, variable: String },

    #[error("Invalid staging manifest at line {line}: {reason}.")]
    ManifestParseError { line: usize, reason: String },
}

impl Error {
    /// Returns the project name this error is attributed to, if any.
    pub fn project(&self) -> Option<&str> {
        match self {
            Error::MissingFieldError { project, .. }
            | Error::InvalidProjectNameError { project }
            | Error::DestinationCollisionError { project, .. }
            | Error::InvalidDestinationError { project, .. }
            | Error::DuplicateProjectError { project } => Some(project),
            _ => None,
        }
    }

    /// Whether this error was raised before any filesystem write.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::ConfigError(_)
                | Error::MissingFieldError { .. }
                | Error::InvalidProjectNameError { .. }
                | Error::DestinationCollisionError { .. }
                | Error::InvalidDestinationError { .. }
                | Error::DuplicateProjectError { .. }
        )
    }
}

/// Convenience type alias for Results with [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Default error handler that prints the error and exits the program.
///
/// # Arguments
/// * `err` - The Error to handle
pub fn default_error_handler(err: Error) {
    eprintln!("{err}");
    std::process::exit(1);
}
