//! eclipse-gen's main application entry point.
//! Parses arguments, loads the build description and generates one
//! project per Eclipse project descriptor.

use eclipse_gen::{
    cli::{get_args, Args},
    config::{load_description, GeneratorConfig},
    descriptor::BuildObject,
    error::{default_error_handler, Error, Result},
    generator::Generator,
    renderer::MiniJinjaRenderer,
    summary::ProjectSummaryReporter,
};

/// Main application entry point.
fn main() {
    let args = get_args();

    env_logger::Builder::new()
        .filter_level(if args.verbose {
            log::LevelFilter::Trace
        } else {
            log::LevelFilter::Warn
        })
        .init();

    if let Err(err) = run(args) {
        default_error_handler(err);
    }
}

/// Generates every project of the description.
///
/// A failing project is reported and skipped; the run fails at the end if
/// any project failed.
fn run(args: Args) -> Result<()> {
    let description = load_description(&args.description)?;

    let mut config = GeneratorConfig::new(args.topsrcdir, args.topobjdir);
    if let Some(templates) = args.templates {
        config = config.with_template_dir(templates);
    }

    let renderer = MiniJinjaRenderer::new();
    let reporter = ProjectSummaryReporter;
    let mut generator = Generator::new(config, &renderer, &reporter);

    let mut failures = 0;
    for object in &description.objects {
        if let Err(e) = generator.consume(object) {
            failures += 1;
            let name = match object {
                BuildObject::EclipseProject(data) => data.project.name.as_str(),
                _ => "build object",
            };
            log::error!("Failed to generate {name}: {e}");
        }
    }

    println!("{}", generator.detailed_summary());

    if failures > 0 {
        return Err(Error::ConfigError(format!("{failures} project(s) failed to generate")));
    }
    Ok(())
}
