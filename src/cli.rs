//! Command-line interface implementation for eclipse-gen.
//! Provides argument parsing and help text formatting using clap.

use clap::{error::ErrorKind, CommandFactory, Parser};
use std::path::PathBuf;

/// Command-line arguments structure for eclipse-gen.
#[derive(Parser, Debug)]
#[command(author, version, about = "eclipse-gen: IDE project generator for Android build descriptions", long_about = None)]
pub struct Args {
    /// Build description file (JSON or YAML)
    #[arg(value_name = "DESCRIPTION")]
    pub description: PathBuf,

    /// Top-level source directory
    #[arg(long, value_name = "DIR")]
    pub topsrcdir: PathBuf,

    /// Top-level object directory; projects are written to <DIR>/android_eclipse
    #[arg(long, value_name = "DIR")]
    pub topobjdir: PathBuf,

    /// Template directory, defaults to the bundled Android Eclipse templates
    #[arg(long, value_name = "DIR")]
    pub templates: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Parses command line arguments and returns the Args structure.
///
/// # Exits
/// * With status code 1 if required arguments are missing
/// * With clap's default error handling for other argument errors
pub fn get_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            if e.kind() == ErrorKind::MissingRequiredArgument {
                let _ = Args::command()
                    .help_template(
                        r#"{about-section}
{usage-heading} {usage}

{all-args}
{after-help}
"#,
                    )
                    .print_help();
                std::process::exit(1);
            } else {
                e.exit();
            }
        }
    }
}
