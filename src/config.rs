//! Configuration handling for eclipse-gen.
//! Loads the build description document and holds the directories a
//! generation run works against.

use crate::descriptor::BuildObject;
use crate::error::{Error, Result};
use log::debug;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Directory, under the top object directory, that receives all projects.
pub const OUTPUT_SUBDIR: &str = "android_eclipse";

/// Template set bundled with the crate.
pub fn default_template_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("templates").join(OUTPUT_SUBDIR)
}

/// Directories shared by every project of one generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub topsrcdir: PathBuf,
    pub topobjdir: PathBuf,
    pub template_dir: PathBuf,
}

impl GeneratorConfig {
    pub fn new<S: Into<PathBuf>, O: Into<PathBuf>>(topsrcdir: S, topobjdir: O) -> Self {
        Self {
            topsrcdir: topsrcdir.into(),
            topobjdir: topobjdir.into(),
            template_dir: default_template_dir(),
        }
    }

    pub fn with_template_dir<P: Into<PathBuf>>(mut self, template_dir: P) -> Self {
        self.template_dir = template_dir.into();
        self
    }

    pub fn output_root(&self) -> PathBuf {
        self.topobjdir.join(OUTPUT_SUBDIR)
    }

    pub fn project_directory(&self, name: &str) -> PathBuf {
        self.output_root().join(name)
    }

    pub fn manifest_path(&self, name: &str) -> PathBuf {
        self.output_root().join(format!("{name}.manifest"))
    }
}

/// Parsed build description document.
#[derive(Debug, Default, Deserialize)]
pub struct BuildDescription {
    #[serde(default)]
    pub objects: Vec<BuildObject>,
}

/// Parses a build description, trying JSON first and then YAML.
///
/// # Errors
/// * `Error::ConfigError` if the content is neither valid JSON nor YAML
pub fn parse_description(content: &str) -> Result<BuildDescription> {
    match serde_json::from_str(content) {
        Ok(description) => Ok(description),
        Err(json_err) => {
            debug!("Build description is not JSON ({json_err}), trying YAML");
            serde_yaml::from_str(content).map_err(|e| {
                Error::ConfigError(format!("Invalid build description format: {e}"))
            })
        }
    }
}

/// Reads and parses the build description at `path`.
pub fn load_description<P: AsRef<Path>>(path: P) -> Result<BuildDescription> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(Error::ConfigError(format!(
            "Invalid build description path: {}",
            path.display()
        )));
    }
    debug!("Loading build description from {}", path.display());
    parse_description(&std::fs::read_to_string(path)?)
}
