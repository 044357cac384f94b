//! Build-description objects consumed by the generator.
//! Descriptors are read-only inputs; the generator never mutates them.

use crate::error::{Error, Result};
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::OnceLock;

/// One source root the generated IDE project compiles.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClasspathEntry {
    /// Source sub-path relative to the descriptor's source directory.
    /// Defaults to the destination when omitted.
    #[serde(default)]
    pub srcdir: Option<String>,
    /// Destination sub-path inside the output project.
    #[serde(alias = "path")]
    pub dstdir: String,
    #[serde(default, alias = "exclude")]
    pub exclude_patterns: Vec<String>,
    #[serde(default)]
    pub ignore_warnings: bool,
}

impl ClasspathEntry {
    pub fn new<S: Into<String>, D: Into<String>>(srcdir: S, dstdir: D) -> Self {
        Self {
            srcdir: Some(srcdir.into()),
            dstdir: dstdir.into(),
            exclude_patterns: Vec::new(),
            ignore_warnings: false,
        }
    }

    pub fn with_excludes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_patterns = patterns.into_iter().map(Into::into).collect();
        self
    }

    pub fn ignoring_warnings(mut self) -> Self {
        self.ignore_warnings = true;
        self
    }

    pub fn source(&self) -> &str {
        self.srcdir.as_deref().unwrap_or(&self.dstdir)
    }

    /// Path as seen by the IDE project, which is the destination sub-path.
    pub fn path(&self) -> &str {
        &self.dstdir
    }
}

/// Description of one Android Eclipse project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProjectDescriptor {
    pub name: String,
    pub package_name: String,
    /// Manifest file relative to the source directory.
    pub manifest: Option<String>,
    /// Resource directory relative to the source directory.
    pub res: Option<String>,
    /// Asset directory relative to the source directory.
    pub assets: Option<String>,
    /// Native library output directory, only populated after packaging.
    pub libs: Option<String>,
    #[serde(alias = "classpathentries")]
    pub classpath_entries: Vec<ClasspathEntry>,
    pub referenced_projects: BTreeSet<String>,
    pub extra_jars: BTreeSet<String>,
    pub recursive_make_targets: BTreeSet<String>,
    pub included_projects: BTreeSet<String>,
    pub is_library: bool,
}

fn project_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9_.-]*$").expect("valid regex"))
}

impl ProjectDescriptor {
    pub fn new<N: Into<String>, P: Into<String>>(name: N, package_name: P) -> Self {
        Self { name: name.into(), package_name: package_name.into(), ..Default::default() }
    }

    /// Checks the fields every project must carry.
    ///
    /// # Errors
    /// * `Error::MissingFieldError` if the name or package name is empty
    /// * `Error::InvalidProjectNameError` if the name is not a plain directory name
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::MissingFieldError {
                project: "<unnamed>".to_string(),
                field: "name".to_string(),
            });
        }
        if !project_name_pattern().is_match(&self.name) {
            return Err(Error::InvalidProjectNameError { project: self.name.clone() });
        }
        if self.package_name.trim().is_empty() {
            return Err(Error::MissingFieldError {
                project: self.name.clone(),
                field: "package_name".to_string(),
            });
        }
        Ok(())
    }
}

/// A project descriptor together with the directories it was declared in.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EclipseProjectData {
    pub srcdir: PathBuf,
    pub objdir: PathBuf,
    pub project: ProjectDescriptor,
}

/// Objects emitted by the build description.
///
/// Only Eclipse projects are generated; every other kind is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BuildObject {
    EclipseProject(EclipseProjectData),
    Directory { srcdir: PathBuf, objdir: PathBuf },
    #[serde(other)]
    Other,
}
