//! Template variables for one project.

use crate::config::GeneratorConfig;
use crate::descriptor::EclipseProjectData;
use crate::error::{Error, Result};
use crate::markup::{classpath_entry_element, extra_jar_element, referenced_project_element};
use indexmap::IndexMap;
use serde::Serialize;
use std::path::Path;

/// Indentation unit of each classpath entry inside `.classpath`.
pub const INDENT: &str = "\t";

/// Named substitution values, rebuilt from scratch for every project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct VariableMap(IndexMap<String, String>);

impl VariableMap {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Rendering context handed to the template renderer.
    pub fn to_context(&self) -> Result<serde_json::Value> {
        serde_json::to_value(self).map_err(|e| Error::ConfigError(e.to_string()))
    }

    fn insert<K: Into<String>, V: Into<String>>(&mut self, name: K, value: V) {
        self.0.insert(name.into(), value.into());
    }
}

fn path_string(path: &Path) -> String {
    path.display().to_string()
}

/// Serialized `<classpathentry>` fragments: classpath entries sorted by
/// path, then referenced projects, then extra JARs.
pub fn classpath_fragments(data: &EclipseProjectData) -> Vec<String> {
    let project = &data.project;
    let mut entries: Vec<_> = project.classpath_entries.iter().collect();
    entries.sort_by(|a, b| a.path().cmp(b.path()));

    let mut fragments: Vec<String> =
        entries.into_iter().map(|e| classpath_entry_element(e).to_string()).collect();
    fragments.extend(project.referenced_projects.iter().map(|n| referenced_project_element(n).to_string()));
    fragments.extend(project.extra_jars.iter().map(|n| extra_jar_element(n).to_string()));
    fragments
}

/// Builds the variable map for one project.
///
/// Every joined collection is sorted first so that unchanged input gives
/// byte-identical output.
pub fn resolve_variables(
    config: &GeneratorConfig,
    data: &EclipseProjectData,
    project_directory: &Path,
) -> VariableMap {
    let project = &data.project;
    let mut vars = VariableMap::default();

    vars.insert("IDE_OBJDIR", path_string(&data.objdir));
    vars.insert("IDE_TOPOBJDIR", path_string(&config.topobjdir));
    vars.insert("IDE_SRCDIR", path_string(&data.srcdir));
    vars.insert("IDE_TOPSRCDIR", path_string(&config.topsrcdir));
    vars.insert("IDE_PROJECT_NAME", project.name.as_str());
    vars.insert("IDE_PACKAGE_NAME", project.package_name.as_str());
    vars.insert("IDE_PROJECT_DIRECTORY", path_string(project_directory));

    let relsrcdir = pathdiff::diff_paths(&data.srcdir, &config.topsrcdir)
        .unwrap_or_else(|| data.srcdir.clone());
    vars.insert("IDE_RELSRCDIR", path_string(&relsrcdir));

    let classpath = classpath_fragments(data)
        .into_iter()
        .map(|fragment| format!("{INDENT}{fragment}"))
        .collect::<Vec<_>>()
        .join("\n");
    vars.insert("IDE_CLASSPATH_ENTRIES", classpath);

    let targets: Vec<&str> = project.recursive_make_targets.iter().map(String::as_str).collect();
    vars.insert("IDE_RECURSIVE_MAKE_TARGETS", targets.join(" "));

    vars.insert(
        "IDE_PROJECT_LIBRARY_SETTING",
        if project.is_library { "android.library=true" } else { "" },
    );

    let references = project
        .included_projects
        .iter()
        .enumerate()
        .map(|(i, name)| format!("android.library.reference.{}={}", i + 1, name))
        .collect::<Vec<_>>()
        .join("\n");
    vars.insert("IDE_PROJECT_LIBRARY_REFERENCES", references);

    vars
}
