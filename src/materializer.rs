//! Project directory materialization.
//! Renders the template set, merges it with the staged files of the
//! project's manifest and synchronizes the result into the project
//! directory, removing anything the current plan does not account for.

use crate::error::{Error, Result};
use crate::manifest::{remove_path, StagedFile, StagingManifest, ANDROID_MANIFEST};
use crate::renderer::TemplateRenderer;
use crate::variables::VariableMap;
use log::debug;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One file of the planned project directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannedFile {
    Rendered(String),
    Staged(StagedFile),
}

/// Every file the project directory should contain, keyed by relative path.
pub type ProjectPlan = BTreeMap<String, PlannedFile>;

/// Result of synchronizing one project directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOutcome {
    /// Whether the project directory existed before the write.
    pub existed: bool,
    pub written: usize,
    pub removed: usize,
}

fn relative_key(path: &Path, base: &Path) -> Result<String> {
    let relative = path.strip_prefix(base).map_err(|e| Error::ConfigError(e.to_string()))?;
    Ok(relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/"))
}

fn ancestors(key: &str) -> impl Iterator<Item = &str> {
    key.match_indices('/').map(move |(i, _)| &key[..i])
}

pub struct Materializer<'a> {
    renderer: &'a dyn TemplateRenderer,
    template_dir: &'a Path,
}

impl<'a> Materializer<'a> {
    pub fn new(renderer: &'a dyn TemplateRenderer, template_dir: &'a Path) -> Self {
        Self { renderer, template_dir }
    }

    /// Renders every file of the template directory, dot files included.
    ///
    /// The manifest template is skipped for non-library projects, which
    /// stage their own manifest instead.
    ///
    /// # Errors
    /// * `Error::TemplateDoesNotExistsError` if the template directory is missing
    /// * `Error::UnresolvedVariableError` if a template uses an unknown variable
    pub fn render_templates(
        &self,
        variables: &VariableMap,
        is_library: bool,
    ) -> Result<BTreeMap<String, String>> {
        if !self.template_dir.is_dir() {
            return Err(Error::TemplateDoesNotExistsError {
                template_dir: self.template_dir.display().to_string(),
            });
        }

        let mut rendered = BTreeMap::new();
        for entry in WalkDir::new(self.template_dir).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let name = relative_key(entry.path(), self.template_dir)?;
            if name == ANDROID_MANIFEST && !is_library {
                debug!("Skipping template {name}: project supplies its own manifest");
                continue;
            }

            debug!("Rendering template: {name}");
            let content = fs::read_to_string(entry.path())?;
            let output = self.renderer.render_file(&name, &content, variables)?;
            rendered.insert(name, output);
        }
        Ok(rendered)
    }

    /// Assembles the full plan for a project before anything is written.
    ///
    /// # Errors
    /// * `Error::DestinationCollisionError` if a template output and a staged
    ///   file share a path, or one lies inside the other
    pub fn plan(
        &self,
        project: &str,
        variables: &VariableMap,
        is_library: bool,
        manifest: &StagingManifest,
    ) -> Result<ProjectPlan> {
        let mut plan: ProjectPlan = self
            .render_templates(variables, is_library)?
            .into_iter()
            .map(|(name, content)| (name, PlannedFile::Rendered(content)))
            .collect();

        for (destination, file) in manifest.resolve(project)? {
            if plan.insert(destination.clone(), PlannedFile::Staged(file)).is_some() {
                return Err(Error::DestinationCollisionError {
                    project: project.to_string(),
                    destination,
                });
            }
        }

        if let Some(nested) = plan.keys().find(|key| ancestors(key).any(|a| plan.contains_key(a))) {
            return Err(Error::DestinationCollisionError {
                project: project.to_string(),
                destination: nested.clone(),
            });
        }
        Ok(plan)
    }

    /// Writes `plan` into `project_directory` and removes unaccounted files.
    ///
    /// Symlinks and files left where a planned file needs a parent directory
    /// are removed before anything is written, so no write goes through them.
    pub fn sync<P: AsRef<Path>>(&self, plan: &ProjectPlan, project_directory: P) -> Result<SyncOutcome> {
        let project_directory = project_directory.as_ref();
        let mut outcome = SyncOutcome { existed: project_directory.is_dir(), ..Default::default() };
        fs::create_dir_all(project_directory)?;
        let cleared = remove_blocking_ancestors(plan, project_directory)?;

        for (name, file) in plan {
            let target = project_directory.join(name);
            match file {
                PlannedFile::Rendered(content) => {
                    if write_if_changed(&target, content)? {
                        outcome.written += 1;
                    }
                }
                PlannedFile::Staged(staged) => {
                    staged.install(&target)?;
                    outcome.written += 1;
                }
            }
        }

        outcome.removed = cleared + remove_unaccounted(plan, project_directory)?;
        debug!(
            "Synchronized {}: {} written, {} removed",
            project_directory.display(),
            outcome.written,
            outcome.removed
        );
        Ok(outcome)
    }
}

/// Writes `content` unless the file already holds it. Returns whether it wrote.
fn write_if_changed(target: &Path, content: &str) -> Result<bool> {
    match fs::symlink_metadata(target) {
        Ok(meta) if meta.is_file() => {
            if fs::read(target)? == content.as_bytes() {
                return Ok(false);
            }
        }
        Ok(_) => remove_path(target)?,
        Err(_) => {}
    }
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    debug!("Writing file: {}", target.display());
    fs::write(target, content)?;
    Ok(true)
}

/// Removes every non-directory entry sitting where a planned file needs an
/// ancestor directory. Returns the number of entries removed.
fn remove_blocking_ancestors(plan: &ProjectPlan, project_directory: &Path) -> Result<usize> {
    let parents: BTreeSet<&str> = plan.keys().flat_map(|key| ancestors(key)).collect();
    let mut removed = 0;
    // Sorted order visits a parent before anything below it.
    for parent in parents {
        let path = project_directory.join(parent);
        match fs::symlink_metadata(&path) {
            Ok(meta) if !meta.is_dir() => {
                debug!("Removing {} to make room for a directory", path.display());
                remove_path(&path)?;
                removed += 1;
            }
            _ => {}
        }
    }
    Ok(removed)
}

/// Deletes every entry of `project_directory` that is neither planned nor
/// the ancestor directory of a planned file. Symlinks are never followed.
fn remove_unaccounted(plan: &ProjectPlan, project_directory: &Path) -> Result<usize> {
    let mut accounted: BTreeSet<&str> = BTreeSet::new();
    for key in plan.keys() {
        accounted.insert(key);
        accounted.extend(ancestors(key));
    }

    let mut stale: Vec<PathBuf> = Vec::new();
    let mut walker = WalkDir::new(project_directory).min_depth(1).sort_by_file_name().into_iter();
    while let Some(entry) = walker.next() {
        let entry = entry?;
        let key = relative_key(entry.path(), project_directory)?;
        if plan.contains_key(&key) {
            if entry.file_type().is_dir() {
                walker.skip_current_dir();
            }
            continue;
        }
        if accounted.contains(key.as_str()) {
            continue;
        }
        if entry.file_type().is_dir() {
            walker.skip_current_dir();
        }
        stale.push(entry.into_path());
    }

    for path in &stale {
        debug!("Removing unaccounted file: {}", path.display());
        remove_path(path)?;
    }
    Ok(stale.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::MiniJinjaRenderer;
    use tempfile::TempDir;

    #[test]
    fn test_ancestors() {
        assert_eq!(ancestors("a/b/c.txt").collect::<Vec<_>>(), vec!["a", "a/b"]);
        assert_eq!(ancestors("c.txt").count(), 0);
    }

    #[test]
    fn test_missing_template_dir() {
        let renderer = MiniJinjaRenderer::new();
        let materializer = Materializer::new(&renderer, Path::new("/does/not/exist"));
        assert!(matches!(
            materializer.render_templates(&VariableMap::default(), false),
            Err(Error::TemplateDoesNotExistsError { .. })
        ));
    }

    #[test]
    fn test_sync_removes_unaccounted() {
        let temp_dir = TempDir::new().unwrap();
        let project_dir = temp_dir.path().join("Foo");
        fs::create_dir_all(project_dir.join("old/nested")).unwrap();
        fs::write(project_dir.join("old/nested/stale.txt"), "x").unwrap();
        fs::write(project_dir.join("stale.txt"), "x").unwrap();

        let renderer = MiniJinjaRenderer::new();
        let materializer = Materializer::new(&renderer, temp_dir.path());
        let mut plan = ProjectPlan::new();
        plan.insert(".settings/prefs".to_string(), PlannedFile::Rendered("a=1\n".to_string()));

        let outcome = materializer.sync(&plan, &project_dir).unwrap();
        assert!(outcome.existed);
        assert_eq!(outcome.written, 1);
        assert_eq!(outcome.removed, 2);
        assert!(!project_dir.join("old").exists());
        assert!(!project_dir.join("stale.txt").exists());
        assert_eq!(fs::read_to_string(project_dir.join(".settings/prefs")).unwrap(), "a=1\n");

        let outcome = materializer.sync(&plan, &project_dir).unwrap();
        assert_eq!(outcome.written, 0);
        assert_eq!(outcome.removed, 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_sync_replaces_symlinked_parent() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("javalibs");
        fs::create_dir_all(&source).unwrap();
        let project_dir = temp_dir.path().join("Foo");
        fs::create_dir_all(&project_dir).unwrap();
        std::os::unix::fs::symlink(&source, project_dir.join("libs")).unwrap();
        fs::write(project_dir.join("gen"), "not a directory").unwrap();

        let renderer = MiniJinjaRenderer::new();
        let materializer = Materializer::new(&renderer, temp_dir.path());
        let mut plan = ProjectPlan::new();
        plan.insert("libs/x.txt".to_string(), PlannedFile::Rendered("x\n".to_string()));
        plan.insert("gen/R.txt".to_string(), PlannedFile::Rendered("r\n".to_string()));

        let outcome = materializer.sync(&plan, &project_dir).unwrap();
        assert_eq!(outcome.removed, 2);
        assert!(fs::symlink_metadata(project_dir.join("libs")).unwrap().is_dir());
        assert_eq!(fs::read_to_string(project_dir.join("libs/x.txt")).unwrap(), "x\n");
        assert_eq!(fs::read_to_string(project_dir.join("gen/R.txt")).unwrap(), "r\n");
        assert!(fs::read_dir(&source).unwrap().next().is_none());
    }
}
