//! Staging manifests.
//! A manifest records how a project's working tree is populated from its
//! real source locations: plain copies, symlinks and pattern copies whose
//! matches are only known once the build has run.

use crate::descriptor::ProjectDescriptor;
use crate::error::{Error, Result};
use crate::markup::basename;
use globset::Glob;
use log::debug;
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Version written on the first line of a persisted manifest.
pub const MANIFEST_VERSION: &str = "5";

/// Field separator of a persisted manifest line.
const SEPARATOR: char = '\u{1f}';

const SYMLINK: &str = "1";
const COPY: &str = "2";
const PATTERN_COPY: &str = "6";

/// Destination of the descriptor-supplied manifest file.
pub const ANDROID_MANIFEST: &str = "AndroidManifest.xml";

/// One staged file operation. Destinations are relative to the project directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOperation {
    Copy { source: PathBuf, destination: String },
    Symlink { source: PathBuf, destination: String },
    PatternCopy { base: PathBuf, pattern: String, destination: String },
}

impl FileOperation {
    pub fn destination(&self) -> &str {
        match self {
            FileOperation::Copy { destination, .. }
            | FileOperation::Symlink { destination, .. }
            | FileOperation::PatternCopy { destination, .. } => destination,
        }
    }

    /// Unique key of the operation within a manifest.
    pub fn key(&self) -> String {
        match self {
            FileOperation::PatternCopy { pattern, destination, .. } => {
                format!("{destination}/{pattern}")
            }
            _ => self.destination().to_string(),
        }
    }

    /// Copies and symlinks occupy their destination path exclusively.
    fn occupies_destination(&self) -> bool {
        !matches!(self, FileOperation::PatternCopy { .. })
    }
}

impl fmt::Display for FileOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = SEPARATOR;
        match self {
            FileOperation::Symlink { source, destination } => {
                write!(f, "{SYMLINK}{s}{destination}{s}{}", source.display())
            }
            FileOperation::Copy { source, destination } => {
                write!(f, "{COPY}{s}{destination}{s}{}", source.display())
            }
            FileOperation::PatternCopy { base, pattern, destination } => write!(
                f,
                "{PATTERN_COPY}{s}{}{s}{}{s}{pattern}{s}{destination}",
                self.key(),
                base.display()
            ),
        }
    }
}

/// A concrete file produced by resolving a manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StagedFile {
    Copy(PathBuf),
    Symlink(PathBuf),
}

impl StagedFile {
    /// Places this file at `target`, replacing whatever is there.
    pub fn install(&self, target: &Path) -> Result<()> {
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        match self {
            StagedFile::Copy(source) => {
                if let Ok(meta) = fs::symlink_metadata(target) {
                    if !meta.is_file() {
                        remove_path(target)?;
                    }
                }
                fs::copy(source, target)?;
            }
            StagedFile::Symlink(source) => {
                let source = std::path::absolute(source)?;
                if let Ok(meta) = fs::symlink_metadata(target) {
                    if meta.file_type().is_symlink() && fs::read_link(target)? == source {
                        debug!("Symlink '{}' is up to date", target.display());
                        return Ok(());
                    }
                    remove_path(target)?;
                }
                symlink(&source, target)?;
            }
        }
        Ok(())
    }
}

/// Removes a file, symlink or directory without following symlinks.
pub(crate) fn remove_path(path: &Path) -> std::io::Result<()> {
    let meta = fs::symlink_metadata(path)?;
    if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

#[cfg(unix)]
fn symlink(source: &Path, target: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(source, target)
}

#[cfg(windows)]
fn symlink(source: &Path, target: &Path) -> std::io::Result<()> {
    if source.is_dir() {
        std::os::windows::fs::symlink_dir(source, target)
    } else {
        std::os::windows::fs::symlink_file(source, target)
    }
}

/// Ordered list of staged file operations for one project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StagingManifest {
    operations: Vec<FileOperation>,
}

impl StagingManifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_copy<P: Into<PathBuf>, S: Into<String>>(&mut self, source: P, destination: S) {
        self.operations.push(FileOperation::Copy {
            source: source.into(),
            destination: normalize(destination.into()),
        });
    }

    pub fn add_symlink<P: Into<PathBuf>, S: Into<String>>(&mut self, source: P, destination: S) {
        self.operations.push(FileOperation::Symlink {
            source: source.into(),
            destination: normalize(destination.into()),
        });
    }

    pub fn add_pattern_copy<P, S, D>(&mut self, base: P, pattern: S, destination: D)
    where
        P: Into<PathBuf>,
        S: Into<String>,
        D: Into<String>,
    {
        self.operations.push(FileOperation::PatternCopy {
            base: base.into(),
            pattern: pattern.into(),
            destination: normalize(destination.into()),
        });
    }

    pub fn operations(&self) -> &[FileOperation] {
        &self.operations
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Rejects manifests where an operation would write outside the project
    /// directory, or two operations would write the same path.
    ///
    /// A destination collides when another operation uses the same key, or
    /// when it equals or lies inside the destination of a copy or symlink.
    ///
    /// # Errors
    /// * `Error::InvalidDestinationError` if a destination is empty, absolute
    ///   or has a `.` or `..` component
    /// * `Error::DestinationCollisionError` naming the first offending destination
    pub fn check_destinations(&self, project: &str) -> Result<()> {
        if let Some(op) = self.operations.iter().find(|op| !is_confined(op.destination())) {
            return Err(Error::InvalidDestinationError {
                project: project.to_string(),
                destination: op.destination().to_string(),
            });
        }

        let mut keys = BTreeSet::new();
        for op in &self.operations {
            if !keys.insert(op.key()) {
                return Err(collision(project, op.destination()));
            }
        }

        for (i, op) in self.operations.iter().enumerate() {
            let destination = op.destination();
            let clash = self.operations.iter().enumerate().any(|(j, other)| {
                i != j && other.occupies_destination() && is_within(destination, other.destination())
            });
            if clash {
                return Err(collision(project, destination));
            }
        }
        Ok(())
    }

    /// Expands the manifest into concrete files keyed by relative destination.
    ///
    /// Pattern copies are matched against their base directory now; a base
    /// that does not exist yet contributes nothing.
    pub fn resolve(&self, project: &str) -> Result<Vec<(String, StagedFile)>> {
        let mut files = Vec::new();
        let mut taken = BTreeSet::new();
        for op in &self.operations {
            match op {
                FileOperation::Copy { source, destination } => {
                    taken.insert(destination.clone());
                    files.push((destination.clone(), StagedFile::Copy(source.clone())));
                }
                FileOperation::Symlink { source, destination } => {
                    taken.insert(destination.clone());
                    files.push((destination.clone(), StagedFile::Symlink(source.clone())));
                }
                FileOperation::PatternCopy { .. } => {}
            }
        }

        for op in &self.operations {
            if let FileOperation::PatternCopy { base, pattern, destination } = op {
                for (relative, source) in find_pattern(base, pattern)? {
                    let target = format!("{destination}/{relative}");
                    if !taken.insert(target.clone()) {
                        return Err(collision(project, &target));
                    }
                    files.push((target, StagedFile::Copy(source)));
                }
            }
        }
        Ok(files)
    }

    /// Replays the manifest into `target_dir`, returning the number of files placed.
    pub fn install<P: AsRef<Path>>(&self, target_dir: P, project: &str) -> Result<usize> {
        let target_dir = target_dir.as_ref();
        self.check_destinations(project)?;
        let files = self.resolve(project)?;
        for (destination, file) in &files {
            file.install(&target_dir.join(destination))?;
        }
        Ok(files.len())
    }

    /// Serializes the manifest, entries sorted by key.
    pub fn serialize(&self) -> String {
        let mut operations: Vec<&FileOperation> = self.operations.iter().collect();
        operations.sort_by_key(|op| op.key());

        let mut out = String::from(MANIFEST_VERSION);
        out.push('\n');
        for op in operations {
            out.push_str(&op.to_string());
            out.push('\n');
        }
        out
    }

    /// Writes the serialized manifest, creating parent directories.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = self.serialize();
        if fs::read_to_string(path).ok().as_deref() == Some(content.as_str()) {
            debug!("Manifest '{}' is unchanged", path.display());
            return Ok(());
        }
        debug!("Writing manifest '{}'", path.display());
        fs::write(path, content)?;
        Ok(())
    }

    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::parse(&fs::read_to_string(path)?)
    }

    /// Parses a manifest written by [`StagingManifest::serialize`].
    pub fn parse(content: &str) -> Result<Self> {
        let mut lines = content.lines();
        match lines.next() {
            Some(MANIFEST_VERSION) => {}
            other => {
                return Err(Error::ManifestParseError {
                    line: 1,
                    reason: format!("unsupported version {:?}", other.unwrap_or_default()),
                })
            }
        }

        let mut manifest = Self::new();
        for (index, line) in lines.enumerate() {
            let line_number = index + 2;
            if line.is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split(SEPARATOR).collect();
            let invalid = |reason: &str| Error::ManifestParseError {
                line: line_number,
                reason: reason.to_string(),
            };
            match fields.as_slice() {
                [SYMLINK, destination, source] => manifest.add_symlink(*source, *destination),
                [COPY, destination, source] => manifest.add_copy(*source, *destination),
                [PATTERN_COPY, _key, base, pattern, destination] => {
                    manifest.add_pattern_copy(*base, *pattern, *destination)
                }
                [SYMLINK | COPY | PATTERN_COPY, ..] => {
                    return Err(invalid("wrong number of fields"))
                }
                [kind, ..] => return Err(invalid(&format!("unknown entry type '{kind}'"))),
                [] => return Err(invalid("empty entry")),
            }
        }
        Ok(manifest)
    }
}

/// Plans how a project's working tree is staged from `srcdir`.
///
/// Operations are added in a fixed order: manifest, resources, assets,
/// classpath entries, native libraries, then extra JARs sorted by path.
/// No file is opened here.
///
/// # Errors
/// * `Error::InvalidDestinationError` if a destination escapes the project directory
/// * `Error::DestinationCollisionError` if two operations share a destination
pub fn plan_manifest<P: AsRef<Path>>(srcdir: P, project: &ProjectDescriptor) -> Result<StagingManifest> {
    let srcdir = srcdir.as_ref();
    let mut manifest = StagingManifest::new();

    if let Some(path) = &project.manifest {
        manifest.add_copy(srcdir.join(path), ANDROID_MANIFEST);
    }
    if let Some(res) = &project.res {
        manifest.add_symlink(srcdir.join(res), "res");
    }
    if let Some(assets) = &project.assets {
        manifest.add_symlink(srcdir.join(assets), "assets");
    }
    for entry in &project.classpath_entries {
        manifest.add_symlink(srcdir.join(entry.source()), entry.dstdir.as_str());
    }
    // Native libraries only exist after packaging, so record a pattern.
    if let Some(libs) = &project.libs {
        manifest.add_pattern_copy(srcdir.join(libs), "**", "libs");
    }
    for jar in &project.extra_jars {
        manifest.add_copy(srcdir.join(jar), format!("libs/{}", basename(jar)));
    }

    manifest.check_destinations(&project.name)?;
    Ok(manifest)
}

fn find_pattern(base: &Path, pattern: &str) -> Result<Vec<(String, PathBuf)>> {
    if !base.is_dir() {
        debug!("Pattern base '{}' does not exist yet", base.display());
        return Ok(Vec::new());
    }
    let matcher = Glob::new(pattern)?.compile_matcher();
    let mut found = Vec::new();
    for entry in WalkDir::new(base).follow_links(true).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(base)
            .map_err(|e| Error::ConfigError(e.to_string()))?;
        let relative = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        if matcher.is_match(&relative) {
            found.push((relative, entry.path().to_path_buf()));
        }
    }
    Ok(found)
}

fn normalize(destination: String) -> String {
    destination.trim_start_matches("./").trim_end_matches('/').to_string()
}

/// Whether `destination` names a path strictly below the project directory.
fn is_confined(destination: &str) -> bool {
    !destination.is_empty()
        && destination.split('/').all(|part| !matches!(part, "" | "." | ".."))
        && Path::new(destination).components().all(|c| matches!(c, Component::Normal(_)))
}

fn is_within(path: &str, ancestor: &str) -> bool {
    path == ancestor
        || path.strip_prefix(ancestor).is_some_and(|rest| rest.starts_with('/'))
}

fn collision(project: &str, destination: &str) -> Error {
    Error::DestinationCollisionError {
        project: project.to_string(),
        destination: destination.to_string(),
    }
}
