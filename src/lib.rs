//! eclipse-gen turns Android build descriptions into Eclipse project
//! directories: classpath files and other templated project files, plus a
//! staging manifest describing how each project's sources are mirrored.

/// Command-line interface module
pub mod cli;

/// Build description loading and run-wide directories
pub mod config;

/// Project descriptors and other build objects
pub mod descriptor;

/// Error types and handling
pub mod error;

/// Per-run orchestration and project-name bookkeeping
pub mod generator;

/// `<classpathentry>` fragments
pub mod markup;

/// Staging manifests: copies, symlinks and pattern copies
pub mod manifest;

/// Template rendering and project directory synchronization
pub mod materializer;

/// Template rendering engine
pub mod renderer;

/// Created/updated counters and the summary line
pub mod summary;

/// Template variables
pub mod variables;
