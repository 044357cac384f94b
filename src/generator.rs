//! Generation driver context.
//! Owns the state of one run: which projects were written and how many of
//! them were created or updated.

use crate::config::GeneratorConfig;
use crate::descriptor::{BuildObject, EclipseProjectData};
use crate::error::{Error, Result};
use crate::manifest::plan_manifest;
use crate::materializer::{Materializer, SyncOutcome};
use crate::renderer::TemplateRenderer;
use crate::summary::{GenerationSummary, SummaryReporter};
use crate::variables::resolve_variables;
use log::{debug, info};
use std::collections::BTreeMap;

pub struct Generator<'a> {
    config: GeneratorConfig,
    renderer: &'a dyn TemplateRenderer,
    reporter: &'a dyn SummaryReporter,
    summary: GenerationSummary,
    /// Descriptors generated so far, keyed by project name.
    projects: BTreeMap<String, EclipseProjectData>,
}

impl<'a> Generator<'a> {
    pub fn new(
        config: GeneratorConfig,
        renderer: &'a dyn TemplateRenderer,
        reporter: &'a dyn SummaryReporter,
    ) -> Self {
        let summary = GenerationSummary::new(config.output_root());
        Self { config, renderer, reporter, summary, projects: BTreeMap::new() }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn summary(&self) -> &GenerationSummary {
        &self.summary
    }

    /// Summary line for the whole run, formatted by the injected reporter.
    pub fn detailed_summary(&self) -> String {
        self.summary.detail(self.reporter)
    }

    /// Handles one build object. Only Eclipse projects produce output.
    pub fn consume(&mut self, object: &BuildObject) -> Result<Option<SyncOutcome>> {
        match object {
            BuildObject::EclipseProject(data) => self.generate(data).map(Some),
            BuildObject::Directory { srcdir, .. } => {
                debug!("Ignoring directory object for {}", srcdir.display());
                Ok(None)
            }
            BuildObject::Other => Ok(None),
        }
    }

    /// Generates the project directory and staging manifest for one project.
    ///
    /// Everything that can be checked without touching the filesystem is
    /// checked first; a failure leaves other projects of the run unaffected.
    ///
    /// # Errors
    /// * `Error::DuplicateProjectError` if a different descriptor already
    ///   generated a project with the same name in this run
    /// * Configuration, template and filesystem errors for this project
    pub fn generate(&mut self, data: &EclipseProjectData) -> Result<SyncOutcome> {
        let project = &data.project;
        project.validate()?;
        match self.projects.get(&project.name) {
            Some(previous) if previous != data => {
                return Err(Error::DuplicateProjectError { project: project.name.clone() });
            }
            Some(_) => debug!("Regenerating project {}", project.name),
            None => {}
        }

        let project_directory = self.config.project_directory(&project.name);
        let manifest = plan_manifest(&data.srcdir, project)?;
        let variables = resolve_variables(&self.config, data, &project_directory);

        let materializer = Materializer::new(self.renderer, &self.config.template_dir);
        let plan = materializer.plan(&project.name, &variables, project.is_library, &manifest)?;

        manifest.write(self.config.manifest_path(&project.name))?;
        let outcome = materializer.sync(&plan, &project_directory)?;
        // Only a written project claims its name for the rest of the run.
        self.projects.insert(project.name.clone(), data.clone());

        if outcome.existed {
            self.summary.record_updated();
            info!("Updated project {} in {}", project.name, project_directory.display());
        } else {
            self.summary.record_created();
            info!("Created project {} in {}", project.name, project_directory.display());
        }
        Ok(outcome)
    }
}
