use crate::config::Config;
use anyhow::{anyhow, Context, Result};
use compedit_editor::{hydrate, CompositionNode, ProjectFile};
use compedit_schema::catalog::builtin_registry;
use compedit_schema::SchemaRegistry;
use std::path::PathBuf;
use std::sync::Arc;

/// A project file resolved against the built-in registry.
pub struct LoadedProject {
    pub config: Config,
    pub path: PathBuf,
    pub registry: SchemaRegistry,
    pub compositions: Vec<Arc<CompositionNode>>,
}

pub fn load_project(cwd: &str) -> Result<LoadedProject> {
    let config = Config::load(cwd)?;
    let path = config.get_project_path(cwd);
    if !path.exists() {
        return Err(anyhow!(
            "Project file does not exist: {} (run `compedit init`)",
            path.display()
        ));
    }

    let project = ProjectFile::load(&path).with_context(|| format!("Failed to read {}", path.display()))?;
    let registry = builtin_registry()?;
    let compositions = hydrate(&project.compositions, &registry)?;
    tracing::debug!(path = %path.display(), count = compositions.len(), "project loaded");

    Ok(LoadedProject {
        config,
        path,
        registry,
        compositions,
    })
}
