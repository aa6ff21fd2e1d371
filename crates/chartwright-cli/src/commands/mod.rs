//! CLI commands

pub mod gateway;
pub mod lint;
pub mod render;
pub mod resolve;
pub mod show;
pub mod tls;

use chartwright_core::LoadedTemplate;
use std::path::Path;

use crate::error::CliError;

/// Load a template directory, mapping failures to template errors
pub(crate) fn load_template(path: &Path) -> Result<LoadedTemplate, CliError> {
    let loaded = LoadedTemplate::load(path)?;
    tracing::debug!(
        path = %path.display(),
        template = %loaded.template.name,
        "template loaded"
    );
    Ok(loaded)
}
