//! Gateway command - render the nginx gateway configuration

use chartwright_engine::{Engine, GatewayPlan};
use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs;
use std::path::Path;

use super::load_template;
use crate::error::CliError;

pub fn run(path: &Path, output: Option<&Path>, plan_only: bool) -> Result<()> {
    let loaded = load_template(path)?;
    let template = &loaded.template;

    let content = if plan_only {
        let plan = GatewayPlan::build(template);
        let mut json = serde_json::to_string_pretty(&plan).into_diagnostic()?;
        json.push('\n');
        json
    } else {
        Engine::builder()
            .build()
            .render_gateway(template)
            .map_err(CliError::from)?
    };

    match output {
        Some(file) => {
            fs::write(file, &content).map_err(|e| CliError::io(file.display(), e))?;
            println!("{} {}", style("wrote").green(), file.display());
        }
        None => print!("{}", content),
    }

    Ok(())
}
