//! Resolve command - print the effective values for a version

use chartwright_core::{parse_set_values, resolve};
use console::style;
use miette::Result;
use std::path::Path;

use super::load_template;
use crate::error::CliError;

pub fn run(
    path: &Path,
    version_key: &str,
    json: bool,
    set_values: &[String],
    get: Option<&str>,
) -> Result<()> {
    let loaded = load_template(path)?;
    let version = loaded.version(version_key).map_err(CliError::from)?;

    let effective = resolve(&loaded.template, version);
    let mut values = effective
        .to_values(&loaded.template)
        .map_err(CliError::from)?;

    if !set_values.is_empty() {
        let overlay = parse_set_values(set_values).map_err(CliError::from)?;
        values.merge(&overlay);
    }

    if !effective.is_deployable() {
        eprintln!(
            "{} version {} is not deployable: invalid TLS material for {}",
            style("⚠").yellow(),
            effective.version_name,
            effective.invalid_tls_secrets().join(", ")
        );
    }

    if let Some(key) = get {
        let value = values
            .get(key)
            .ok_or_else(|| CliError::usage(format!("no value at '{}'", key)))?;
        match value {
            serde_json::Value::String(s) => println!("{}", s),
            other => println!("{}", other),
        }
        return Ok(());
    }

    let output = if json {
        values.to_json_pretty().map_err(CliError::from)?
    } else {
        values.to_yaml().map_err(CliError::from)?
    };
    print!("{}", output);
    if !output.ends_with('\n') {
        println!();
    }

    Ok(())
}
