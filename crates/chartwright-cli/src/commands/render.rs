//! Render command - write the artifacts for a version to a directory

use chartwright_engine::{Engine, render_release};
use console::style;
use miette::Result;
use std::fs;
use std::path::Path;

use super::load_template;
use crate::error::CliError;

pub fn run(path: &Path, version_key: &str, output: &Path, force: bool) -> Result<()> {
    let loaded = load_template(path)?;
    let version = loaded.version(version_key).map_err(CliError::from)?;

    let engine = Engine::builder().build();
    let artifacts =
        render_release(&engine, &loaded.template, version).map_err(CliError::from)?;

    if !artifacts.is_deployable() {
        let secrets = artifacts.effective.invalid_tls_secrets().join(", ");
        if !force {
            return Err(CliError::validation_with_help(
                format!(
                    "version {} has invalid TLS material for {}",
                    version.version_name, secrets
                ),
                "fix the certificate / key pair, or pass --force to write anyway",
            )
            .into());
        }
        eprintln!(
            "{} writing non-deployable artifacts (invalid TLS material for {})",
            style("⚠").yellow(),
            secrets
        );
    }

    fs::create_dir_all(output).map_err(|e| CliError::io(output.display(), e))?;

    let values_path = output.join("values.yaml");
    let values_yaml = artifacts.values.to_yaml().map_err(CliError::from)?;
    fs::write(&values_path, values_yaml).map_err(|e| CliError::io(values_path.display(), e))?;
    println!("{} {}", style("wrote").green(), values_path.display());

    if let Some(gateway) = &artifacts.gateway {
        let gateway_path = output.join("nginx.conf");
        fs::write(&gateway_path, gateway).map_err(|e| CliError::io(gateway_path.display(), e))?;
        println!("{} {}", style("wrote").green(), gateway_path.display());
        if let Some(digest) = &artifacts.gateway_digest {
            println!("  {} sha256:{}", style("digest").dim(), digest);
        }
    }

    println!(
        "{} Rendered {} {}",
        style("✓").green().bold(),
        loaded.template.name,
        version.version_name
    );

    Ok(())
}
