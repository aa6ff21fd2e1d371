//! Lint command - check a template and the TLS material of every version

use chartwright_core::{integrity, resolve};
use chrono::Utc;
use console::style;
use miette::Result;
use std::path::Path;

use super::load_template;
use crate::display::IssueReport;
use crate::error::CliError;

pub fn run(path: &Path, strict: bool) -> Result<()> {
    println!(
        "{} Linting template at {}",
        style("→").blue(),
        path.display()
    );

    let loaded = load_template(path)?;
    let template = &loaded.template;
    println!(
        "  {} Template.yaml is valid ({}, {} version(s))",
        style("✓").green(),
        template.name,
        template.versions.len()
    );

    let mut report = IssueReport::new();
    report.extend(integrity::check(template));

    let now = Utc::now();
    for version in &template.versions {
        let effective = resolve(template, version);
        for (secret, result) in &effective.tls {
            let issue_path = format!(
                "versions/{}/tlsSecretValues/{}",
                version.version_name, secret
            );
            for error in &result.errors {
                report.add_error(&issue_path, error.to_string());
            }
            if result.is_expired_at(now) {
                report.add_warning(
                    &issue_path,
                    format!(
                        "certificate expired at {}",
                        result.expires_at.as_deref().unwrap_or_default()
                    ),
                );
            }
        }
    }

    report.display();

    let (errors, warnings) = report.summary();
    println!();
    if errors == 0 && warnings == 0 {
        println!("{} Lint passed", style("✓").green().bold());
        return Ok(());
    }

    println!(
        "{} {} error(s), {} warning(s)",
        if errors > 0 {
            style("✗").red().bold()
        } else {
            style("⚠").yellow().bold()
        },
        errors,
        warnings
    );

    if errors > 0 {
        return Err(CliError::validation(format!("{} lint error(s)", errors)).into());
    }
    if strict {
        return Err(CliError::validation_with_help(
            format!("{} lint warning(s)", warnings),
            "run without --strict to accept warnings",
        )
        .into());
    }

    Ok(())
}
