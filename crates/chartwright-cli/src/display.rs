//! Display formatting for CLI output
//!
//! Groups integrity and TLS findings by the resource they belong to.

use chartwright_core::{IntegrityIssue, Severity, TlsValidation};
use console::style;
use std::collections::BTreeMap;

/// Findings collected by `lint`
#[derive(Debug, Default)]
pub struct IssueReport {
    pub issues: Vec<IntegrityIssue>,
}

impl IssueReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&mut self, issues: impl IntoIterator<Item = IntegrityIssue>) {
        self.issues.extend(issues);
    }

    pub fn add_error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.issues.push(IntegrityIssue::error(path, message));
    }

    pub fn add_warning(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.issues.push(IntegrityIssue::warning(path, message));
    }

    /// Display issues grouped by resource
    pub fn display(&self) {
        let mut by_group: BTreeMap<String, Vec<&IntegrityIssue>> = BTreeMap::new();
        for issue in &self.issues {
            by_group.entry(group_of(&issue.path)).or_default().push(issue);
        }

        for (group, issues) in by_group {
            println!();
            println!("{}", style(group).cyan().bold());

            for issue in issues {
                let icon = match issue.severity {
                    Severity::Error => style("✗").red(),
                    Severity::Warning => style("⚠").yellow(),
                };
                println!("  {} {} {}", icon, issue.message, style(format!("at {}", issue.path)).dim());
            }
        }
    }

    /// (errors, warnings)
    pub fn summary(&self) -> (usize, usize) {
        let errors = self.issues.iter().filter(|i| i.is_error()).count();
        (errors, self.issues.len() - errors)
    }
}

/// `versions/1.0/imageTags/api` groups under `versions/1.0`, anything else
/// under its first segment.
fn group_of(path: &str) -> String {
    let mut segments = path.split('/');
    match (segments.next(), segments.next()) {
        (Some("versions"), Some(name)) => format!("versions/{}", name),
        (Some(first), _) => first.to_string(),
        _ => path.to_string(),
    }
}

/// Print a TLS validation result in human-readable form
pub fn print_tls_validation(label: &str, result: &TlsValidation) {
    if !result.is_valid() {
        println!("{} {}", style("✗").red(), style(label).bold());
        for error in &result.errors {
            println!("    {} {}", style(error.code()).dim(), error);
        }
        return;
    }

    if !result.has_material() {
        println!("{} {} (no material supplied)", style("✓").green(), style(label).bold());
        return;
    }

    println!("{} {}", style("✓").green(), style(label).bold());
    if let Some(not_before) = &result.not_before {
        println!("    {}: {}", style("Not before").bold(), not_before);
    }
    if let Some(expires_at) = &result.expires_at {
        println!("    {}: {}", style("Expires at").bold(), expires_at);
    }
}
