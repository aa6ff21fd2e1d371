//! Show command - display template information

use chartwright_engine::GatewayPlan;
use console::style;
use miette::Result;
use std::path::Path;

use super::load_template;

pub fn run(path: &Path, show_all: bool) -> Result<()> {
    let loaded = load_template(path)?;
    let template = &loaded.template;

    println!("{}", style(&template.name).cyan().bold());
    println!("{}", style("=".repeat(template.name.len())).dim());
    println!();

    if let Some(desc) = &template.description {
        println!("{}: {}", style("Description").bold(), desc);
    }
    println!("{}: {}", style("Shared port").bold(), template.shared_port);
    println!(
        "{}: {}",
        style("Nginx gateway").bold(),
        enabled(template.enable_nginx_gateway)
    );
    println!("{}: {}", style("Redis").bold(), enabled(template.enable_redis));

    if !template.services.is_empty() {
        println!();
        println!("{}:", style("Services").bold());
        for service in &template.services {
            if service.routes.is_empty() {
                println!("  - {}", service.name);
            } else {
                println!("  - {} ({})", service.name, service.routes.join(", "));
            }
        }
    }

    if !template.ingresses.is_empty() {
        println!();
        println!("{}:", style("Ingresses").bold());
        for ingress in &template.ingresses {
            println!("  - {} [{}]", ingress.name, ingress.mode);
            for rule in &ingress.rules {
                println!("      {} -> {}", rule.path, rule.service_name);
            }
        }
    }

    if !template.versions.is_empty() {
        println!();
        println!("{}:", style("Versions").bold());
        for version in &template.versions {
            match (&version.app_version, &version.created_at) {
                (Some(app), Some(created)) => println!(
                    "  - {} (app {}, created {})",
                    version.version_name,
                    app,
                    created.format("%Y-%m-%d")
                ),
                (Some(app), None) => println!("  - {} (app {})", version.version_name, app),
                _ => println!("  - {}", version.version_name),
            }
        }
    }

    if show_all {
        if !template.config_maps.is_empty() {
            println!();
            println!("{}:", style("Config maps").bold());
            for config_map in &template.config_maps {
                let keys: Vec<&str> = config_map.keys.iter().map(|k| k.name.as_str()).collect();
                println!("  - {} [{}]", config_map.name, keys.join(", "));
            }
        }

        if !template.versions.is_empty() {
            println!();
            println!("{}:", style("Version sources").bold());
            for (version, file) in template.versions.iter().zip(&loaded.version_files) {
                match file {
                    Some(file) => println!("  - {}: {}", version.version_name, file.display()),
                    None => println!("  - {}: inline", version.version_name),
                }
            }
        }

        if !template.tls_secrets.is_empty() {
            println!();
            println!("{}:", style("TLS secrets").bold());
            for secret in &template.tls_secrets {
                println!("  - {}", secret.name);
            }
        }

        let plan = GatewayPlan::build(template);
        if !plan.skipped.is_empty() {
            println!();
            println!("{}:", style("Ingress routes already served").bold());
            for skipped in &plan.skipped {
                println!(
                    "  - {} {} (claimed by {})",
                    skipped.ingress, skipped.path, skipped.claimed_by
                );
            }
        }
    }

    Ok(())
}

fn enabled(flag: bool) -> &'static str {
    if flag { "enabled" } else { "disabled" }
}
