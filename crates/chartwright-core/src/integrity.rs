//! Reference and naming checks over a loaded template
//!
//! The gateway composer and the resolver tolerate dangling names. This pass
//! sits above them and reports what an operator probably wants to fix before
//! deploying. It never modifies the template.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;

use crate::model::{ChartVersion, Template};

/// RFC 1123 DNS label: the service name becomes a hostname and an upstream id
static DNS_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]([-a-z0-9]{0,61}[a-z0-9])?$").expect("valid regex"));

/// Path of the gateway's catch-all 404 location
const FALLBACK_PATH: &str = "/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

/// A single finding, addressed by a slash-separated path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntegrityIssue {
    pub severity: Severity,
    pub path: String,
    pub message: String,
}

impl IntegrityIssue {
    pub fn error(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn warning(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Check the template's own declarations and every version against it
pub fn check(template: &Template) -> Vec<IntegrityIssue> {
    let mut issues = check_declarations(template);
    for version in &template.versions {
        issues.extend(check_version(template, version));
    }
    issues
}

/// Check services, secrets and ingresses
pub fn check_declarations(template: &Template) -> Vec<IntegrityIssue> {
    let mut issues = Vec::new();
    let mut seen = HashSet::new();

    for service in &template.services {
        let path = format!("services/{}", service.name);

        if !seen.insert(service.name.as_str()) {
            issues.push(IntegrityIssue::error(&path, "duplicate service name"));
        }
        if !DNS_LABEL.is_match(&service.name) {
            issues.push(IntegrityIssue::error(
                &path,
                "service name must be a lowercase DNS label (a-z, 0-9, '-')",
            ));
        }
        for (index, route) in service.routes.iter().enumerate() {
            if route.trim().is_empty() {
                issues.push(IntegrityIssue::error(
                    format!("{}/routes/{}", path, index),
                    "route path must not be empty",
                ));
            } else if route.trim() == FALLBACK_PATH {
                issues.push(IntegrityIssue::error(
                    format!("{}/routes/{}", path, index),
                    "route '/' collides with the gateway's fallback location",
                ));
            }
        }
    }

    for ingress in &template.ingresses {
        let path = format!("ingresses/{}", ingress.name);

        for (index, rule) in ingress.rules.iter().enumerate() {
            let rule_path = format!("{}/rules/{}", path, index);
            if rule.path.trim().is_empty() {
                issues.push(IntegrityIssue::error(&rule_path, "rule path must not be empty"));
            } else if ingress.is_gateway_routed() && rule.path.trim() == FALLBACK_PATH {
                issues.push(IntegrityIssue::error(
                    &rule_path,
                    "rule path '/' collides with the gateway's fallback location",
                ));
            }
            if template.service(&rule.service_name).is_none() {
                issues.push(IntegrityIssue::warning(
                    &rule_path,
                    format!("rule targets unknown service '{}'", rule.service_name),
                ));
            }
        }

        if ingress.tls_enabled {
            match ingress.tls_secret_name.as_deref() {
                None | Some("") => issues.push(IntegrityIssue::error(
                    &path,
                    "TLS is enabled but no TLS secret is named",
                )),
                Some(name) if template.tls_secret(name).is_none() => {
                    issues.push(IntegrityIssue::warning(
                        &path,
                        format!("TLS secret '{}' is not declared", name),
                    ))
                }
                Some(_) => {}
            }
        }
    }

    issues
}

/// Check one version's override keys against the template's declarations
pub fn check_version(template: &Template, version: &ChartVersion) -> Vec<IntegrityIssue> {
    let mut issues = Vec::new();
    let base = format!("versions/{}", version.version_name);
    let values = &version.values;

    for service in values.image_tags.keys() {
        if template.service(service).is_none() {
            issues.push(IntegrityIssue::warning(
                format!("{}/imageTags/{}", base, service),
                format!("image tag for unknown service '{}'", service),
            ));
        }
    }

    for service in values.env_values.keys() {
        if template.service(service).is_none() {
            issues.push(IntegrityIssue::warning(
                format!("{}/envValues/{}", base, service),
                format!("env values for unknown service '{}'", service),
            ));
        }
    }

    for service in &template.services {
        let supplied = values.env_values.get(&service.name);
        for var in service.env_vars.iter().filter(|v| v.required) {
            if supplied.is_none_or(|env| !env.contains_key(&var.name)) {
                issues.push(IntegrityIssue::warning(
                    format!("{}/envValues/{}/{}", base, service.name, var.name),
                    "required environment variable has no value",
                ));
            }
        }
    }

    for name in values.config_map_values.keys() {
        if template.config_map(name).is_none() {
            issues.push(IntegrityIssue::warning(
                format!("{}/configMapValues/{}", base, name),
                format!("values for unknown config map '{}'", name),
            ));
        }
    }

    for name in values.tls_secret_values.keys() {
        if template.tls_secret(name).is_none() {
            issues.push(IntegrityIssue::warning(
                format!("{}/tlsSecretValues/{}", base, name),
                format!("material for unknown TLS secret '{}'", name),
            ));
        }
    }

    for name in values.ingress_hosts.keys() {
        if template.ingress(name).is_none() {
            issues.push(IntegrityIssue::warning(
                format!("{}/ingressHosts/{}", base, name),
                format!("hosts for unknown ingress '{}'", name),
            ));
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(yaml: &str) -> Template {
        Template::from_yaml(yaml).unwrap()
    }

    #[test]
    fn test_clean_template() {
        let t = template(
            r#"
name: shop
services:
  - name: api
    routes: [/api]
tlsSecrets:
  - name: shop-tls
ingresses:
  - name: public
    rules:
      - path: /api
        serviceName: api
    tlsEnabled: true
    tlsSecretName: shop-tls
"#,
        );
        assert!(check(&t).is_empty());
    }

    #[test]
    fn test_service_naming() {
        let t = template(
            r#"
name: shop
services:
  - name: api
  - name: api
  - name: Bad_Name
    routes: [""]
"#,
        );
        let issues = check_declarations(&t);

        assert!(issues.iter().any(|i| i.path == "services/api" && i.message.contains("duplicate")));
        assert!(issues.iter().any(|i| i.path == "services/Bad_Name" && i.message.contains("DNS")));
        assert!(issues.iter().any(|i| i.path == "services/Bad_Name/routes/0"));
        assert!(issues.iter().all(IntegrityIssue::is_error));
    }

    #[test]
    fn test_dangling_references_are_warnings() {
        let t = template(
            r#"
name: shop
ingresses:
  - name: public
    rules:
      - path: /legacy
        serviceName: legacy
    tlsEnabled: true
    tlsSecretName: missing-tls
"#,
        );
        let issues = check_declarations(&t);

        assert_eq!(issues.len(), 2);
        assert!(issues.iter().all(|i| i.severity == Severity::Warning));
        assert!(issues[0].message.contains("'legacy'"));
        assert!(issues[1].message.contains("'missing-tls'"));
    }

    #[test]
    fn test_root_path_collides_with_fallback() {
        let t = template(
            r#"
name: shop
services:
  - name: web
    routes: ["/", /app]
ingresses:
  - name: public
    rules:
      - path: /
        serviceName: web
  - name: internal
    mode: direct-services
    rules:
      - path: /
        serviceName: web
"#,
        );
        let issues = check_declarations(&t);
        let paths: Vec<&str> = issues.iter().map(|i| i.path.as_str()).collect();

        assert_eq!(
            paths,
            vec!["services/web/routes/0", "ingresses/public/rules/0"]
        );
        assert!(issues.iter().all(IntegrityIssue::is_error));
        assert!(issues[0].message.contains("fallback"));
    }

    #[test]
    fn test_tls_enabled_without_secret() {
        let t = template("name: shop\ningresses:\n  - name: public\n    tlsEnabled: true\n");
        let issues = check_declarations(&t);

        assert_eq!(issues.len(), 1);
        assert!(issues[0].is_error());
    }

    #[test]
    fn test_version_unknown_keys_and_required_env() {
        let t = template(
            r#"
name: shop
services:
  - name: api
    envVars:
      - name: DATABASE_URL
        required: true
      - name: LOG_LEVEL
versions:
  - versionName: "1.0"
    values:
      imageTags:
        api: "1.0"
        worker: "1.0"
      configMapValues:
        missing: {}
      tlsSecretValues:
        missing-tls: {}
      ingressHosts:
        nowhere: [a.example.com]
"#,
        );
        let issues = check(&t);
        let paths: Vec<&str> = issues.iter().map(|i| i.path.as_str()).collect();

        assert_eq!(
            paths,
            vec![
                "versions/1.0/imageTags/worker",
                "versions/1.0/envValues/api/DATABASE_URL",
                "versions/1.0/configMapValues/missing",
                "versions/1.0/tlsSecretValues/missing-tls",
                "versions/1.0/ingressHosts/nowhere",
            ]
        );
        assert!(issues.iter().all(|i| !i.is_error()));
    }

    #[test]
    fn test_required_env_supplied() {
        let t = template(
            r#"
name: shop
services:
  - name: api
    envVars:
      - name: DATABASE_URL
        required: true
versions:
  - versionName: "1.0"
    values:
      envValues:
        api:
          DATABASE_URL: postgres://db/shop
"#,
        );
        assert!(check(&t).is_empty());
    }
}
