//! Resource model: a template and the collections it owns
//!
//! A [`Template`] is an aggregate. It owns its services, config maps, TLS
//! secrets, ingresses and versions; children never outlive it. References
//! between children (ingress rule -> service, ingress -> TLS secret) are plain
//! names and are never resolved here. See [`crate::integrity`] for the
//! optional pass that reports dangling names.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Port shared by the reverse proxy and every upstream service when the
/// template does not declare one.
pub const DEFAULT_SHARED_PORT: u16 = 8080;

/// A deployment template - the editable declaration of a multi-service deployment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    /// Template identifier (defaults to the name when loaded from disk)
    #[serde(default)]
    pub id: String,

    /// Template name
    pub name: String,

    /// Description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Port shared by the reverse proxy and all upstream services
    #[serde(default = "default_shared_port")]
    pub shared_port: u16,

    /// Image registry coordinates
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Name of the registry pull secret
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_pull_secret: Option<String>,

    /// Route traffic through the synthesized nginx gateway
    #[serde(default)]
    pub enable_nginx_gateway: bool,

    /// Deploy a bundled Redis instance
    #[serde(default)]
    pub enable_redis: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub services: Vec<Service>,

    #[serde(default)]
    pub config_maps: Vec<ConfigMap>,

    #[serde(default)]
    pub tls_secrets: Vec<TlsSecret>,

    #[serde(default)]
    pub ingresses: Vec<Ingress>,

    /// Frozen override snapshots, in creation order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub versions: Vec<ChartVersion>,
}

fn default_shared_port() -> u16 {
    DEFAULT_SHARED_PORT
}

impl Template {
    /// Create an empty template with default settings
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: name.clone(),
            name,
            description: None,
            shared_port: DEFAULT_SHARED_PORT,
            registry: RegistryConfig::default(),
            image_pull_secret: None,
            enable_nginx_gateway: false,
            enable_redis: false,
            created_at: None,
            updated_at: None,
            services: Vec::new(),
            config_maps: Vec::new(),
            tls_secrets: Vec::new(),
            ingresses: Vec::new(),
            versions: Vec::new(),
        }
    }

    /// Parse a template from a YAML document
    pub fn from_yaml(yaml: &str) -> crate::Result<Self> {
        let mut template: Template = serde_yaml::from_str(yaml)?;
        template.assign_ids();
        Ok(template)
    }

    /// Look up a service by name
    pub fn service(&self, name: &str) -> Option<&Service> {
        self.services.iter().find(|s| s.name == name)
    }

    /// Look up a config map by name
    pub fn config_map(&self, name: &str) -> Option<&ConfigMap> {
        self.config_maps.iter().find(|c| c.name == name)
    }

    /// Look up a TLS secret by name
    pub fn tls_secret(&self, name: &str) -> Option<&TlsSecret> {
        self.tls_secrets.iter().find(|s| s.name == name)
    }

    /// Look up an ingress by name
    pub fn ingress(&self, name: &str) -> Option<&Ingress> {
        self.ingresses.iter().find(|i| i.name == name)
    }

    /// Look up a version by id, falling back to the version name.
    ///
    /// Ids are unique. Version names are not; for a name the most recently
    /// added match wins.
    pub fn version(&self, key: &str) -> Option<&ChartVersion> {
        self.versions
            .iter()
            .find(|v| v.id == key)
            .or_else(|| self.versions.iter().rev().find(|v| v.version_name == key))
    }

    /// Full image repository for a service (`<registry>/<project>/<service>`)
    pub fn image_repository(&self, service: &str) -> String {
        let mut parts: Vec<&str> = Vec::with_capacity(3);
        if let Some(host) = self.registry.host.as_deref() {
            parts.push(host.trim_end_matches('/'));
        }
        if let Some(project) = self.registry.project.as_deref() {
            parts.push(project.trim_matches('/'));
        }
        parts.push(service);
        parts.join("/")
    }

    /// Fill in missing identifiers and ownership links.
    ///
    /// Child ids are derived from the template id and the child's name, so
    /// the result is stable across loads of the same file.
    pub fn assign_ids(&mut self) {
        if self.id.is_empty() {
            self.id = self.name.clone();
        }
        let owner = self.id.clone();

        for service in &mut self.services {
            stamp(&owner, "service", &service.name, &mut service.id, &mut service.template_id);
        }
        for config_map in &mut self.config_maps {
            stamp(&owner, "configmap", &config_map.name, &mut config_map.id, &mut config_map.template_id);
        }
        for secret in &mut self.tls_secrets {
            stamp(&owner, "secret", &secret.name, &mut secret.id, &mut secret.template_id);
        }
        for ingress in &mut self.ingresses {
            stamp(&owner, "ingress", &ingress.name, &mut ingress.id, &mut ingress.template_id);
        }
        // Version names may repeat; later duplicates get their position appended
        let mut seen_names = HashSet::new();
        for (index, version) in self.versions.iter_mut().enumerate() {
            let name = if seen_names.insert(version.version_name.clone()) {
                version.version_name.clone()
            } else {
                format!("{}-{}", version.version_name, index)
            };
            stamp(&owner, "version", &name, &mut version.id, &mut version.template_id);
        }
    }
}

fn stamp(owner: &str, kind: &str, name: &str, id: &mut String, template_id: &mut String) {
    if id.is_empty() {
        *id = format!("{}/{}/{}", owner, kind, name);
    }
    if template_id.is_empty() {
        *template_id = owner.to_string();
    }
}

/// Image registry coordinates
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryConfig {
    /// Registry host (e.g. `registry.example.com`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    /// Project / namespace inside the registry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
}

/// A backend service. Its name is both the DNS name and the upstream identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub template_id: String,

    pub name: String,

    /// Path prefixes routed to this service, in declaration order
    #[serde(default)]
    pub routes: Vec<String>,

    /// Environment variables the service expects
    #[serde(default)]
    pub env_vars: Vec<EnvVarSchema>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liveness_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readiness_path: Option<String>,
}

impl Service {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            template_id: String::new(),
            name: name.into(),
            routes: Vec::new(),
            env_vars: Vec::new(),
            liveness_path: None,
            readiness_path: None,
        }
    }

    /// Builder-style helper to append a route
    pub fn with_route(mut self, path: impl Into<String>) -> Self {
        self.routes.push(path.into());
        self
    }

    /// Whether this service declares exactly this route path
    pub fn has_route(&self, path: &str) -> bool {
        self.routes.iter().any(|r| r == path)
    }
}

/// Declared environment variable (shape only, no value)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvVarSchema {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub required: bool,
}

/// A config map declaration. Values are supplied per version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigMap {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub template_id: String,

    pub name: String,

    #[serde(default)]
    pub keys: Vec<ConfigMapKey>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigMapKey {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Kind of secret a template declares
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecretKind {
    #[default]
    Tls,
}

/// A TLS secret declaration. Certificate and key are supplied per version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TlsSecret {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub template_id: String,

    pub name: String,

    #[serde(default, rename = "type")]
    pub kind: SecretKind,
}

/// How an ingress reaches its backends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IngressMode {
    /// Routed through the synthesized reverse proxy
    #[default]
    NginxGateway,
    /// Bypasses the proxy and targets services directly
    DirectServices,
}

impl std::fmt::Display for IngressMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NginxGateway => write!(f, "nginx-gateway"),
            Self::DirectServices => write!(f, "direct-services"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ingress {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub template_id: String,

    pub name: String,

    #[serde(default)]
    pub mode: IngressMode,

    #[serde(default)]
    pub rules: Vec<IngressRule>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_host: Option<String>,

    #[serde(default)]
    pub tls_enabled: bool,

    /// Name of a TLS secret in the same template (weak reference)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls_secret_name: Option<String>,
}

impl Ingress {
    /// Whether this ingress is routed through the gateway
    pub fn is_gateway_routed(&self) -> bool {
        self.mode == IngressMode::NginxGateway
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngressRule {
    pub path: String,

    /// Target service name (weak reference)
    pub service_name: String,
}

/// A frozen, named snapshot of override values against a template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartVersion {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub template_id: String,

    /// Display label (not required to be unique)
    pub version_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_version: Option<String>,

    #[serde(default)]
    pub values: ChartVersionValues,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl ChartVersion {
    pub fn new(version_name: impl Into<String>, values: ChartVersionValues) -> Self {
        Self {
            id: String::new(),
            template_id: String::new(),
            version_name: version_name.into(),
            app_version: None,
            values,
            created_at: Some(Utc::now()),
        }
    }
}

/// Per-version override values.
///
/// Any key may be absent. For the feature flags absence means "use the
/// template value"; for the maps it means "no value", never an empty string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartVersionValues {
    /// service name -> image tag
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub image_tags: IndexMap<String, String>,

    /// service name -> (env var name -> value)
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub env_values: IndexMap<String, IndexMap<String, String>>,

    /// config map name -> (key -> value)
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub config_map_values: IndexMap<String, IndexMap<String, String>>,

    /// TLS secret name -> certificate / key text
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub tls_secret_values: IndexMap<String, TlsSecretValues>,

    /// ingress name -> hostnames
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub ingress_hosts: IndexMap<String, Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_nginx_gateway: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_redis: Option<bool>,
}

/// Certificate and private key text for one TLS secret
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TlsSecretValues {
    #[serde(default, alias = "certificate")]
    pub cert: String,

    #[serde(default)]
    pub key: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE_YAML: &str = r#"
name: shop
sharedPort: 3000
registry:
  host: registry.example.com/
  project: acme
enableNginxGateway: true
services:
  - name: api
    routes: ["/api", "/graphql"]
    envVars:
      - name: DATABASE_URL
        required: true
  - name: web
    routes: ["/"]
tlsSecrets:
  - name: shop-tls
    type: tls
ingresses:
  - name: public
    mode: nginx-gateway
    rules:
      - path: /api
        serviceName: api
    tlsEnabled: true
    tlsSecretName: shop-tls
  - name: internal
    mode: direct-services
versions:
  - versionName: "1.0"
    values:
      imageTags:
        api: "1.0.0"
      enableRedis: false
"#;

    #[test]
    fn test_parse_template() {
        let template = Template::from_yaml(TEMPLATE_YAML).unwrap();

        assert_eq!(template.name, "shop");
        assert_eq!(template.shared_port, 3000);
        assert!(template.enable_nginx_gateway);
        assert!(!template.enable_redis);
        assert_eq!(template.services.len(), 2);
        assert_eq!(template.services[0].routes, vec!["/api", "/graphql"]);
        assert!(template.services[0].env_vars[0].required);
        assert_eq!(template.tls_secrets[0].kind, SecretKind::Tls);
        assert_eq!(template.ingresses[1].mode, IngressMode::DirectServices);
        assert_eq!(template.versions[0].values.enable_redis, Some(false));
        assert_eq!(template.versions[0].values.enable_nginx_gateway, None);
    }

    #[test]
    fn test_defaults() {
        let template = Template::from_yaml("name: bare").unwrap();

        assert_eq!(template.shared_port, DEFAULT_SHARED_PORT);
        assert!(template.services.is_empty());
        assert!(template.versions.is_empty());
        assert_eq!(template.id, "bare");
    }

    #[test]
    fn test_assign_ids() {
        let template = Template::from_yaml(TEMPLATE_YAML).unwrap();

        assert_eq!(template.services[0].id, "shop/service/api");
        assert_eq!(template.services[0].template_id, "shop");
        assert_eq!(template.ingresses[0].id, "shop/ingress/public");
        assert_eq!(template.versions[0].id, "shop/version/1.0");
    }

    #[test]
    fn test_repeated_version_names_get_distinct_ids() {
        let mut template = Template::from_yaml(TEMPLATE_YAML).unwrap();
        template.versions.push(ChartVersion::new(
            "1.0",
            ChartVersionValues {
                enable_redis: Some(true),
                ..Default::default()
            },
        ));
        template.assign_ids();

        assert_eq!(template.versions[0].id, "shop/version/1.0");
        assert_eq!(template.versions[1].id, "shop/version/1.0-1");

        // by name: the latest
        assert_eq!(template.version("1.0").unwrap().values.enable_redis, Some(true));
        // by id: exactly that one
        assert_eq!(
            template.version("shop/version/1.0").unwrap().values.enable_redis,
            Some(false)
        );
        assert_eq!(
            template.version("shop/version/1.0-1").unwrap().values.enable_redis,
            Some(true)
        );
    }

    #[test]
    fn test_lookups() {
        let template = Template::from_yaml(TEMPLATE_YAML).unwrap();

        assert!(template.service("api").unwrap().has_route("/graphql"));
        assert!(template.service("missing").is_none());
        assert!(template.tls_secret("shop-tls").is_some());
        assert!(template.ingress("public").unwrap().is_gateway_routed());
        assert!(!template.ingress("internal").unwrap().is_gateway_routed());
        assert_eq!(template.version("1.0").unwrap().values.image_tags["api"], "1.0.0");
        assert_eq!(
            template.version("shop/version/1.0").unwrap().version_name,
            "1.0"
        );
    }

    #[test]
    fn test_image_repository() {
        let template = Template::from_yaml(TEMPLATE_YAML).unwrap();
        assert_eq!(
            template.image_repository("api"),
            "registry.example.com/acme/api"
        );

        let bare = Template::new("bare");
        assert_eq!(bare.image_repository("api"), "api");
    }

    #[test]
    fn test_version_values_skip_empty() {
        let values = ChartVersionValues {
            enable_redis: Some(true),
            ..Default::default()
        };
        let yaml = serde_yaml::to_string(&values).unwrap();

        assert_eq!(yaml.trim(), "enableRedis: true");
    }

    #[test]
    fn test_tls_values_certificate_alias() {
        let values: TlsSecretValues =
            serde_yaml::from_str("certificate: CERT\nkey: KEY").unwrap();
        assert_eq!(values.cert, "CERT");
        assert_eq!(values.key, "KEY");
    }
}
