//! Version override resolution
//!
//! [`resolve`] layers one version's overrides over its template:
//! - Feature flags: the version's value wins when present, including an
//!   explicit `false`; otherwise the template value applies.
//! - Keyed maps: each outer key in the version's map is taken as a whole.
//!   Templates declare shape only, so there is nothing beneath the override
//!   layer, and a version is never merged with an earlier version.
//! - TLS material is validated per secret; invalid material is kept but the
//!   result reports itself as not deployable.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::json;

use crate::error::Result;
use crate::model::{ChartVersion, Template, TlsSecretValues};
use crate::tls::{self, TlsValidation};
use crate::values::Values;

/// The resolved configuration of one version, ready for packaging
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveConfig {
    pub template_name: String,
    pub version_name: String,
    pub app_version: Option<String>,
    pub shared_port: u16,
    pub enable_nginx_gateway: bool,
    pub enable_redis: bool,
    pub image_tags: IndexMap<String, String>,
    pub env_values: IndexMap<String, IndexMap<String, String>>,
    pub config_map_values: IndexMap<String, IndexMap<String, String>>,
    pub tls_secret_values: IndexMap<String, TlsSecretValues>,
    pub ingress_hosts: IndexMap<String, Vec<String>>,
    /// Validation result for every TLS secret the version supplies
    pub tls: IndexMap<String, TlsValidation>,
}

/// Resolve a version against its template.
///
/// Pure: neither argument is modified, and the result depends only on them.
pub fn resolve(template: &Template, version: &ChartVersion) -> EffectiveConfig {
    let overrides = &version.values;

    let enable_nginx_gateway = overrides
        .enable_nginx_gateway
        .unwrap_or(template.enable_nginx_gateway);
    let enable_redis = overrides.enable_redis.unwrap_or(template.enable_redis);

    let tls: IndexMap<String, TlsValidation> = overrides
        .tls_secret_values
        .iter()
        .map(|(name, material)| (name.clone(), tls::validate(&material.cert, &material.key)))
        .collect();

    for (name, result) in tls.iter().filter(|(_, r)| !r.is_valid()) {
        tracing::warn!(
            version = %version.version_name,
            secret = %name,
            errors = ?result.errors,
            "invalid TLS material"
        );
    }

    tracing::debug!(
        template = %template.name,
        version = %version.version_name,
        enable_nginx_gateway,
        enable_redis,
        "resolved version"
    );

    EffectiveConfig {
        template_name: template.name.clone(),
        version_name: version.version_name.clone(),
        app_version: version.app_version.clone(),
        shared_port: template.shared_port,
        enable_nginx_gateway,
        enable_redis,
        image_tags: overrides.image_tags.clone(),
        env_values: overrides.env_values.clone(),
        config_map_values: overrides.config_map_values.clone(),
        tls_secret_values: overrides.tls_secret_values.clone(),
        ingress_hosts: overrides.ingress_hosts.clone(),
        tls,
    }
}

impl EffectiveConfig {
    /// Names of TLS secrets whose material failed validation
    pub fn invalid_tls_secrets(&self) -> Vec<&str> {
        self.tls
            .iter()
            .filter(|(_, r)| !r.is_valid())
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Whether this configuration may be rendered for deployment
    pub fn is_deployable(&self) -> bool {
        self.tls.values().all(TlsValidation::is_valid)
    }

    /// Build the packaging hand-off document.
    ///
    /// Template-level settings go under `template` and `features`; override
    /// maps keep their keys exactly as the version supplied them, in the
    /// version's declaration order.
    pub fn to_values(&self, template: &Template) -> Result<Values> {
        let images: serde_json::Map<String, serde_json::Value> = self
            .image_tags
            .iter()
            .map(|(service, tag)| {
                (
                    service.clone(),
                    json!({
                        "repository": template.image_repository(service),
                        "tag": tag,
                    }),
                )
            })
            .collect();

        let mut values = Values::from_serializable(&json!({
            "template": {
                "name": self.template_name,
                "sharedPort": self.shared_port,
                "imagePullSecret": template.image_pull_secret,
                "versionName": self.version_name,
                "appVersion": self.app_version,
            },
            "features": {
                "enableNginxGateway": self.enable_nginx_gateway,
                "enableRedis": self.enable_redis,
            },
        }))?;

        values.merge(&Values::from_serializable(&json!({
            "images": images,
            "imageTags": self.image_tags,
            "env": self.env_values,
            "configMaps": self.config_map_values,
            "tls": self.tls_secret_values,
            "ingressHosts": self.ingress_hosts,
        }))?);

        Ok(values)
    }
}
