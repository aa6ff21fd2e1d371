//! Rendering every artifact one version enables

use serde::Serialize;
use sha2::{Digest, Sha256};

use chartwright_core::{ChartVersion, EffectiveConfig, Template, Values, resolve};

use crate::engine::Engine;
use crate::error::Result;

/// Artifacts produced for one version of a template
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseArtifacts {
    pub effective: EffectiveConfig,

    /// Packaging hand-off document
    pub values: Values,

    /// Gateway configuration, when the resolved flags enable it
    pub gateway: Option<String>,

    /// SHA-256 of `gateway`, hex encoded
    pub gateway_digest: Option<String>,
}

impl ReleaseArtifacts {
    /// Whether the artifacts may be deployed as they are
    pub fn is_deployable(&self) -> bool {
        self.effective.is_deployable()
    }
}

/// Resolve a version and render what it enables
pub fn render_release(
    engine: &Engine,
    template: &Template,
    version: &ChartVersion,
) -> Result<ReleaseArtifacts> {
    let effective = resolve(template, version);
    let values = effective.to_values(template)?;

    let gateway = if effective.enable_nginx_gateway {
        Some(engine.render_gateway(template)?)
    } else {
        None
    };
    let gateway_digest = gateway.as_deref().map(sha256_hex);

    if !effective.is_deployable() {
        tracing::warn!(
            version = %version.version_name,
            secrets = ?effective.invalid_tls_secrets(),
            "version carries invalid TLS material and is not deployable"
        );
    }

    Ok(ReleaseArtifacts {
        effective,
        values,
        gateway,
        gateway_digest,
    })
}

fn sha256_hex(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chartwright_core::ChartVersionValues;

    fn template() -> Template {
        Template::from_yaml(
            r#"
name: shop
enableNginxGateway: true
services:
  - name: api
    routes: [/api]
tlsSecrets:
  - name: shop-tls
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_gateway_rendered_when_enabled() {
        let version = ChartVersion::new("1.0", ChartVersionValues::default());
        let artifacts = render_release(&Engine::default(), &template(), &version).unwrap();

        let gateway = artifacts.gateway.as_deref().unwrap();
        assert!(gateway.contains("upstream api {"));
        assert_eq!(artifacts.gateway_digest.as_deref().unwrap().len(), 64);
        assert_eq!(artifacts.values.get("features.enableNginxGateway").unwrap(), true);
        assert!(artifacts.is_deployable());
    }

    #[test]
    fn test_version_can_disable_gateway() {
        let version = ChartVersion::new(
            "1.0",
            ChartVersionValues {
                enable_nginx_gateway: Some(false),
                ..Default::default()
            },
        );
        let artifacts = render_release(&Engine::default(), &template(), &version).unwrap();

        assert!(artifacts.gateway.is_none());
        assert!(artifacts.gateway_digest.is_none());
    }

    #[test]
    fn test_digest_is_stable() {
        let version = ChartVersion::new("1.0", ChartVersionValues::default());
        let engine = Engine::default();

        let first = render_release(&engine, &template(), &version).unwrap();
        let second = render_release(&engine, &template(), &version).unwrap();
        assert_eq!(first.gateway_digest, second.gateway_digest);
    }

    #[test]
    fn test_invalid_tls_marks_release() {
        let values: ChartVersionValues =
            serde_yaml::from_str("tlsSecretValues:\n  shop-tls:\n    cert: nope\n    key: nope\n")
                .unwrap();
        let version = ChartVersion::new("1.0", values);
        let artifacts = render_release(&Engine::default(), &template(), &version).unwrap();

        assert!(!artifacts.is_deployable());
        assert_eq!(artifacts.effective.tls_secret_values["shop-tls"].cert, "nope");
    }
}
