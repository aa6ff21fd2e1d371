//! Chartwright Core - Core types for declarative multi-service deployments
//!
//! This crate provides the foundational types used throughout Chartwright:
//! - `Template`: The deployment declaration (services, config maps, TLS secrets, ingresses)
//! - `ChartVersion`: An immutable snapshot of override values against a template
//! - `tls`: Certificate / private key validation
//! - `resolve`: Layering a version's overrides over template defaults
//! - `Values`: Configuration documents with deep merge support
//! - `integrity`: Optional reference checks over a loaded template

pub mod error;
pub mod integrity;
pub mod loader;
pub mod model;
pub mod resolve;
pub mod tls;
pub mod values;

pub use error::{CoreError, Result};
pub use integrity::{IntegrityIssue, Severity};
pub use loader::LoadedTemplate;
pub use model::{
    ChartVersion, ChartVersionValues, ConfigMap, ConfigMapKey, EnvVarSchema, Ingress,
    IngressMode, IngressRule, RegistryConfig, SecretKind, Service, Template, TlsSecret,
    TlsSecretValues,
};
pub use resolve::{EffectiveConfig, resolve};
pub use tls::{TlsError, TlsValidation};
pub use values::{Values, parse_set_values};
