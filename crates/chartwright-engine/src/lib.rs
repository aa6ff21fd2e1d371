//! Chartwright Engine - gateway composition and artifact rendering
//!
//! This crate turns a loaded template into deployable text:
//! - `gateway`: aggregates service and ingress routes into a `GatewayPlan`
//! - `engine`: renders the nginx gateway configuration with MiniJinja
//! - `release`: resolves a version and renders everything it enables

pub mod engine;
pub mod error;
pub mod gateway;
pub mod release;

pub use engine::{Engine, EngineBuilder, HEALTH_CHECK_PATH, PLACEHOLDER_CONFIG};
pub use error::{EngineError, Result, TemplateError};
pub use gateway::{GatewayPlan, Location, RouteOrigin, SkippedRoute, Upstream};
pub use release::{ReleaseArtifacts, render_release};
