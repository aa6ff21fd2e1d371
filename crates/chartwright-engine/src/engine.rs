//! Gateway configuration rendering based on MiniJinja

use minijinja::Environment;

use chartwright_core::Template;

use crate::error::{EngineError, Result, TemplateError};
use crate::gateway::GatewayPlan;

/// Name the gateway template is registered under
const GATEWAY_TEMPLATE_NAME: &str = "nginx.conf";

const GATEWAY_TEMPLATE: &str = include_str!("templates/nginx.conf.j2");

/// Health-check location served by the gateway itself
pub const HEALTH_CHECK_PATH: &str = "/healthz";

/// Rendered instead of a full configuration when there is nothing to route
pub const PLACEHOLDER_CONFIG: &str = "\
# No services configured yet.
# Add at least one service to the template to generate the nginx gateway configuration.
";

/// Engine builder
pub struct EngineBuilder {
    strict_mode: bool,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self { strict_mode: true }
    }

    /// Set strict mode (fail on undefined variables)
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict_mode = strict;
        self
    }

    /// Build the engine
    pub fn build(self) -> Engine {
        Engine::new(self.strict_mode)
    }
}

/// The artifact renderer
#[derive(Debug, Clone)]
pub struct Engine {
    strict_mode: bool,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Engine {
    /// Create a new engine
    pub fn new(strict_mode: bool) -> Self {
        Self { strict_mode }
    }

    /// Create a builder
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    /// Create a configured MiniJinja environment
    fn create_environment(&self) -> Result<Environment<'static>> {
        let mut env = Environment::new();

        if self.strict_mode {
            env.set_undefined_behavior(minijinja::UndefinedBehavior::Strict);
        } else {
            env.set_undefined_behavior(minijinja::UndefinedBehavior::Lenient);
        }

        // Block tags own their lines; output layout follows the template text
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_keep_trailing_newline(true);

        env.add_template(GATEWAY_TEMPLATE_NAME, GATEWAY_TEMPLATE)
            .map_err(|e| {
                EngineError::Template(TemplateError::from_minijinja(
                    e,
                    GATEWAY_TEMPLATE_NAME,
                    GATEWAY_TEMPLATE,
                ))
            })?;

        Ok(env)
    }

    /// Render the nginx gateway configuration for a template
    pub fn render_gateway(&self, template: &Template) -> Result<String> {
        let plan = GatewayPlan::build(template);
        self.render_plan(&template.name, &plan)
    }

    /// Render a gateway plan.
    ///
    /// A plan without upstreams renders [`PLACEHOLDER_CONFIG`], whatever
    /// ingress rules contributed.
    pub fn render_plan(&self, template_name: &str, plan: &GatewayPlan) -> Result<String> {
        if plan.is_empty() {
            tracing::info!(template = %template_name, "no services declared, rendering placeholder");
            return Ok(PLACEHOLDER_CONFIG.to_string());
        }

        let env = self.create_environment()?;
        let tmpl = env.get_template(GATEWAY_TEMPLATE_NAME).map_err(|e| {
            EngineError::Template(TemplateError::from_minijinja(
                e,
                GATEWAY_TEMPLATE_NAME,
                GATEWAY_TEMPLATE,
            ))
        })?;

        let ctx = minijinja::context! {
            template_name => template_name,
            listen_port => plan.listen_port,
            health_path => HEALTH_CHECK_PATH,
            upstreams => &plan.upstreams,
            locations => &plan.locations,
        };

        tmpl.render(ctx).map_err(|e| {
            EngineError::Template(TemplateError::from_minijinja(
                e,
                GATEWAY_TEMPLATE_NAME,
                GATEWAY_TEMPLATE,
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_template() -> Template {
        Template::from_yaml(
            r#"
name: shop
sharedPort: 3000
services:
  - name: api
    routes: ["/api", "/ws"]
  - name: web
    routes: ["/app"]
ingresses:
  - name: public
    mode: nginx-gateway
    rules:
      - path: /api
        serviceName: web
      - path: /legacy
        serviceName: legacy
  - name: internal
    mode: direct-services
    rules:
      - path: /metrics
        serviceName: api
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_render_gateway_snapshot() {
        let engine = Engine::new(true);
        let rendered = engine.render_gateway(&create_test_template()).unwrap();

        insta::assert_snapshot!(rendered);
    }

    #[test]
    fn test_render_is_deterministic() {
        let engine = Engine::default();
        let template = create_test_template();

        let first = engine.render_gateway(&template).unwrap();
        let second = engine.render_gateway(&template).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_structure_order() {
        let engine = Engine::default();
        let rendered = engine.render_gateway(&create_test_template()).unwrap();

        let position = |needle: &str| {
            rendered
                .find(needle)
                .unwrap_or_else(|| panic!("missing {needle:?} in:\n{rendered}"))
        };

        let events = position("events {");
        let upstream_api = position("upstream api {");
        let upstream_web = position("upstream web {");
        let health = position("location = /healthz {");
        let api = position("location /api {");
        let ws = position("location /ws {");
        let app = position("location /app {");
        let legacy = position("location /legacy {");
        let fallback = position("location / {");

        assert!(events < upstream_api);
        assert!(upstream_api < upstream_web);
        assert!(upstream_web < health);
        assert!(health < api && api < ws && ws < app && app < legacy && legacy < fallback);
    }

    #[test]
    fn test_upstreams_use_shared_port() {
        let rendered = Engine::default()
            .render_gateway(&create_test_template())
            .unwrap();

        assert!(rendered.contains("server api:3000;"));
        assert!(rendered.contains("server web:3000;"));
        assert!(rendered.contains("listen 3000;"));
    }

    #[test]
    fn test_duplicate_path_rendered_once() {
        let rendered = Engine::default()
            .render_gateway(&create_test_template())
            .unwrap();

        assert_eq!(rendered.matches("location /api {").count(), 1);
        // the service route wins over the ingress rule
        let block = &rendered[rendered.find("location /api {").unwrap()..];
        assert!(block.starts_with("location /api {\n            proxy_pass http://api;"));
    }

    #[test]
    fn test_direct_ingress_not_rendered() {
        let rendered = Engine::default()
            .render_gateway(&create_test_template())
            .unwrap();

        assert!(!rendered.contains("/metrics"));
    }

    #[test]
    fn test_placeholder_when_no_services() {
        let mut template = create_test_template();
        template.services.clear();

        let rendered = Engine::default().render_gateway(&template).unwrap();
        assert_eq!(rendered, PLACEHOLDER_CONFIG);
        assert!(!rendered.contains("server {"));
    }

    #[test]
    fn test_lenient_engine_renders_same_output() {
        let template = create_test_template();
        let strict = Engine::builder().strict(true).build();
        let lenient = Engine::builder().strict(false).build();

        assert_eq!(
            strict.render_gateway(&template).unwrap(),
            lenient.render_gateway(&template).unwrap()
        );
    }
}
