//! Route aggregation for the nginx gateway
//!
//! A [`GatewayPlan`] is the ordered list of upstreams and locations the
//! gateway configuration is rendered from. Building it is pure and ordered
//! by declaration: services first (in order, each with its routes in order),
//! then extra routes contributed by gateway-routed ingresses.
//!
//! An ingress rule whose path is already claimed by a service route, or by
//! an earlier ingress rule, is skipped. Rule targets are not checked against
//! the declared services; an unknown target is proxied by name.

use serde::Serialize;
use std::collections::HashSet;

use chartwright_core::{Ingress, Service, Template};

/// A named backend the gateway forwards to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Upstream {
    pub name: String,
    pub host: String,
    pub port: u16,
}

/// Where a location was declared
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "lowercase")]
pub enum RouteOrigin {
    Service(String),
    Ingress(String),
}

impl std::fmt::Display for RouteOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Service(name) => write!(f, "service {}", name),
            Self::Ingress(name) => write!(f, "ingress {}", name),
        }
    }
}

/// A path forwarded to an upstream
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub path: String,
    pub upstream: String,
    pub origin: RouteOrigin,
}

/// An ingress rule left out because its path was already routed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedRoute {
    pub ingress: String,
    pub path: String,
    pub service_name: String,
    /// The declaration that already owns the path
    pub claimed_by: RouteOrigin,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayPlan {
    pub listen_port: u16,
    pub upstreams: Vec<Upstream>,
    pub locations: Vec<Location>,
    pub skipped: Vec<SkippedRoute>,
}

impl GatewayPlan {
    /// Build the plan for a template
    pub fn build(template: &Template) -> Self {
        Self::compose(template.shared_port, &template.services, &template.ingresses)
    }

    /// Build the plan from a shared port, services and ingresses
    pub fn compose(shared_port: u16, services: &[Service], ingresses: &[Ingress]) -> Self {
        let upstreams: Vec<Upstream> = services
            .iter()
            .map(|service| Upstream {
                name: service.name.clone(),
                host: service.name.clone(),
                port: shared_port,
            })
            .collect();

        let mut locations: Vec<Location> = services
            .iter()
            .flat_map(|service| {
                service.routes.iter().map(move |path| Location {
                    path: path.clone(),
                    upstream: service.name.clone(),
                    origin: RouteOrigin::Service(service.name.clone()),
                })
            })
            .collect();

        let mut claimed: HashSet<String> = locations.iter().map(|l| l.path.clone()).collect();
        let mut skipped = Vec::new();

        for ingress in ingresses.iter().filter(|i| i.is_gateway_routed()) {
            for rule in &ingress.rules {
                if claimed.contains(&rule.path) {
                    let claimed_by = locations
                        .iter()
                        .find(|l| l.path == rule.path)
                        .map(|l| l.origin.clone())
                        .unwrap_or_else(|| RouteOrigin::Ingress(ingress.name.clone()));

                    tracing::debug!(
                        ingress = %ingress.name,
                        path = %rule.path,
                        claimed_by = %claimed_by,
                        "skipping duplicate route"
                    );
                    skipped.push(SkippedRoute {
                        ingress: ingress.name.clone(),
                        path: rule.path.clone(),
                        service_name: rule.service_name.clone(),
                        claimed_by,
                    });
                    continue;
                }

                claimed.insert(rule.path.clone());
                locations.push(Location {
                    path: rule.path.clone(),
                    upstream: rule.service_name.clone(),
                    origin: RouteOrigin::Ingress(ingress.name.clone()),
                });
            }
        }

        tracing::debug!(
            upstreams = upstreams.len(),
            locations = locations.len(),
            skipped = skipped.len(),
            "composed gateway plan"
        );

        Self {
            listen_port: shared_port,
            upstreams,
            locations,
            skipped,
        }
    }

    /// No services means nothing to route to
    pub fn is_empty(&self) -> bool {
        self.upstreams.is_empty()
    }

    /// Locations declared for a given path
    pub fn locations_for(&self, path: &str) -> Vec<&Location> {
        self.locations.iter().filter(|l| l.path == path).collect()
    }
}
