//! HTTP routes module

pub mod builder;
pub mod health;
pub mod metrics;
pub mod orders;
pub mod payments;
pub mod webhook;

pub use builder::RouteBuilder;
pub use health::HealthRoutes;
pub use metrics::MetricsRoutes;
pub use orders::OrderRoutes;
pub use payments::PaymentRoutes;
pub use webhook::WebhookRoutes;
