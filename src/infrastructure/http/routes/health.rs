//! Health routes

use std::sync::Arc;
use warp::Filter;

use crate::config::AppConfig;
use crate::infrastructure::http::handlers::handle_health;

pub struct HealthRoutes;

impl HealthRoutes {
    pub fn create_routes(
        config: Arc<AppConfig>,
    ) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
        warp::path("health")
            .and(warp::path::end())
            .and(warp::get())
            .and(Self::with_config(config))
            .and_then(handle_health)
    }

    fn with_config(
        config: Arc<AppConfig>,
    ) -> impl Filter<Extract = (Arc<AppConfig>,), Error = std::convert::Infallible> + Clone {
        warp::any().map(move || config.clone())
    }
}
