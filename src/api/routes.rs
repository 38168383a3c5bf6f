use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::{
    routing::{delete, get, post},
    Router,
};
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, limit::RequestBodyLimitLayer,
    set_header::SetResponseHeaderLayer, trace::TraceLayer,
};

#[cfg(not(test))]
use {
    axum::extract::ConnectInfo,
    std::net::{IpAddr, SocketAddr},
    std::sync::Arc,
    tower_governor::{governor::GovernorConfigBuilder, key_extractor::KeyExtractor, GovernorLayer},
    tracing::warn,
};

use crate::api::handlers::{
    self as api_handlers, auth, collections, devices, recipes, tags, users, AppState,
};
use crate::config::Settings;

/// Create the router with all endpoints
#[cfg_attr(test, allow(unused_variables))]
pub fn create_router(state: AppState, settings: &Settings) -> Router {
    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/token", post(auth::token));

    let user_routes = Router::new()
        .route("/me", get(users::me))
        .route("/:id", get(users::get_user).put(users::update_user))
        .route("/:id/avatar", post(users::upload_avatar));

    let recipe_routes = Router::new()
        .route("/", post(recipes::create_recipe))
        .route("/search", get(recipes::search_recipes))
        .route("/top", get(recipes::top_recipes))
        .route("/latest", get(recipes::latest_recipes))
        .route("/low_calorie", get(recipes::low_calorie_recipes))
        .route("/daily", get(recipes::daily_recipe))
        .route("/:id", get(recipes::get_recipe))
        .route("/:id/image", post(recipes::upload_recipe_image));

    let collection_routes = Router::new()
        .route("/", post(collections::create_collection))
        .route("/my", get(collections::my_collections))
        .route("/:id", get(collections::get_collection))
        .route("/:id/recipes", get(collections::collection_recipes))
        .route(
            "/:id/recipes/:recipe_id",
            post(collections::add_recipe).delete(collections::remove_recipe),
        )
        .route("/:id/image", post(collections::upload_collection_image));

    let device_routes = Router::new()
        .route("/register", post(devices::register_device))
        .route("/:token", delete(devices::unregister_device));

    #[cfg_attr(test, allow(unused_mut))]
    let mut api_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/users", user_routes)
        .nest("/recipes", recipe_routes)
        .nest("/collections", collection_routes)
        .nest("/devices", device_routes)
        .route("/tags", get(tags::list_tags))
        .with_state(state.clone());

    // Apply rate limiting only in non-test builds
    // The key is the peer IP when the server runs with connect info, else
    // localhost. Behind a reverse proxy every client shares the proxy's IP.
    #[cfg(not(test))]
    {
        #[derive(Clone, Copy, Debug)]
        struct FallbackIpKeyExtractor;

        impl KeyExtractor for FallbackIpKeyExtractor {
            type Key = IpAddr;

            fn extract<B>(
                &self,
                req: &axum::http::Request<B>,
            ) -> Result<Self::Key, tower_governor::GovernorError> {
                if let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>()
                {
                    return Ok(addr.ip());
                }

                Ok(IpAddr::V4(std::net::Ipv4Addr::LOCALHOST))
            }
        }

        let rate_limit = settings.server.api_rate_limit;
        let governor_conf = GovernorConfigBuilder::default()
            .key_extractor(FallbackIpKeyExtractor)
            .per_second(rate_limit)
            .burst_size(u32::try_from(rate_limit.saturating_mul(2)).unwrap_or(u32::MAX))
            .finish();

        match governor_conf {
            Some(config) => {
                api_routes = api_routes.layer(GovernorLayer {
                    config: Arc::new(config),
                });
            }
            None => warn!(
                "Invalid API_RATE_LIMIT {}, rate limiting disabled",
                rate_limit
            ),
        }
    }

    let api_routes = api_routes;

    // Health check routes (no state needed for health, state needed for ready)
    let health_routes = Router::new()
        .route("/health", get(api_handlers::health_check))
        .route("/ready", get(api_handlers::readiness_check))
        .with_state(state);

    // Main router with middleware
    Router::new()
        .merge(health_routes)
        .merge(api_routes)
        .layer(
            // Multipart uploads are capped by the body limit below, not axum's 2MB default
            DefaultBodyLimit::max(settings.server.max_request_body_size),
        )
        .layer(
            // Request body size limit - prevent memory exhaustion from large payloads
            RequestBodyLimitLayer::new(settings.server.max_request_body_size),
        )
        .layer(
            CorsLayer::new()
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION])
                .allow_origin(tower_http::cors::Any)
                .max_age(Duration::from_secs(3600)),
        )
        .layer(
            // Security headers
            SetResponseHeaderLayer::if_not_present(
                header::X_CONTENT_TYPE_OPTIONS,
                HeaderValue::from_static("nosniff"),
            ),
        )
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static("max-age=31536000; includeSubDomains"),
        ))
        .layer(
            // Compression
            CompressionLayer::new(),
        )
        .layer(
            // Tracing
            TraceLayer::new_for_http(),
        )
}
