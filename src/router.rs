use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{delete, get, post, put},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    AppState,
    config::Config,
    middleware::{auth_middleware, log_errors},
    routes,
};

// account routes, no token required
fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(routes::user::register))
        .route("/login", post(routes::user::login))
        .route("/forget", post(routes::user::forget))
        .route(
            "/resetpassword/{reset_id}/{reset_token}",
            post(routes::user::reset_password),
        )
        .route("/health", get(routes::health::ping))
}

// todo routes behind the bearer-token gate
fn protected_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/todos/get", get(routes::todo::get_todos))
        .route("/todos/add", post(routes::todo::add_todo))
        .route("/todos/edit/{id}", put(routes::todo::edit_todo))
        .route("/todos/delete/{id}", delete(routes::todo::delete_todo))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
}

fn cors_layer(config: &Config) -> Option<CorsLayer> {
    if let Some(origin) = &config.cors_origin {
        match origin.parse::<HeaderValue>() {
            Ok(origin) => {
                return Some(
                    CorsLayer::new()
                        .allow_origin(origin)
                        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
                        .allow_credentials(true),
                );
            }
            Err(_) => tracing::warn!("Ignoring unparseable CORS_ORIGIN {:?}", origin),
        }
    }

    if cfg!(debug_assertions) {
        tracing::debug!("Adding permissive CORS layer for development mode");
        Some(CorsLayer::permissive())
    } else {
        None
    }
}

/// Builds the full application, nested under `config.api_base_uri`.
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .merge(public_routes())
        .merge(protected_routes(&state));

    let base = state.config.api_base_uri.trim_end_matches('/');
    let router = if base.is_empty() {
        api
    } else {
        Router::new().nest(base, api)
    };

    let router = router.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(axum::middleware::from_fn(log_errors)),
    );

    let router = match cors_layer(&state.config) {
        Some(cors) => router.layer(cors),
        None => router,
    };

    router.with_state(state)
}
