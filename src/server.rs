use axum::{middleware::from_fn, routing::get, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers;
use crate::middleware::jwt_auth_middleware;

/// The full application router: public routes open, everything under
/// /api behind the JWT middleware.
pub fn app() -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_public_routes())
        // Protected API
        .merge(api_routes().layer(from_fn(jwt_auth_middleware)))
        // Global middleware
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}

/// Bind and serve until the process is stopped.
pub async fn serve(port: u16) -> std::io::Result<()> {
    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Census API listening on http://{}", bind_addr);
    axum::serve(listener, app()).await
}

fn cors_layer() -> CorsLayer {
    let config = crate::config::config();
    if config.security.enable_cors {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
    }
}

fn auth_public_routes() -> Router {
    use axum::routing::post;
    use handlers::public::auth;

    Router::new().route("/auth/login", post(auth::login_post))
}

fn api_routes() -> Router {
    Router::new()
        .merge(auth_routes())
        .merge(geo_routes())
        .merge(admin_routes())
        .merge(submission_routes())
        .merge(report_routes())
}

fn auth_routes() -> Router {
    use axum::routing::put;
    use handlers::protected::auth;

    Router::new()
        .route("/api/auth/whoami", get(auth::whoami_get))
        .route("/api/auth/password", put(auth::password_put))
}

fn geo_routes() -> Router {
    use handlers::protected::geo;

    Router::new()
        .route("/api/geo/regions", get(geo::regions_get))
        .route("/api/geo/divisions", get(geo::divisions_get))
        .route("/api/geo/districts", get(geo::districts_get))
        .route("/api/geo/units", get(geo::units_get))
}

fn admin_routes() -> Router {
    use handlers::protected::admins;

    Router::new()
        .route("/api/admins", get(admins::admins_list).post(admins::admin_create))
        .route(
            "/api/admins/:id",
            get(admins::admin_get)
                .put(admins::admin_update)
                .delete(admins::admin_delete),
        )
}

fn submission_routes() -> Router {
    use axum::routing::{post, put};
    use handlers::protected::submissions;

    Router::new()
        .route(
            "/api/submissions",
            get(submissions::submissions_list).post(submissions::submissions_post),
        )
        .route("/api/submissions/:id", get(submissions::submission_get))
        .route("/api/submissions/:id/answers", put(submissions::answers_put))
        .route("/api/submissions/:id/submit", post(submissions::submit_post))
        .route("/api/submissions/:id/approve", post(submissions::approve_post))
        .route("/api/submissions/:id/return", post(submissions::return_post))
}

fn report_routes() -> Router {
    use handlers::protected::reports;

    Router::new().route("/api/reports/completion", get(reports::completion_get))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "Census API",
            "version": version,
            "description": "Survey collection API with hierarchical review workflow",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "public_auth": "/auth/login (public - token acquisition)",
                "auth": "/api/auth/* (protected)",
                "geo": "/api/geo/* (protected - hierarchy browse)",
                "admins": "/api/admins[/:id] (protected)",
                "submissions": "/api/submissions[/:id] (protected)",
                "reports": "/api/reports/completion (protected)",
            }
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match crate::database::manager::DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
