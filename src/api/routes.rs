//! API Routes
//!
//! Configures the Axum router with all todo endpoints.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    complete_handler, create_handler, delete_handler, get_handler, health_handler,
    list_complete_handler, list_handler, stats_handler, update_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /todoitems` - List all todos (cache-aside)
/// - `POST /todoitems` - Create a todo
/// - `GET /todoitems/complete` - List completed todos
/// - `GET /todoitems/:id` - Fetch one todo
/// - `PUT /todoitems/:id` - Replace name and completion flag
/// - `DELETE /todoitems/:id` - Delete a todo
/// - `POST /todoitems/:id/complete` - Queue a todo for background completion
/// - `GET /stats` - Queue, worker and cache statistics
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/todoitems", get(list_handler).post(create_handler))
        .route("/todoitems/complete", get(list_complete_handler))
        .route(
            "/todoitems/:id",
            get(get_handler).put(update_handler).delete(delete_handler),
        )
        .route("/todoitems/:id/complete", post(complete_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::Todo;
    use crate::queue::BackgroundQueue;
    use crate::store::InMemoryTodoStore;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use std::sync::Arc;
    use tower::util::ServiceExt;

    fn create_test_app() -> Router {
        let store = Arc::new(InMemoryTodoStore::with_items(vec![Todo::new(1, "buy milk")]));
        let queue = Arc::new(BackgroundQueue::new());
        let state = AppState::from_config(&Config::default(), store, queue).unwrap();
        create_router(state)
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_complete_literal_route_wins_over_id() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/todoitems/complete")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_get_not_found() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/todoitems/999")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_enqueue_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/todoitems/1/complete")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }
}
