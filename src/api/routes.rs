use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::api::{analytics, health};
use crate::artifacts::read_json;
use crate::config::Config;
use crate::error::AppError;
use crate::refresh::{self, RefreshSummary, PipelineStage};

#[derive(Clone)]
pub struct ApiState {
    pub pool: sqlx::SqlitePool,
    pub cfg: Arc<Config>,
    pub stages: Arc<Vec<PipelineStage>>,
}

/// Everything lives under `/api`; any origin may call it.
pub fn router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/ev-data", get(get_ev_data))
        .route("/refresh", post(post_refresh))
        .route("/health", get(health::health))
        .nest("/analytics", analytics::router());

    Router::new()
        .nest("/api", api)
        .layer(cors)
        .with_state(state)
}

/// The last `ev_analysis.json` exactly as the calculate stage wrote it.
async fn get_ev_data(State(state): State<ApiState>) -> Result<Json<Value>, AppError> {
    let data: Value = read_json(&state.cfg.ev_path())?;
    Ok(Json(data))
}

async fn post_refresh(State(state): State<ApiState>) -> Result<Json<RefreshSummary>, AppError> {
    info!(event = "REFRESH_REQUESTED");
    let summary = refresh::run(&state.cfg, &state.stages).await?;
    Ok(Json(summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    use crate::db::analytics::tests::{fixture, memory_pool};
    use crate::refresh::tests::{sh, test_config};

    async fn app_with(data_dir: &std::path::Path, stages: Vec<PipelineStage>) -> Router {
        let pool = memory_pool().await;
        fixture(&pool).await;
        router(ApiState {
            pool,
            cfg: Arc::new(test_config(data_dir)),
            stages: Arc::new(stages),
        })
    }

    async fn send(app: &Router, method: &str, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    #[tokio::test]
    async fn health_reports_running() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_with(dir.path(), Vec::new()).await;

        let (status, body) = send(&app, "GET", "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["message"], "API server is running");
    }

    #[tokio::test]
    async fn ev_data_is_404_until_a_refresh_writes_it() {
        let dir = tempfile::tempdir().unwrap();
        let stages = vec![
            sh("fetch-odds", "Sportsbook API failed", "true", 5),
            sh(
                "calculate-ev",
                "EV calculation failed",
                r#"echo '[{"player":"Patrick Mahomes"}]' > "$DATA_DIR/ev_analysis.json""#,
                5,
            ),
        ];
        let app = app_with(dir.path(), stages).await;

        let (status, body) = send(&app, "GET", "/api/ev-data").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Data file not found");

        let (status, body) = send(&app, "POST", "/api/refresh").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
        assert_eq!(body["message"], "Data refreshed successfully");
        assert_eq!(body["prop_count"], 1);

        let (status, body) = send(&app, "GET", "/api/ev-data").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["player"], "Patrick Mahomes");
    }

    #[tokio::test]
    async fn refresh_failure_echoes_stage_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("later_stage_ran");
        let touch = format!("touch '{}'", marker.display());
        let stages = vec![
            sh("fetch-odds", "Sportsbook API failed", "true", 5),
            sh(
                "fetch-platform",
                "PrizePicks/Platform API failed",
                "echo 'access denied' >&2; exit 1",
                5,
            ),
            sh("match-props", "Prop matching failed", &touch, 5),
        ];
        let app = app_with(dir.path(), stages).await;

        let (status, body) = send(&app, "POST", "/api/refresh").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "PrizePicks/Platform API failed");
        assert!(body["details"].as_str().unwrap().contains("access denied"));
        assert!(!marker.exists());
    }

    #[tokio::test]
    async fn corrupt_ev_artifact_is_a_server_error() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_with(dir.path(), Vec::new()).await;
        std::fs::write(dir.path().join("ev_analysis.json"), "[{ not json").unwrap();

        let (status, body) = send(&app, "GET", "/api/ev-data").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to load data");
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn refresh_timeout_names_the_stage() {
        let dir = tempfile::tempdir().unwrap();
        let stages = vec![
            sh("fetch-odds", "Sportsbook API failed", "true", 5),
            sh("fetch-platform", "PrizePicks/Platform API failed", "sleep 5", 1),
        ];
        let app = app_with(dir.path(), stages).await;

        let (status, body) = send(&app, "POST", "/api/refresh").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Refresh timeout");
        assert!(body["message"].as_str().unwrap().contains("fetch-platform"));
    }

    #[tokio::test]
    async fn refresh_without_ev_output_is_500_not_404() {
        let dir = tempfile::tempdir().unwrap();
        let stages = vec![sh("calculate-ev", "EV calculation failed", "true", 5)];
        let app = app_with(dir.path(), stages).await;

        let (status, body) = send(&app, "POST", "/api/refresh").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "EV calculation failed");
        assert!(body["details"].as_str().unwrap().contains("ev_analysis.json"));
    }

    #[tokio::test]
    async fn top_winners_endpoint_echoes_filters() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_with(dir.path(), Vec::new()).await;

        let (status, body) =
            send(&app, "GET", "/api/analytics/top-winners?sort_by=count&limit=1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["query_type"], "top_winners");
        assert_eq!(body["count"], 1);
        assert_eq!(body["filters"]["limit"], 1);
        assert_eq!(body["results"][0]["username"], "jamessmith");
    }

    #[tokio::test]
    async fn top_hit_lines_endpoint() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_with(dir.path(), Vec::new()).await;

        let (status, body) = send(&app, "GET", "/api/analytics/top-hit-lines").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["query_type"], "top_hit_lines");
        assert!(body["count"].as_u64().unwrap() > 0);
        assert!(body["results"][0]["line_description"].is_string());
    }

    #[tokio::test]
    async fn invalid_filters_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_with(dir.path(), Vec::new()).await;

        let (status, body) = send(&app, "GET", "/api/analytics/top-winners?sort_by=profit").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Bad request");

        let (status, _) = send(&app, "GET", "/api/analytics/top-hit-lines?limit=ten").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) =
            send(&app, "GET", "/api/analytics/top-winners?start_date=11/01/2025").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn user_search_found_missing_and_blank() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_with(dir.path(), Vec::new()).await;

        let (status, body) = send(&app, "GET", "/api/analytics/user-search?q=mary").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["query_type"], "user_search");
        assert_eq!(body["found"], true);
        assert_eq!(body["user"]["username"], "mary_jones");
        assert!(body["recent_entries"].is_array());

        let (status, body) = send(&app, "GET", "/api/analytics/user-search?q=nobody").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["found"], false);
        assert_eq!(body["search_query"], "nobody");
        assert_eq!(body["message"], "No user found matching that username or email");

        let (status, _) = send(&app, "GET", "/api/analytics/user-search?q=%20").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = send(&app, "GET", "/api/analytics/user-search").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn states_and_date_range_endpoints() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_with(dir.path(), Vec::new()).await;

        let (status, body) = send(&app, "GET", "/api/analytics/states").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["states"], serde_json::json!(["CA", "NJ", "NY"]));

        let (status, body) = send(&app, "GET", "/api/analytics/date-range").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["date_range"]["min_date"], "2025-10-20");
        assert_eq!(body["date_range"]["max_date"], "2025-11-10");
    }
}
