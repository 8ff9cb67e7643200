use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::api::routes::ApiState;
use crate::db::analytics::{self, TopFilters, UserReport};
use crate::db::models::{DateRangeRow, HitLineRow, TopWinnerRow};
use crate::error::AppError;

pub fn router() -> Router<ApiState> {
    Router::new()
        .route("/top-winners", get(get_top_winners))
        .route("/top-hit-lines", get(get_top_hit_lines))
        .route("/user-search", get(get_user_search))
        .route("/states", get(get_states))
        .route("/date-range", get(get_date_range))
}

// ---------------------------------------------------------------------------
// Query param structs
// ---------------------------------------------------------------------------

/// Everything arrives as text so bad values get a JSON 400, not axum's plain-text rejection.
#[derive(Debug, Default, Deserialize)]
pub struct TopQuery {
    pub sort_by: Option<String>,
    pub state: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub limit: Option<String>,
}

impl TopQuery {
    fn filters(&self) -> Result<TopFilters, AppError> {
        let limit = match self.limit.as_deref().map(str::trim).filter(|l| !l.is_empty()) {
            Some(l) => Some(l.parse::<i64>().map_err(|_| {
                AppError::BadRequest(format!("limit must be an integer, got '{l}'"))
            })?),
            None => None,
        };
        TopFilters::new(
            self.sort_by.as_deref(),
            self.state.as_deref(),
            self.start_date.as_deref(),
            self.end_date.as_deref(),
            limit,
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct UserSearchQuery {
    pub q: Option<String>,
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct ListResponse<T> {
    pub query_type: &'static str,
    pub filters: TopFilters,
    pub count: usize,
    pub results: Vec<T>,
}

impl<T> ListResponse<T> {
    fn new(query_type: &'static str, filters: TopFilters, results: Vec<T>) -> Self {
        Self {
            query_type,
            filters,
            count: results.len(),
            results,
        }
    }
}

#[derive(Serialize)]
pub struct UserSearchResponse {
    pub query_type: &'static str,
    pub search_query: String,
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    #[serde(flatten)]
    pub report: Option<UserReport>,
}

#[derive(Serialize)]
pub struct StatesResponse {
    pub states: Vec<String>,
}

#[derive(Serialize)]
pub struct DateRangeResponse {
    pub date_range: DateRangeRow,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn get_top_winners(
    State(state): State<ApiState>,
    Query(params): Query<TopQuery>,
) -> Result<Json<ListResponse<TopWinnerRow>>, AppError> {
    let filters = params.filters()?;
    let rows = analytics::top_winners(&state.pool, &filters).await?;
    Ok(Json(ListResponse::new("top_winners", filters, rows)))
}

async fn get_top_hit_lines(
    State(state): State<ApiState>,
    Query(params): Query<TopQuery>,
) -> Result<Json<ListResponse<HitLineRow>>, AppError> {
    let filters = params.filters()?;
    let rows = analytics::top_hit_lines(&state.pool, &filters).await?;
    Ok(Json(ListResponse::new("top_hit_lines", filters, rows)))
}

async fn get_user_search(
    State(state): State<ApiState>,
    Query(params): Query<UserSearchQuery>,
) -> Result<Json<UserSearchResponse>, AppError> {
    let q = params.q.as_deref().map(str::trim).unwrap_or_default();
    if q.is_empty() {
        return Err(AppError::BadRequest(
            "query parameter 'q' (username or email) is required".to_string(),
        ));
    }

    let report = analytics::search_user(&state.pool, q).await?;
    Ok(Json(UserSearchResponse {
        query_type: "user_search",
        search_query: q.to_string(),
        found: report.is_some(),
        message: report
            .is_none()
            .then_some("No user found matching that username or email"),
        report,
    }))
}

async fn get_states(State(state): State<ApiState>) -> Result<Json<StatesResponse>, AppError> {
    let states = analytics::available_states(&state.pool).await?;
    Ok(Json(StatesResponse { states }))
}

async fn get_date_range(
    State(state): State<ApiState>,
) -> Result<Json<DateRangeResponse>, AppError> {
    let date_range = analytics::date_range(&state.pool).await?;
    Ok(Json(DateRangeResponse { date_range }))
}
