//! Usage routes: listings, summary statistics, and top-customer rankings.

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::errors::AppError;
use crate::middleware::auth::CurrentUser;
use crate::middleware::rbac::RequireStaff;
use crate::services::usage::{
    self, SummaryParams, TopCustomersParams, TopCustomersReport, UsageFilters, UsageListing,
    UsageSummary,
};
use crate::AppState;

/// Listing envelope: the rows plus their count.
#[derive(Debug, Serialize)]
struct UsageList<T: Serialize> {
    usage: Vec<T>,
    count: usize,
}

impl<T: Serialize> UsageList<T> {
    fn new(usage: Vec<T>) -> Self {
        let count = usage.len();
        Self { usage, count }
    }
}

/// GET /api/usage — usage records scoped by caller role, with optional
/// customer and date filters.
pub async fn list(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(filters): Query<UsageFilters>,
) -> Result<Response, AppError> {
    let listing = usage::list(&state.db, &current_user, &filters).await?;
    let response = match listing {
        UsageListing::WithCustomer(rows) => Json(UsageList::new(rows)).into_response(),
        UsageListing::Bare(rows) => Json(UsageList::new(rows)).into_response(),
    };
    Ok(response)
}

/// GET /api/usage/summary — windowed aggregates with estimated cost.
pub async fn summary(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(params): Query<SummaryParams>,
) -> Result<Json<UsageSummary>, AppError> {
    let summary = usage::summary(&state.db, &current_user, &params).await?;
    Ok(Json(summary))
}

/// GET /api/usage/top-customers — consumption ranking, staff only.
pub async fn top_customers(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
    Query(params): Query<TopCustomersParams>,
) -> Result<Json<TopCustomersReport>, AppError> {
    let report = usage::top_customers(&state.db, &params).await?;
    Ok(Json(report))
}
