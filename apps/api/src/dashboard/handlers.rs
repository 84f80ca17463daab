use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use crate::dashboard::{build_report, DashboardReport, Timeframe};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub timeframe: Option<String>,
}

/// GET /api/dashboard
pub async fn handle_dashboard(
    State(state): State<AppState>,
    params: Result<Query<DashboardQuery>, QueryRejection>,
) -> Result<Json<DashboardReport>, AppError> {
    let Query(params) = params?;
    let timeframe = match params.timeframe.as_deref() {
        Some(value) => Timeframe::parse(value)?,
        None => Timeframe::default(),
    };
    let today = Utc::now().date_naive();

    let records = state.records.contacted_since(timeframe.since(today)).await?;
    let report = build_report(&records, timeframe, today);

    info!(
        "Dashboard ({:?}): {} contacts, pipeline {}",
        timeframe, report.total_contacts, report.total_pipeline
    );
    Ok(Json(report))
}
