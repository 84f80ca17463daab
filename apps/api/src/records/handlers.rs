use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::record::StoredRecord;
use crate::state::AppState;

const DEFAULT_LIMIT: i64 = 10;
const MAX_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct RecordsQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct RecordsResponse {
    pub records: Vec<StoredRecord>,
}

/// GET /get-crm-records
pub async fn handle_get_records(
    State(state): State<AppState>,
    params: Result<Query<RecordsQuery>, QueryRejection>,
) -> Result<Json<RecordsResponse>, AppError> {
    let Query(params) = params?;
    let limit = clamp_limit(params.limit);
    let records = state.records.recent(limit).await?;
    Ok(Json(RecordsResponse { records }))
}

fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_limit() {
        assert_eq!(clamp_limit(None), 10);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(500)), 100);
        assert_eq!(clamp_limit(Some(25)), 25);
    }
}
