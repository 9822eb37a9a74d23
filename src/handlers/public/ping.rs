use serde_json::{json, Value};

use crate::middleware::ApiResponse;

/// GET /ping - static liveness probe, no database involved
pub async fn ping() -> ApiResponse<Value> {
    ApiResponse::success(json!({ "message": "pong" }))
}
