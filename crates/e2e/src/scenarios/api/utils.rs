use serde_json::Value;

use crate::api::ApiClient;
use crate::ensure_eq;
use crate::error::HarnessResult;
use crate::scenario::Scenario;

pub fn all() -> Vec<Scenario> {
    vec![api_scenario!(api_health_check, [Integration])]
}

async fn api_health_check(api: &ApiClient) -> HarnessResult<()> {
    let response = api.get("utils/health-check/", None).await?;
    response.expect_status(200)?;
    ensure_eq!(response.body, Value::Bool(true));
    Ok(())
}
