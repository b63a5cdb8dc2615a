use serde_json::{json, Value};

use super::{envelope_data, logged};
use crate::client::{ApiClient, ApiError};
use crate::models::OrderStatus;

pub async fn list(client: &ApiClient) -> Result<Value, ApiError> {
    logged("fetching orders", client.get("/orders").await).map(envelope_data)
}

pub async fn get(client: &ApiClient, id: &str) -> Result<Value, ApiError> {
    logged("fetching order", client.get(format!("/orders/{}", id)).await).map(envelope_data)
}

/// Revenue and order counts for the dashboard cards.
pub async fn totals(client: &ApiClient) -> Result<Value, ApiError> {
    logged("fetching order totals", client.get("/orders/totals").await).map(envelope_data)
}

pub async fn update_status(
    client: &ApiClient,
    id: &str,
    status: OrderStatus,
) -> Result<Value, ApiError> {
    let body = json!({ "status": status });
    logged(
        "updating order status",
        client.patch(format!("/orders/{}", id), Some(body)).await,
    )
    .map(envelope_data)
}
