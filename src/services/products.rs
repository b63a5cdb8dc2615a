use serde_json::Value;

use super::{envelope_data, logged};
use crate::client::{ApiClient, ApiError};

pub async fn list(client: &ApiClient) -> Result<Value, ApiError> {
    logged("fetching products", client.get("/products").await).map(envelope_data)
}

pub async fn get(client: &ApiClient, id: &str) -> Result<Value, ApiError> {
    logged("fetching product", client.get(format!("/products/{}", id)).await).map(envelope_data)
}

pub async fn create(client: &ApiClient, product: Value) -> Result<Value, ApiError> {
    logged("creating product", client.post("/products", Some(product)).await).map(envelope_data)
}

pub async fn update(client: &ApiClient, id: &str, product: Value) -> Result<Value, ApiError> {
    logged(
        "updating product",
        client.put(format!("/products/{}", id), product).await,
    )
    .map(envelope_data)
}

/// Soft delete; see [`restore`].
pub async fn delete(client: &ApiClient, id: &str) -> Result<Value, ApiError> {
    logged("deleting product", client.delete(format!("/products/{}", id)).await)
        .map(envelope_data)
}

pub async fn restore(client: &ApiClient, id: &str) -> Result<Value, ApiError> {
    logged(
        "restoring product",
        client.patch(format!("/products/{}/restore", id), None).await,
    )
    .map(envelope_data)
}
