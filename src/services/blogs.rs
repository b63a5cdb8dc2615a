use serde_json::Value;

use super::{envelope_data, logged};
use crate::client::{ApiClient, ApiError};

pub async fn list(client: &ApiClient) -> Result<Value, ApiError> {
    logged("fetching blogs", client.get("/blogs").await).map(envelope_data)
}

pub async fn get(client: &ApiClient, id: &str) -> Result<Value, ApiError> {
    logged("fetching blog detail", client.get(format!("/blogs/{}", id)).await).map(envelope_data)
}

pub async fn create(client: &ApiClient, blog: Value) -> Result<Value, ApiError> {
    logged("creating blog", client.post("/blogs", Some(blog)).await).map(envelope_data)
}

/// The blog to update is identified by the `_id` inside `blog`.
pub async fn update(client: &ApiClient, blog: Value) -> Result<Value, ApiError> {
    if blog.get("_id").and_then(Value::as_str).is_none() {
        return Err(ApiError::InvalidRequest(
            "blog update payload needs an `_id`".to_string(),
        ));
    }
    logged("updating blog", client.patch("/blogs", Some(blog)).await).map(envelope_data)
}

pub async fn delete(client: &ApiClient, id: &str) -> Result<Value, ApiError> {
    logged("deleting blog", client.delete(format!("/blogs/{}", id)).await).map(envelope_data)
}
