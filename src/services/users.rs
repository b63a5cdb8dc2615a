use serde_json::Value;

use super::{envelope_data, logged};
use crate::client::{ApiClient, ApiError};

/// One page of non-admin users.
pub async fn list(client: &ApiClient, page: u32, limit: u32) -> Result<Value, ApiError> {
    let path = format!("/users?page={}&limit={}&role!=admin", page, limit);
    logged("fetching users", client.get(path).await).map(envelope_data)
}

pub async fn get(client: &ApiClient, id: &str) -> Result<Value, ApiError> {
    logged("fetching user", client.get(format!("/users/{}", id)).await).map(envelope_data)
}

pub async fn ban(client: &ApiClient, id: &str) -> Result<Value, ApiError> {
    logged("banning user", client.patch(format!("/users/{}/ban", id), None).await)
        .map(envelope_data)
}

pub async fn unban(client: &ApiClient, id: &str) -> Result<Value, ApiError> {
    logged("unbanning user", client.patch(format!("/users/{}/unban", id), None).await)
        .map(envelope_data)
}
