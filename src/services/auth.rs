use serde_json::json;

use super::{decode_data, logged};
use crate::client::{ApiClient, ApiError, CURRENT_USER_PATH, LOGIN_PATH, LOGOUT_PATH};
use crate::models::{LoginData, UserSummary};

/// `POST /auth/login`. A 401 here is a wrong password, never a refresh trigger.
pub async fn login(client: &ApiClient, email: &str, password: &str) -> Result<LoginData, ApiError> {
    let body = json!({ "email": email, "password": password });
    let payload = logged("logging in", client.post(LOGIN_PATH, Some(body)).await)?;
    decode_data(LOGIN_PATH, payload)
}

/// `POST /auth/logout`, which also drops the refresh cookie server-side.
pub async fn logout(client: &ApiClient) -> Result<(), ApiError> {
    logged("logging out", client.post(LOGOUT_PATH, None).await)?;
    Ok(())
}

/// `GET /auth/current-user`: the user behind the stored token.
pub async fn current_user(client: &ApiClient) -> Result<UserSummary, ApiError> {
    #[derive(serde::Deserialize)]
    struct CurrentUser {
        user: UserSummary,
    }

    let payload = client.get(CURRENT_USER_PATH).await?;
    let current: CurrentUser = decode_data(CURRENT_USER_PATH, payload)?;
    Ok(current.user)
}
