#![allow(dead_code)]

use std::sync::Arc;

use shopadmin::config::{load_config_from_str, ConfigV1};
use shopadmin::models::{LoginData, UserSummary};
use shopadmin::startup::build;
use shopadmin::state::AppState;

pub const STALE_TOKEN: &str = "stale-token";
pub const FRESH_TOKEN: &str = "fresh-token";

pub fn test_config(base_url: &str) -> ConfigV1 {
    let yaml = format!(
        r#"
version: "1.0.0"
api:
  base_url: "{}"
  timeout_in_ms: 5000
storage:
  type: memory
logging:
  level: debug
  format: console
"#,
        base_url
    );
    load_config_from_str(&yaml).expect("Failed to parse test config YAML")
}

pub fn build_app(base_url: &str) -> AppState {
    build(Arc::new(test_config(base_url))).expect("failed to build app state")
}

pub fn admin_login(token: &str) -> LoginData {
    LoginData {
        access_token: token.to_string(),
        user: serde_json::from_value::<UserSummary>(serde_json::json!({
            "_id": "admin-1",
            "email": "admin@shop.vn",
            "role": "admin"
        }))
        .expect("valid user"),
    }
}

pub fn fresh_token_body() -> String {
    format!(r#"{{"data": {{"access_token": "{}"}}}}"#, FRESH_TOKEN)
}
