use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The only role allowed into the admin screens.
pub const ADMIN_ROLE: &str = "admin";

/// The signed-in user as returned by the backend.
///
/// Only the fields the client acts on are typed; everything else the
/// backend sends is kept verbatim in `extra`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct UserSummary {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserSummary {
    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some(ADMIN_ROLE)
    }
}

/// Payload of a successful `POST /auth/login`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LoginData {
    pub access_token: String,
    pub user: UserSummary,
}
