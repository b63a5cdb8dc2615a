use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::{orders, products, users};
use crate::client::{ApiClient, ApiError};
use crate::utils::format_vnd;

/// How many of the newest users the dashboard lists.
pub const RECENT_USERS: u32 = 5;

/// Everything the dashboard page renders, fetched in one go.
#[derive(Serialize, Debug, Clone)]
pub struct DashboardSummary {
    pub recent_users: Value,
    pub totals: Value,
    pub orders: Value,
    pub products: Value,
}

/// Fetches the dashboard sections concurrently; the first failure wins.
pub async fn summary(client: &ApiClient) -> Result<DashboardSummary, ApiError> {
    let (recent_users, totals, mut orders, products) = tokio::try_join!(
        users::list(client, 1, RECENT_USERS),
        orders::totals(client),
        orders::list(client),
        products::list(client),
    )?;
    debug!("Dashboard summary loaded");
    label_amounts(&mut orders);

    Ok(DashboardSummary {
        recent_users,
        totals,
        orders,
        products,
    })
}

/// Adds a compact `totalAmountLabel` next to every numeric `totalAmount`.
fn label_amounts(orders: &mut Value) {
    let Some(list) = orders.as_array_mut() else {
        return;
    };
    for order in list.iter_mut().filter_map(Value::as_object_mut) {
        if let Some(amount) = order.get("totalAmount").and_then(Value::as_f64) {
            order.insert("totalAmountLabel".to_string(), Value::String(format_vnd(amount)));
        }
    }
}
