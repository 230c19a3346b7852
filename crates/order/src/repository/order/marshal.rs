use crate::model::{Order, OrderStatus};
use aws_sdk_dynamodb::types::AttributeValue;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shared::errors::RepositoryError;
use std::collections::HashMap;

/// Marshals an order into its item shape. The derived total is never
/// written; it is always recomputed from `subtotal` and `delivery_fee`.
pub(super) fn order_to_item(order: &Order) -> HashMap<String, AttributeValue> {
    HashMap::from([
        ("id".to_string(), AttributeValue::S(order.id.clone())),
        (
            "user_id".to_string(),
            AttributeValue::S(order.user_id.clone()),
        ),
        (
            "products".to_string(),
            AttributeValue::S(order.products.clone()),
        ),
        (
            "subtotal".to_string(),
            AttributeValue::N(order.subtotal.to_string()),
        ),
        (
            "delivery_fee".to_string(),
            AttributeValue::N(order.delivery_fee.to_string()),
        ),
        (
            "status".to_string(),
            AttributeValue::S(order.status.to_string()),
        ),
        (
            "created_at".to_string(),
            AttributeValue::S(order.created_at.to_rfc3339()),
        ),
        (
            "updated_at".to_string(),
            AttributeValue::S(order.updated_at.to_rfc3339()),
        ),
    ])
}

pub(super) fn item_to_order(
    item: &HashMap<String, AttributeValue>,
) -> Result<Order, RepositoryError> {
    Ok(Order {
        id: get_s(item, "id")?,
        user_id: get_s(item, "user_id")?,
        products: get_s(item, "products")?,
        subtotal: get_n(item, "subtotal")?,
        delivery_fee: get_n(item, "delivery_fee")?,
        status: parse_status(&get_s(item, "status")?)?,
        created_at: get_ts(item, "created_at")?,
        updated_at: get_ts(item, "updated_at")?,
    })
}

fn get_s(item: &HashMap<String, AttributeValue>, key: &str) -> Result<String, RepositoryError> {
    item.get(key)
        .and_then(|v| v.as_s().ok())
        .cloned()
        .ok_or_else(|| RepositoryError::Corrupt(format!("missing string attribute '{key}'")))
}

fn get_n(item: &HashMap<String, AttributeValue>, key: &str) -> Result<Decimal, RepositoryError> {
    let raw = item
        .get(key)
        .and_then(|v| v.as_n().ok())
        .ok_or_else(|| RepositoryError::Corrupt(format!("missing number attribute '{key}'")))?;

    raw.parse::<Decimal>()
        .map_err(|e| RepositoryError::Corrupt(format!("attribute '{key}' is not a decimal: {e}")))
}

fn get_ts(
    item: &HashMap<String, AttributeValue>,
    key: &str,
) -> Result<DateTime<Utc>, RepositoryError> {
    let raw = get_s(item, key)?;

    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Corrupt(format!("attribute '{key}' is not a timestamp: {e}")))
}

fn parse_status(raw: &str) -> Result<OrderStatus, RepositoryError> {
    raw.parse::<OrderStatus>()
        .map_err(RepositoryError::Corrupt)
}
