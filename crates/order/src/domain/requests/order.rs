use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

fn default_delivery_fee() -> Decimal {
    Decimal::new(500, 2)
}

fn validate_positive_price(price: &Decimal) -> Result<(), ValidationError> {
    if price > &Decimal::ZERO {
        Ok(())
    } else {
        Err(ValidationError::new("price_not_positive"))
    }
}

#[derive(Debug, Serialize, Deserialize, Validate, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderItemRequest {
    #[validate(length(min = 1))]
    pub product_id: String,

    #[validate(length(min = 1, max = 200))]
    pub name: String,

    #[validate(custom(function = "validate_positive_price"))]
    pub price: Decimal,

    #[validate(range(min = 1))]
    pub quantity: u32,
}

impl CreateOrderItemRequest {
    pub fn total_price(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

#[derive(Debug, Serialize, Deserialize, Validate, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[validate(length(min = 1))]
    pub auth_token: String,

    #[validate(length(min = 1), nested)]
    pub products: Vec<CreateOrderItemRequest>,

    #[serde(default = "default_delivery_fee")]
    pub delivery_fee: Decimal,
}

#[derive(Debug, Serialize, Deserialize, Validate, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderStatusRequest {
    #[validate(length(min = 1))]
    pub status: String,
}
