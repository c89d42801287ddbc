use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use uuid::Uuid;

use crate::types::{Location, OrderStatus, PaymentMethod};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub line1: String,
    #[serde(default)]
    pub line2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

#[derive(Debug, Clone, FromRow)]
pub struct OrderRow {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub customer: Json<Customer>,
    pub shop: String,
    pub items: Json<Vec<LineItem>>,
    pub total_amount: Decimal,
    pub delivery_charge: Decimal,
    pub address: Json<Address>,
    pub payment_method: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Order document as returned to clients
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub user: Customer,
    pub shop: String,
    pub items: Vec<LineItem>,
    pub total_amount: Decimal,
    pub delivery_charge: Decimal,
    pub address: Address,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub date: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = sqlx::Error;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let payment_method = row
            .payment_method
            .parse()
            .map_err(|v| sqlx::Error::Decode(format!("unknown payment method '{}' on order {}", v, row.id).into()))?;
        let status = row
            .status
            .parse()
            .map_err(|v| sqlx::Error::Decode(format!("unknown status '{}' on order {}", v, row.id).into()))?;

        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            user: row.customer.0,
            shop: row.shop,
            items: row.items.0,
            total_amount: row.total_amount,
            delivery_charge: row.delivery_charge,
            address: row.address.0,
            payment_method,
            status,
            date: row.created_at,
        })
    }
}

/// Validated order, before it is persisted
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: Option<Uuid>,
    pub user: Customer,
    pub shop: String,
    pub items: Vec<LineItem>,
    pub total_amount: Decimal,
    pub delivery_charge: Decimal,
    pub address: Address,
    pub payment_method: PaymentMethod,
}
