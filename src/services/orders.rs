use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use sqlx::PgPool;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::database::models::{Address, Customer, NewOrder, Order, OrderRow};
use crate::database::Repository;
use crate::error::ApiError;
use crate::services::{cart, location::LocationInput, required};
use crate::types::{OrderStatus, PaymentMethod};

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Unknown order status '{0}'")]
    UnknownStatus(String),

    #[error("Unknown payment method '{0}', expected cod, upi or card")]
    UnknownPaymentMethod(String),

    #[error("deliveryCharge must be a non-negative amount")]
    InvalidDeliveryCharge,

    #[error("Order is {from} and cannot become {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
}

#[derive(Debug, Default, Deserialize)]
pub struct CustomerInput {
    pub name: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AddressInput {
    pub line1: Option<String>,
    pub line2: Option<String>,
    pub location: Option<LocationInput>,
}

/// Body of `POST /api/orders`. Everything is optional here so that absent
/// fields surface as one validation error instead of a deserialization failure.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    pub user_id: Option<String>,
    pub user: Option<CustomerInput>,
    /// Shop name, or the shop document the client had on screen
    pub shop: Option<Value>,
    pub cart: Option<Value>,
    pub delivery_charge: Option<Value>,
    pub address: Option<AddressInput>,
    pub payment_method: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: Option<String>,
}

/// Validate a request and compute its line items and totals
pub fn prepare(request: PlaceOrderRequest) -> Result<NewOrder, ApiError> {
    let user = request.user.unwrap_or_default();
    let address = request.address.unwrap_or_default();

    let name = required(user.name.as_deref());
    let phone = required(user.phone.as_deref());
    let shop = request.shop.as_ref().and_then(shop_label);
    let line1 = required(address.line1.as_deref());
    let payment = required(request.payment_method.as_deref());
    let cart_value = request.cart.as_ref().filter(|c| !c.is_null());

    let mut missing = Vec::new();
    for (field, present) in [
        ("user.name", name.is_some()),
        ("user.phone", phone.is_some()),
        ("shop", shop.is_some()),
        ("cart", cart_value.is_some()),
        ("address.line1", line1.is_some()),
        ("paymentMethod", payment.is_some()),
    ] {
        if !present {
            missing.push(field);
        }
    }
    if !missing.is_empty() {
        return Err(ApiError::missing_fields(&missing));
    }

    let (Some(name), Some(phone), Some(shop), Some(cart_value), Some(line1), Some(payment)) =
        (name, phone, shop, cart_value, line1, payment)
    else {
        return Err(ApiError::internal_server_error("order validation failed"));
    };

    let user_id = match required(request.user_id.as_deref()) {
        Some(raw) => Some(Uuid::parse_str(raw)?),
        None => None,
    };

    let payment_method: PaymentMethod = payment
        .parse()
        .map_err(OrderError::UnknownPaymentMethod)?;

    let delivery_charge = match request.delivery_charge.as_ref().filter(|v| !v.is_null()) {
        Some(raw) => cart::parse_amount(raw)
            .filter(|d| *d >= Decimal::ZERO)
            .ok_or(OrderError::InvalidDeliveryCharge)?,
        None => Decimal::ZERO,
    };
    let delivery_charge = cart::check_amount(delivery_charge)?;

    let flat = cart::flatten(cart_value)?;
    let total_amount = flat
        .subtotal
        .checked_add(delivery_charge)
        .ok_or(cart::CartError::Overflow)
        .and_then(cart::check_amount)?;

    let location = match &address.location {
        Some(input) => input.resolve()?,
        None => None,
    };

    Ok(NewOrder {
        user_id,
        user: Customer {
            name: name.to_string(),
            phone: phone.to_string(),
        },
        shop,
        items: flat.items,
        total_amount,
        delivery_charge,
        address: Address {
            line1: line1.to_string(),
            line2: required(address.line2.as_deref()).map(str::to_string),
            location,
        },
        payment_method,
    })
}

fn shop_label(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => required(Some(s.as_str())).map(str::to_string),
        Value::Object(map) => ["shopName", "name", "id"]
            .iter()
            .find_map(|k| map.get(*k).and_then(Value::as_str).and_then(|s| required(Some(s))))
            .map(str::to_string),
        _ => None,
    }
}

pub fn parse_status(raw: &str) -> Result<OrderStatus, OrderError> {
    raw.parse().map_err(OrderError::UnknownStatus)
}

pub struct OrderService {
    orders: Repository<OrderRow>,
}

impl OrderService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            orders: Repository::new(pool),
        }
    }

    pub async fn place(&self, request: PlaceOrderRequest) -> Result<Order, ApiError> {
        let new_order = prepare(request)?;
        let order = self.orders.insert(new_order).await?;
        info!(
            order_id = %order.id,
            shop = %order.shop,
            items = order.items.len(),
            total = %order.total_amount,
            "Order placed"
        );
        Ok(order)
    }

    pub async fn get(&self, id: Uuid) -> Result<Order, ApiError> {
        Ok(self.orders.get(id).await?)
    }

    pub async fn for_user(&self, user_id: Uuid) -> Result<Vec<Order>, ApiError> {
        Ok(self.orders.by_user(user_id).await?)
    }

    pub async fn with_status(&self, status: OrderStatus) -> Result<Vec<Order>, ApiError> {
        Ok(self.orders.by_status(status).await?)
    }

    /// Move a pending order to delivered or cancelled
    pub async fn update_status(&self, id: Uuid, to: OrderStatus) -> Result<Order, ApiError> {
        let current = self.orders.get(id).await?;
        if !current.status.can_transition_to(to) {
            return Err(OrderError::InvalidTransition { from: current.status, to }.into());
        }

        match self.orders.transition(id, current.status, to).await? {
            Some(order) => {
                info!(order_id = %id, from = %current.status, to = %to, "Order status changed");
                Ok(order)
            }
            None => {
                // Lost a race with another update; report where the order ended up
                let latest = self.orders.get(id).await?;
                Err(OrderError::InvalidTransition { from: latest.status, to }.into())
            }
        }
    }
}
