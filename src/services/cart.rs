//! Flattening of client-supplied carts into order line items.
//!
//! Carts arrive in whatever shape the storefront built them: keyed by shop,
//! by category, by item name, or as plain arrays. Any object carrying a
//! `price` is a line item; every other object or array is a group that is
//! walked depth-first in the order the client sent it.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::str::FromStr;
use thiserror::Error;

use crate::database::models::LineItem;

/// Groups may nest at most this deep
pub const MAX_DEPTH: usize = 8;

/// Prices, charges and totals must stay below this many currency units
pub const AMOUNT_LIMIT: i64 = 1_000_000_000_000;

/// Fails with [`CartError::Overflow`] once an amount reaches [`AMOUNT_LIMIT`]
pub fn check_amount(amount: Decimal) -> Result<Decimal, CartError> {
    if amount < Decimal::from(AMOUNT_LIMIT) {
        Ok(amount)
    } else {
        Err(CartError::Overflow)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    #[error("cart is empty")]
    Empty,

    #[error("cart must be an object or an array")]
    NotAMapping,

    #[error("cart nesting is deeper than {MAX_DEPTH} levels")]
    TooDeep,

    #[error("item at '{0}' has no name")]
    MissingName(String),

    #[error("item at '{0}' has an invalid price")]
    InvalidPrice(String),

    #[error("item at '{0}' has a negative price")]
    NegativePrice(String),

    #[error("item at '{0}' has an invalid quantity")]
    InvalidQuantity(String),

    #[error("entry at '{0}' is neither an item nor a group")]
    UnexpectedValue(String),

    #[error("cart total is too large")]
    Overflow,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlattenedCart {
    pub items: Vec<LineItem>,
    pub subtotal: Decimal,
}

pub fn flatten(cart: &Value) -> Result<FlattenedCart, CartError> {
    if !cart.is_object() && !cart.is_array() {
        return Err(CartError::NotAMapping);
    }

    let mut items = Vec::new();
    walk(cart, None, "cart", 0, &mut items)?;

    if items.is_empty() {
        return Err(CartError::Empty);
    }

    let subtotal = items.iter().try_fold(Decimal::ZERO, |acc, item| {
        item.price
            .checked_mul(Decimal::from(item.quantity))
            .and_then(|line| acc.checked_add(line))
            .ok_or(CartError::Overflow)
            .and_then(check_amount)
    })?;

    Ok(FlattenedCart { items, subtotal })
}

fn walk(
    value: &Value,
    key: Option<&str>,
    path: &str,
    depth: usize,
    out: &mut Vec<LineItem>,
) -> Result<(), CartError> {
    if depth > MAX_DEPTH {
        return Err(CartError::TooDeep);
    }

    match value {
        Value::Object(map) if map.contains_key("price") => {
            if let Some(item) = line_item(map, key, path)? {
                out.push(item);
            }
            Ok(())
        }
        Value::Object(map) => {
            for (child_key, child) in map {
                let child_path = format!("{}.{}", path, child_key);
                walk(child, Some(child_key), &child_path, depth + 1, out)?;
            }
            Ok(())
        }
        Value::Array(values) => {
            for (index, child) in values.iter().enumerate() {
                let child_path = format!("{}[{}]", path, index);
                walk(child, None, &child_path, depth + 1, out)?;
            }
            Ok(())
        }
        _ => Err(CartError::UnexpectedValue(path.to_string())),
    }
}

/// `Ok(None)` for a zero-quantity line, which is dropped
fn line_item(map: &Map<String, Value>, key: Option<&str>, path: &str) -> Result<Option<LineItem>, CartError> {
    let name = map
        .get("name")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .or_else(|| key.map(str::trim).filter(|s| !s.is_empty()))
        .ok_or_else(|| CartError::MissingName(path.to_string()))?;

    let price = map
        .get("price")
        .and_then(parse_amount)
        .ok_or_else(|| CartError::InvalidPrice(path.to_string()))?;
    if price < Decimal::ZERO {
        return Err(CartError::NegativePrice(path.to_string()));
    }
    check_amount(price)?;

    let quantity = match map.get("quantity").or_else(|| map.get("qty")) {
        None | Some(Value::Null) => 1,
        Some(raw) => parse_quantity(raw).ok_or_else(|| CartError::InvalidQuantity(path.to_string()))?,
    };
    if quantity == 0 {
        return Ok(None);
    }

    Ok(Some(LineItem {
        name: name.to_string(),
        price,
        quantity,
    }))
}

/// Reads a money amount from a JSON number or a numeric string
pub fn parse_amount(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return None,
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

fn parse_quantity(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => {
            if let Some(q) = n.as_u64() {
                u32::try_from(q).ok()
            } else {
                // 2.0 is fine, 2.5 and -1 are not
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= u32::MAX as f64)
                    .map(|f| f as u32)
            }
        }
        Value::String(s) => {
            let text = s.trim();
            text.parse::<u32>().ok().or_else(|| {
                // "2.0" follows the same whole-number rule as 2.0
                Decimal::from_str(text)
                    .ok()
                    .filter(|d| d.fract().is_zero())
                    .and_then(|d| d.to_u32())
            })
        }
        _ => None,
    }
}
