use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopItem {
    pub name: String,
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// What a shop offers: a catalog of items, or the fields of a single listing.
/// Serialized flat into the shop document so both storefront shapes round-trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Stock {
    Catalog {
        items: Vec<ShopItem>,
    },
    Single {
        #[serde(rename = "itemName")]
        item_name: String,
        price: Decimal,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
}

impl Stock {
    pub fn len(&self) -> usize {
        match self {
            Stock::Catalog { items } => items.len(),
            Stock::Single { .. } => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct ShopRow {
    pub id: Uuid,
    pub shop_type: String,
    pub owner_name: String,
    pub mobile: String,
    pub shop_name: String,
    pub stock: Json<Stock>,
    pub image_urls: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Shop document as returned to clients
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Shop {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub shop_type: String,
    pub owner_name: String,
    pub mobile: String,
    pub shop_name: String,
    #[serde(flatten)]
    pub stock: Stock,
    #[serde(rename = "imageUrl")]
    pub image_urls: Vec<String>,
    pub date: DateTime<Utc>,
}

impl From<ShopRow> for Shop {
    fn from(row: ShopRow) -> Self {
        Self {
            id: row.id,
            shop_type: row.shop_type,
            owner_name: row.owner_name,
            mobile: row.mobile,
            shop_name: row.shop_name,
            stock: row.stock.0,
            image_urls: row.image_urls,
            date: row.created_at,
        }
    }
}

/// Validated upload, before it is persisted
#[derive(Debug, Clone)]
pub struct NewShop {
    pub shop_type: String,
    pub owner_name: String,
    pub mobile: String,
    pub shop_name: String,
    pub stock: Stock,
    pub image_urls: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    fn shop(stock: Stock) -> Shop {
        Shop {
            id: Uuid::nil(),
            shop_type: "rent".into(),
            owner_name: "Asha".into(),
            mobile: "9000000001".into(),
            shop_name: "Asha Rentals".into(),
            stock,
            image_urls: vec!["https://cdn.example.com/a.png".into()],
            date: Utc::now(),
        }
    }

    #[test]
    fn catalog_serializes_items_array() {
        let value = serde_json::to_value(shop(Stock::Catalog {
            items: vec![ShopItem {
                name: "Drill".into(),
                price: Decimal::from_str("150.00").unwrap(),
                description: None,
            }],
        }))
        .unwrap();

        assert_eq!(value["type"], "rent");
        assert_eq!(value["shopName"], "Asha Rentals");
        assert_eq!(value["items"][0]["name"], "Drill");
        assert!(value["items"][0].get("description").is_none());
        assert_eq!(value["imageUrl"][0], "https://cdn.example.com/a.png");
        assert!(value.get("itemName").is_none());
    }

    #[test]
    fn single_listing_serializes_flat_fields() {
        let value = serde_json::to_value(shop(Stock::Single {
            item_name: "Bicycle".into(),
            price: Decimal::from(80),
            description: Some("Blue, 21 gears".into()),
        }))
        .unwrap();

        assert_eq!(value["itemName"], "Bicycle");
        assert_eq!(value["description"], "Blue, 21 gears");
        assert!(value.get("items").is_none());
    }

    #[test]
    fn stock_reads_back_from_stored_json() {
        let catalog: Stock = serde_json::from_value(json!({
            "items": [{"name": "Tent", "price": "499.00"}]
        }))
        .unwrap();
        assert_eq!(catalog.len(), 1);
        assert!(matches!(catalog, Stock::Catalog { .. }));

        let single: Stock = serde_json::from_value(json!({"itemName": "Kayak", "price": 1200})).unwrap();
        assert!(matches!(single, Stock::Single { .. }));
    }
}
