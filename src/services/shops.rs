use axum::body::Bytes;
use futures::future::join_all;
use serde_json::Value;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::Flavor;
use crate::database::models::{NewShop, Shop, ShopItem, ShopRow, Stock};
use crate::database::{Repository, ShopFilter};
use crate::error::ApiError;
use crate::services::{cart, required};
use crate::storage::{object_key, ObjectStore, StorageError};

const REQUIRED: &str = "This field is required";

/// One file part of a shop upload
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

/// Raw multipart upload: text fields by name (last value wins) plus every image part
#[derive(Debug, Default)]
pub struct ShopForm {
    pub fields: HashMap<String, String>,
    pub images: Vec<UploadedImage>,
}

/// A form that passed validation, images not yet stored
#[derive(Debug)]
pub struct ShopDraft {
    pub shop_type: String,
    pub owner_name: String,
    pub mobile: String,
    pub shop_name: String,
    pub stock: Stock,
    pub images: Vec<UploadedImage>,
}

impl ShopForm {
    fn field(&self, name: &str) -> Option<&str> {
        required(self.fields.get(name).map(String::as_str))
    }

    pub fn validate(self) -> Result<ShopDraft, ApiError> {
        let mut errors: HashMap<String, String> = HashMap::new();
        let mut missing = false;

        let mut take = |name: &str, errors: &mut HashMap<String, String>| match self.field(name) {
            Some(value) => Some(value.to_string()),
            None => {
                missing = true;
                errors.insert(name.to_string(), REQUIRED.to_string());
                None
            }
        };
        let shop_type = take("type", &mut errors);
        let owner_name = take("ownerName", &mut errors);
        let mobile = take("mobile", &mut errors);
        let shop_name = take("shopName", &mut errors);

        let stock = match self.field("items") {
            Some(raw) => parse_catalog(raw).map_err(|e| errors.insert("items".to_string(), e)).ok(),
            None => self.single_listing(&mut errors, &mut missing),
        };

        if self.images.is_empty() {
            errors.insert("images".to_string(), "At least one image is required".to_string());
        }
        for image in &self.images {
            if !image.content_type.starts_with("image/") {
                errors.insert(
                    "images".to_string(),
                    format!("'{}' is {}, not an image", image.file_name, image.content_type),
                );
            } else if image.bytes.is_empty() {
                errors.insert("images".to_string(), format!("'{}' is empty", image.file_name));
            }
        }

        match (shop_type, owner_name, mobile, shop_name, stock) {
            (Some(shop_type), Some(owner_name), Some(mobile), Some(shop_name), Some(stock)) if errors.is_empty() => {
                Ok(ShopDraft {
                    shop_type,
                    owner_name,
                    mobile,
                    shop_name,
                    stock,
                    images: self.images,
                })
            }
            _ => {
                let message = if missing { "Missing required fields" } else { "Invalid shop upload" };
                Err(ApiError::validation_error(message, Some(errors)))
            }
        }
    }

    fn single_listing(&self, errors: &mut HashMap<String, String>, missing: &mut bool) -> Option<Stock> {
        let item_name = self.field("itemName");
        if item_name.is_none() {
            *missing = true;
            errors.insert("itemName".to_string(), REQUIRED.to_string());
        }

        let price = match self.field("price") {
            Some(raw) => match cart::parse_amount(&Value::String(raw.to_string())) {
                Some(price) if !price.is_sign_negative() => Some(price),
                _ => {
                    errors.insert("price".to_string(), "price must be a non-negative amount".to_string());
                    None
                }
            },
            None => {
                *missing = true;
                errors.insert("price".to_string(), REQUIRED.to_string());
                None
            }
        };

        Some(Stock::Single {
            item_name: item_name?.to_string(),
            price: price?,
            description: self.field("description").map(str::to_string),
        })
    }
}

/// `items` holds a JSON array of `{name, price, description?}`
fn parse_catalog(raw: &str) -> Result<Stock, String> {
    let value: Value = serde_json::from_str(raw).map_err(|e| format!("items is not valid JSON: {}", e))?;
    let entries = value.as_array().ok_or("items must be a JSON array")?;
    if entries.is_empty() {
        return Err("items must list at least one item".to_string());
    }

    let mut items = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let name = entry
            .get("name")
            .or_else(|| entry.get("itemName"))
            .and_then(Value::as_str)
            .and_then(|s| required(Some(s)))
            .ok_or_else(|| format!("items[{}] has no name", index))?;
        let price = entry
            .get("price")
            .and_then(cart::parse_amount)
            .filter(|p| !p.is_sign_negative())
            .ok_or_else(|| format!("items[{}] has an invalid price", index))?;
        let description = entry
            .get("description")
            .and_then(Value::as_str)
            .and_then(|s| required(Some(s)))
            .map(str::to_string);

        items.push(ShopItem {
            name: name.to_string(),
            price,
            description,
        });
    }

    Ok(Stock::Catalog { items })
}

pub struct ShopService {
    shops: Repository<ShopRow>,
    store: Arc<dyn ObjectStore>,
    flavor: Flavor,
}

impl ShopService {
    pub fn new(pool: PgPool, store: Arc<dyn ObjectStore>, flavor: Flavor) -> Self {
        Self {
            shops: Repository::new(pool),
            store,
            flavor,
        }
    }

    pub async fn upload(&self, form: ShopForm) -> Result<Shop, ApiError> {
        let draft = form.validate()?;
        let image_urls = self.store_images(&draft.images).await?;

        let new_shop = NewShop {
            shop_type: draft.shop_type,
            owner_name: draft.owner_name,
            mobile: draft.mobile,
            shop_name: draft.shop_name,
            stock: draft.stock,
            image_urls: image_urls.clone(),
        };

        match self.shops.insert(new_shop).await {
            Ok(shop) => {
                info!(
                    shop_id = %shop.id,
                    shop_type = %shop.shop_type,
                    images = shop.image_urls.len(),
                    items = shop.stock.len(),
                    "Shop uploaded"
                );
                Ok(shop)
            }
            Err(err) => {
                self.remove_images(&image_urls).await;
                Err(err.into())
            }
        }
    }

    /// Upload every image concurrently. All or nothing: when one fails the
    /// others are removed again before the error is returned.
    pub async fn store_images(&self, images: &[UploadedImage]) -> Result<Vec<String>, StorageError> {
        let uploads = images.iter().map(|image| {
            let key = object_key(self.flavor, &image.file_name, &image.bytes);
            let store = Arc::clone(&self.store);
            async move { store.put(&key, &image.content_type, image.bytes.clone()).await }
        });

        let mut urls = Vec::with_capacity(images.len());
        let mut first_error = None;
        for result in join_all(uploads).await {
            match result {
                Ok(url) => urls.push(url),
                Err(err) if first_error.is_none() => first_error = Some(err),
                Err(err) => warn!("Additional image upload failure: {}", err),
            }
        }

        match first_error {
            None => Ok(urls),
            Some(err) => {
                warn!(stored = urls.len(), "Image upload failed, rolling back: {}", err);
                self.remove_images(&urls).await;
                Err(err)
            }
        }
    }

    /// Best effort; failures are logged and otherwise ignored
    async fn remove_images(&self, urls: &[String]) {
        let removals = urls.iter().map(|url| async move { (url, self.store.delete(url).await) });
        for (url, result) in join_all(removals).await {
            if let Err(err) = result {
                warn!(url = %url, "Failed to remove image: {}", err);
            }
        }
    }

    pub async fn list(&self, filter: &ShopFilter) -> Result<Vec<Shop>, ApiError> {
        Ok(self.shops.list(filter).await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<Shop, ApiError> {
        Ok(self.shops.select_404(id).await?.into())
    }

    pub async fn delete(&self, id: Uuid) -> Result<Shop, ApiError> {
        let shop: Shop = self.shops.delete_404(id).await?.into();
        self.remove_images(&shop.image_urls).await;
        info!(shop_id = %shop.id, "Shop deleted");
        Ok(shop)
    }
}
