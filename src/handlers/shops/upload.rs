use axum::extract::{
    multipart::{Multipart, MultipartRejection},
    State,
};

use crate::database::models::Shop;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::shops::{ShopForm, UploadedImage};
use crate::state::AppState;

const IMAGE_FIELDS: [&str; 2] = ["images", "image"];

/// POST /api/shops - create a shop from a multipart form
///
/// Text parts: `type`, `ownerName`, `mobile`, `shopName`, then either
/// `items` (JSON array of `{name, price, description?}`) or
/// `itemName` + `price` (+ `description`). File parts named `images` or
/// `image` are uploaded to the object store before the shop is saved.
pub async fn upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Shop> {
    let mut multipart = multipart.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    let form = read_form(&mut multipart).await?;
    let shop = state.shops().upload(form).await?;
    Ok(ApiResponse::created(shop))
}

async fn read_form(multipart: &mut Multipart) -> Result<ShopForm, ApiError> {
    let mut form = ShopForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();

        if IMAGE_FIELDS.contains(&name.as_str()) {
            let file_name = field.file_name().unwrap_or("image").to_string();
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let bytes = field.bytes().await?;
            form.images.push(UploadedImage {
                file_name,
                content_type,
                bytes,
            });
        } else if field.file_name().is_some() {
            tracing::debug!(field = %name, "Ignoring unexpected file part");
        } else {
            let value = field.text().await?;
            form.fields.insert(name, value);
        }
    }

    Ok(form)
}
