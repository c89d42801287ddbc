mod common;

use anyhow::Result;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde_json::Value;

fn image(name: &str, mime: &str) -> Result<Part> {
    Ok(Part::bytes(b"\x89PNG fake image bytes".to_vec())
        .file_name(name.to_string())
        .mime_str(mime)?)
}

#[tokio::test]
async fn upload_reports_missing_fields_and_images() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let form = Form::new().text("type", "rent").text("shopName", "Asha Rentals");
    let res = client.post(server.url("/api/shops")).multipart(form).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: Value = res.json().await?;
    assert_eq!(body["error"], "Missing required fields");
    assert_eq!(
        common::field_errors(&body),
        vec!["images", "itemName", "mobile", "ownerName", "price"]
    );
    Ok(())
}

#[tokio::test]
async fn upload_rejects_non_image_files_and_bad_items() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let form = Form::new()
        .text("type", "rent")
        .text("ownerName", "Asha")
        .text("mobile", "9000000001")
        .text("shopName", "Asha Rentals")
        .text("items", r#"[{"name": "Tent", "price": "cheap"}]"#)
        .part("images", image("menu.pdf", "application/pdf")?);

    let res = client.post(server.url("/api/shops")).multipart(form).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: Value = res.json().await?;
    assert_eq!(body["error"], "Invalid shop upload");
    assert_eq!(common::field_errors(&body), vec!["images", "items"]);
    assert!(body["field_errors"]["items"].as_str().unwrap_or_default().contains("items[0]"));
    Ok(())
}

#[tokio::test]
async fn upload_requires_a_multipart_body() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(server.url("/api/shops"))
        .json(&serde_json::json!({ "shopName": "Asha Rentals" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: Value = res.json().await?;
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "BAD_REQUEST");
    Ok(())
}

#[tokio::test]
async fn shop_ids_must_be_uuids() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client.get(server.url("/api/shops/not-a-uuid")).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client.delete(server.url("/api/shops/42")).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert!(body["error"].as_str().unwrap_or_default().starts_with("Malformed id"));
    Ok(())
}

#[tokio::test]
async fn malformed_shop_query_gets_the_json_envelope() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client.get(server.url("/api/shops?type=rent&type=sale")).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "BAD_REQUEST");
    assert!(body["error"].as_str().unwrap_or_default().starts_with("Invalid query string"));
    Ok(())
}
