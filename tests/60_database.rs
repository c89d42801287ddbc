mod common;

use anyhow::Result;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde_json::{json, Value};

// These tests need a live Postgres; each returns early when DATABASE_URL is unset.

async fn send_json(method: reqwest::Method, url: String, body: &Value) -> Result<(StatusCode, Value)> {
    let res = reqwest::Client::new().request(method, url).json(body).send().await?;
    let status = res.status();
    Ok((status, res.json().await?))
}

async fn get_json(url: String) -> Result<(StatusCode, Value)> {
    let res = reqwest::get(url).await?;
    let status = res.status();
    Ok((status, res.json().await?))
}

fn order_for(user_id: &str, phone: &str) -> Value {
    json!({
        "userId": user_id,
        "user": { "name": "Meera", "phone": phone },
        "shop": "Chat Point Cafe",
        "cart": {
            "Chat Point Cafe": {
                "Pani Puri": { "price": "40.00", "quantity": 2 },
                "Chai": { "price": "0.005", "quantity": "3" }
            }
        },
        "deliveryCharge": "0.004",
        "address": { "line1": "4 Lake View", "location": "Lat: 12.9716, Lng: 77.5946" },
        "paymentMethod": "upi",
        "totalAmount": 1
    })
}

#[tokio::test]
async fn signup_duplicate_and_login() -> Result<()> {
    let Some(server) = common::ensure_db_server().await? else {
        return Ok(());
    };
    let phone = common::unique_phone();
    let signup = json!({ "name": "Ravi", "phone": phone, "password": "s3cret" });

    let (status, body) = send_json(reqwest::Method::POST, server.url("/api/user/signup"), &signup).await?;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["data"]["phone"], phone.as_str());
    assert!(body["data"].get("password").is_none());

    let (status, body) = send_json(reqwest::Method::POST, server.url("/api/user/signup"), &signup).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let login = json!({ "phone": phone, "password": "s3cret" });
    let (status, body) = send_json(reqwest::Method::POST, server.url("/api/user/login"), &login).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Ravi");

    let wrong = json!({ "phone": phone, "password": "nope" });
    let (status, _) = send_json(reqwest::Method::POST, server.url("/api/user/login"), &wrong).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn concurrent_owner_signups_register_one_account() -> Result<()> {
    let Some(server) = common::ensure_db_server().await? else {
        return Ok(());
    };
    let signup = json!({ "phone": common::unique_phone(), "password": "owner-pass" });

    // some of these pass the lookup together and hit the unique index instead
    let attempts = (0..4).map(|_| send_json(reqwest::Method::POST, server.url("/api/owner/signup"), &signup));
    let results = futures::future::join_all(attempts).await;

    let mut created = 0;
    for result in results {
        let (status, body) = result?;
        match status {
            StatusCode::CREATED => created += 1,
            StatusCode::BAD_REQUEST => assert_eq!(body["success"], false),
            other => panic!("unexpected status {} ({})", other, body),
        }
    }
    assert_eq!(created, 1);
    Ok(())
}

#[tokio::test]
async fn placed_orders_keep_exact_amounts_and_are_queryable() -> Result<()> {
    let Some(server) = common::ensure_db_server().await? else {
        return Ok(());
    };
    let user_id = uuid::Uuid::new_v4().to_string();
    let phone = common::unique_phone();

    let (status, placed) =
        send_json(reqwest::Method::POST, server.url("/api/orders"), &order_for(&user_id, &phone)).await?;
    assert_eq!(status, StatusCode::CREATED, "{}", placed);
    let id = placed["data"]["id"].as_str().unwrap_or_default().to_string();

    let (status, fetched) = get_json(server.url(&format!("/api/orders/{}", id))).await?;
    assert_eq!(status, StatusCode::OK);
    let order = &fetched["data"];
    assert_eq!(order["status"], "pending");
    assert_eq!(order["paymentMethod"], "upi");
    assert_eq!(order["deliveryCharge"], "0.004");
    assert_eq!(order["totalAmount"], "80.019");
    assert_eq!(order["items"][0]["name"], "Pani Puri");
    assert_eq!(order["items"][1]["price"], "0.005");
    assert_eq!(order["items"][1]["quantity"], 3);
    assert_eq!(order["address"]["location"]["lat"], 12.9716);

    let (status, mine) = get_json(server.url(&format!("/api/orders/user/{}", user_id))).await?;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = mine["data"].as_array().into_iter().flatten().filter_map(|o| o["id"].as_str()).collect();
    assert_eq!(ids, vec![id.as_str()]);

    let (status, pending) = get_json(server.url("/api/orders/pending")).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(pending["data"].as_array().into_iter().flatten().any(|o| o["id"] == id.as_str()));
    Ok(())
}

#[tokio::test]
async fn oversize_amounts_are_rejected_before_storage() -> Result<()> {
    let Some(server) = common::ensure_db_server().await? else {
        return Ok(());
    };
    let mut body = order_for(&uuid::Uuid::new_v4().to_string(), &common::unique_phone());
    body["cart"] = json!({ "Yacht": { "price": "10000000000000" } });

    let (status, body) = send_json(reqwest::Method::POST, server.url("/api/orders"), &body).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(common::field_errors(&body), vec!["cart"]);
    Ok(())
}

#[tokio::test]
async fn only_one_concurrent_status_change_wins() -> Result<()> {
    let Some(server) = common::ensure_db_server().await? else {
        return Ok(());
    };
    let (status, placed) = send_json(
        reqwest::Method::POST,
        server.url("/api/orders"),
        &order_for(&uuid::Uuid::new_v4().to_string(), &common::unique_phone()),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    let url = server.url(&format!("/api/orders/{}/status", placed["data"]["id"].as_str().unwrap_or_default()));

    let delivered = json!({ "status": "delivered" });
    let cancelled = json!({ "status": "cancelled" });
    let (a, b) = tokio::join!(
        send_json(reqwest::Method::PATCH, url.clone(), &delivered),
        send_json(reqwest::Method::PATCH, url.clone(), &cancelled),
    );
    let mut statuses = vec![a?.0, b?.0];
    statuses.sort();
    assert_eq!(statuses, vec![StatusCode::OK, StatusCode::CONFLICT]);

    // a settled order stays settled
    let (status, _) = send_json(reqwest::Method::PATCH, url, &delivered).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    Ok(())
}

#[tokio::test]
async fn shop_upload_list_and_delete() -> Result<()> {
    let Some(server) = common::ensure_db_server().await? else {
        return Ok(());
    };
    let client = reqwest::Client::new();
    let mobile = common::unique_phone();

    let form = Form::new()
        .text("type", "rent")
        .text("ownerName", "Asha")
        .text("mobile", mobile.clone())
        .text("shopName", "Asha Rentals")
        .text("items", r#"[{"name": "Tent", "price": "499.50"}, {"name": "Stove", "price": 120}]"#)
        .part(
            "images",
            Part::bytes(b"\x89PNG tent".to_vec()).file_name("tent.png").mime_str("image/png")?,
        );
    let res = client.post(server.url("/api/shops")).multipart(form).send().await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = res.json().await?;
    let id = created["data"]["id"].as_str().unwrap_or_default().to_string();
    assert_eq!(created["data"]["imageUrl"].as_array().map(Vec::len), Some(1));

    let (status, listed) = get_json(server.url(&format!("/api/shops?type=rent&mobile={}", mobile))).await?;
    assert_eq!(status, StatusCode::OK);
    let shops = listed["data"].as_array().cloned().unwrap_or_default();
    assert_eq!(shops.len(), 1);
    assert_eq!(shops[0]["items"][0]["name"], "Tent");
    assert_eq!(shops[0]["items"][0]["price"], "499.50");

    let res = client.delete(server.url(&format!("/api/shops/{}", id))).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let (status, _) = get_json(server.url(&format!("/api/shops/{}", id))).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}
