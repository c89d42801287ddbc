use anyhow::{bail, Context};
use serde_json::Value;
use std::time::Duration;

pub async fn handle(base_url: &str) -> anyhow::Result<()> {
    let url = format!("{}/health", base_url.trim_end_matches('/'));
    let client = reqwest::Client::builder().timeout(Duration::from_secs(5)).build()?;

    let response = client
        .get(&url)
        .send()
        .await
        .with_context(|| format!("could not reach {}", url))?;
    let status = response.status();
    let body: Value = response.json().await.unwrap_or(Value::Null);

    println!("{} {}", status.as_u16(), body);
    if !status.is_success() {
        bail!("{} reported {}", url, status);
    }
    Ok(())
}
