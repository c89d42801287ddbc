use crate::config::AppConfig;
use crate::database::DatabaseManager;

pub async fn handle(config: AppConfig) -> anyhow::Result<()> {
    let pool = DatabaseManager::connect(&config.database).await?;
    DatabaseManager::migrate(&pool).await?;
    DatabaseManager::close(&pool).await;

    println!(
        "Schema is up to date on {}",
        DatabaseManager::redacted_url(&config.database.url)
    );
    Ok(())
}
