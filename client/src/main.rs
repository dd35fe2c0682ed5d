use std::env;

use bank_client::{demo, BankApiClient, DEFAULT_BASE_URL};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    dotenvy::dotenv().ok();

    let base_url = env::var("BANK_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
    let mut client = BankApiClient::new(base_url);
    if let Some(secret) = env::var("API_SECRET").ok().filter(|s| !s.trim().is_empty()) {
        client = client.with_api_key(secret);
    }

    info!("Make sure the bank registry is running at {}", client.base_url());

    let report = demo::run(&client).await?;
    for outcome in &report.completed {
        println!("{:>7}: {}", outcome.step.name(), outcome.summary);
    }

    Ok(())
}
