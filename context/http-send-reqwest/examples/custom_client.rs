use std::time::Duration;

use arcade_core::{Config, Context, OsEnv, Registry, RequestOptions};
use arcade_http_send_reqwest::ReqwestHttpSend;
use http::Method;
use reqwest::Client;
use serde_json::Value;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // The client never enforces timeouts itself, configure them on reqwest.
    let client = Client::builder()
        .timeout(Duration::from_secs(30))
        .pool_max_idle_per_host(10)
        .user_agent("arcade-example/1.0")
        .build()?;

    let ctx = Context::new()
        .with_http_send(ReqwestHttpSend::new(client))
        .with_env(OsEnv);
    let registry = Registry::new(ctx.clone());
    registry.configure(Config::new().from_env(&ctx))?;

    let manifest: Value = registry
        .client()?
        .request(
            Method::GET,
            "/basic/content/manifest/public?id=global",
            None,
            RequestOptions::new(),
        )
        .await?;
    println!("{manifest:#}");

    Ok(())
}
