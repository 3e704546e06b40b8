//! Serves the sample tables over HTTP.
//!
//! ```text
//! HERMES__SERVER__HTTP_ADDR=127.0.0.1:3000 cargo run -p hermes --example serve
//! curl -s localhost:3000/users -H 'Authorization: Bearer abc123'
//! ```

use anyhow::Context;
use hermes::core::fixtures;
use hermes::prelude::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ConfigLoader::new()
        .with_development()
        .with_dotenv()?
        .with_optional_file("hermes.toml")?
        .with_env_prefix("HERMES")
        .load()
        .context("loading settings")?;

    let api = Api::builder()
        .config(config)
        .registry(fixtures::sample_registry()?)
        .handlers(fixtures::sample_handlers())
        .build()?;

    api.init_telemetry()?;
    api.serve().await.context("serving")?;
    Ok(())
}
