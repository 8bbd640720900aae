//! IDPool Worker Service Entry Point
//!
//! Loads configuration, registers identifier types, connects the counter
//! backend, and serves identifiers over HTTP.

use idpool_worker::run;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    run().await
}
