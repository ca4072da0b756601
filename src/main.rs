use anyhow::Result;
use sorcer::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
