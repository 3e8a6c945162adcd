use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    pizzabot_cli::run().await
}
