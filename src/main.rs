#[tokio::main]
async fn main() -> anyhow::Result<()> {
    burndown_lib::run().await
}
