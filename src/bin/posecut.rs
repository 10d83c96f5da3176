//! Entry point for the posecut service and CLI

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    posecut::cli::run().await
}
