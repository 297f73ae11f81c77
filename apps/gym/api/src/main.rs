//! Gym API - Entry Point

#[tokio::main]
async fn main() -> eyre::Result<()> {
    gym_api::run().await
}
