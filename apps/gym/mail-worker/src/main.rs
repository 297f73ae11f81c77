//! Mail Worker Service - Entry Point
//!
//! Background worker that delivers mail jobs from the Redis stream.

#[tokio::main]
async fn main() -> eyre::Result<()> {
    gym_mail_worker::run().await
}
