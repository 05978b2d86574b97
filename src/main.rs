//! Binary entry point: load `.env`, then hand off to the library.

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    somo::run().await
}
