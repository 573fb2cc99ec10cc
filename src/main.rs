use mlbb_hero_position::fetcher::Fetcher;
use mlbb_hero_position::hero_position::HeroPositionQuery;
use std::io;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load RUST_LOG from a .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let url = HeroPositionQuery::default().url()?;
    let fetcher = Fetcher::new()?;

    mlbb_hero_position::run(&fetcher, url.as_str(), &mut io::stdout(), &mut io::stderr()).await?;

    Ok(())
}
