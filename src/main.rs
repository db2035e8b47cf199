use s3browser::app::App;
use s3browser::factory::default_factory;
use s3browser::Config;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("s3browser=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;
    tracing::info!(
        bind = %config.bind,
        static_dir = ?config.static_dir,
        "Starting s3browser"
    );

    App::new(config, default_factory()).run().await?;
    Ok(())
}
