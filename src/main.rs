mod modules;

use anyhow::Context;
use biblio_kernel::settings::{LogFormat, Settings};
use biblio_kernel::{InitCtx, ModuleRegistry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load biblio settings")?;

    match settings.telemetry.log_format {
        LogFormat::Pretty => tracing_subscriber::fmt::try_init().ok(),
        LogFormat::Json => tracing_subscriber::fmt().json().try_init().ok(),
    };

    tracing::info!(
        env = ?settings.environment,
        "biblio-app bootstrap starting"
    );

    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry);

    let ctx = InitCtx {
        settings: &settings,
    };
    registry.init_all(&ctx).await?;
    registry.start_all(&ctx).await?;

    tracing::info!("biblio-app bootstrap complete");

    biblio_http::start_server(&registry, &settings).await?;

    registry.stop_all().await?;
    Ok(())
}
