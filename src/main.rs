//! CGM peripherals - headless settings screen walkthrough
//!
//! Main entry point for the binary.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod app;

fn main() -> anyhow::Result<()> {
    let loaded = cgm_peripherals::storage::config::load_config();
    let config = loaded.as_ref().cloned().unwrap_or_default();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = &loaded {
        tracing::warn!("Using default configuration: {}", e);
    }

    tracing::info!("Starting cgm-peripherals v{}", env!("CARGO_PKG_VERSION"));

    let language = cgm_peripherals::i18n::resolve_language(&config.ui.language);
    cgm_peripherals::i18n::set_language(language);
    tracing::info!("Language: {}", cgm_peripherals::i18n::current_language());

    app::run_walkthrough()
}
