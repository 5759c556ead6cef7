use editor::{load_config, EditorConfig};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

pub(crate) struct AppWiring {
    pub(crate) config: EditorConfig,
}

/// `None` when the configuration could not be loaded; the cause is logged.
pub(crate) fn build_app() -> Option<AppWiring> {
    init_tracing();
    info!("=== Map Studio Startup ===");

    match load_config() {
        Ok(config) => {
            info!(
                title = %config.window.title,
                export_path = %config.export_path.display(),
                tileset = config
                    .tileset
                    .as_ref()
                    .map(|tileset| tileset.path.display().to_string())
                    .unwrap_or_else(|| "none".to_string()),
                "config_resolved"
            );
            Some(AppWiring { config })
        }
        Err(err) => {
            error!(error = %err, "config_load_failed");
            None
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}
