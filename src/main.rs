use std::time::Duration;

use nt_mirror::utils::file_io::open_file_for_append;
use nt_mirror::AutoConfig;
use nt_mirror::Error;
use nt_mirror::FrameFreshness;
use nt_mirror::LoggingConfig;
use nt_mirror::Mirror;
use nt_mirror::MirrorBuilder;
use nt_mirror::MirrorConfig;
use nt_mirror::Result;
use tokio::signal::unix::signal;
use tokio::signal::unix::SignalKind;
use tokio::sync::watch;
use tokio::time::interval;
use tracing::error;
use tracing::info;
use tracing::warn;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;

const HEALTH_CHECK_INTERVAL: Duration = Duration::from_secs(1);

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> Result<()> {
    let settings = MirrorConfig::new()?.validate()?;

    // Initializing Logs
    let _guard = init_observability(&settings.logging)?;
    info!(?settings, "configuration loaded");

    // Initializing Shutdown Signal
    let (graceful_tx, graceful_rx) = watch::channel(());

    let mirror = MirrorBuilder::new(settings).build();

    let _new_entries = mirror.registry().on_new_entry_observed(|entry| {
        let value_type = entry.latest_value().map(|v| v.value_type).unwrap_or_default();
        info!(key = entry.key(), %value_type, "new key");
    });
    let _auto_configs = mirror
        .registry()
        .on_auto_configs(|configs| match AutoConfig::from_value(configs) {
            Ok(autos) => info!(autos = ?autos.auto_names(), paths = autos.paths.len(), "auto configurations updated"),
            Err(e) => warn!(error = %e, "auto configurations unreadable"),
        });

    tokio::spawn(watch_health(mirror.clone(), graceful_rx.clone()));

    info!(url = mirror.session().url(), "Mirror started. Waiting for CTRL+C signal...");
    // Listen on Shutdown Signal
    tokio::spawn(async {
        if let Err(e) = graceful_shutdown(graceful_tx).await {
            error!("Failed to shutdown: {:?}", e);
        }
    });

    if let Err(e) = mirror.run(graceful_rx).await {
        error!("mirror stops: {:?}", e);
    }

    println!("Exiting program.");
    Ok(())
}

/// Logs transitions of the feed between recent and stale.
async fn watch_health(
    mirror: Mirror,
    mut shutdown: watch::Receiver<()>,
) {
    let mut ticker = interval(HEALTH_CHECK_INTERVAL);
    let mut last = FrameFreshness::Never;

    loop {
        tokio::select! {
            biased;
            _ = shutdown.changed() => return,
            _ = ticker.tick() => {
                let now = mirror.registry().freshness();
                match (last, now) {
                    (FrameFreshness::Recent, FrameFreshness::Stale) => {
                        warn!(
                            last_frame = ?mirror.registry().last_successful_frame_time(),
                            "no telemetry received recently"
                        );
                    }
                    (FrameFreshness::Stale | FrameFreshness::Never, FrameFreshness::Recent) => {
                        info!(entries = mirror.registry().entry_count(), "telemetry flowing");
                    }
                    _ => {}
                }
                last = now;
            }
        }
    }
}

async fn graceful_shutdown(graceful_tx: watch::Sender<()>) -> Result<()> {
    let mut sigint = signal(SignalKind::interrupt()).map_err(Error::SignalHandler)?;
    let mut sigterm = signal(SignalKind::terminate()).map_err(Error::SignalHandler)?;
    tokio::select! {
        _ = sigint.recv() => {
            info!("SIGINT detected.");
        },
        _ = sigterm.recv() => {
            info!("SIGTERM detected.");
        },
        _ = tokio::signal::ctrl_c() => {
            info!("Ctrl+C detected.");
        },
    }

    info!("Shutdown mirror..");
    graceful_tx.send(()).map_err(|e| {
        error!("Failed to send shutdown signal: {}", e);
        Error::SignalSenderClosed(format!("Failed to send shutdown signal: {}", e))
    })?;

    info!("Shutdown completed");
    Ok(())
}

/// Installs the global subscriber, writing to stdout unless `log_dir` is set.
pub fn init_observability(logging: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let Some(log_dir) = &logging.log_dir else {
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().with_filter(env_filter()))
            .init();
        return Ok(None);
    };

    let log_file = open_file_for_append(&log_dir.join(&logging.file_name))?;
    let (non_blocking, guard) = tracing_appender::non_blocking(log_file);
    let base_subscriber = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_filter(env_filter());
    tracing_subscriber::registry().with(base_subscriber).init();

    Ok(Some(guard))
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}
