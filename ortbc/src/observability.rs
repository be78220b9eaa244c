//! Logging, error reporting and metrics setup for the `ortbc` binary.

use crate::config::{CommonConfig, MetricsConfig};
use metrics_exporter_statsd::StatsdBuilder;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const METRICS_PREFIX: &str = "ortbc";

#[derive(thiserror::Error, Debug)]
pub enum ObservabilityError {
    #[error("could not build statsd recorder: {0}")]
    Statsd(#[from] metrics_exporter_statsd::StatsdError),
    #[error("a metrics recorder is already installed")]
    RecorderAlreadyInstalled,
}

/// Keeps the sentry client alive. Events are flushed when it is dropped.
pub struct ObservabilityGuard {
    _sentry: Option<sentry::ClientInitGuard>,
}

/// Installs the tracing subscriber and, when configured, sentry and the statsd
/// recorder.
///
/// Logs go to stderr so stdout only carries conversion output. `RUST_LOG`
/// controls the level, `info` by default.
pub fn init(config: &CommonConfig) -> Result<ObservabilityGuard, ObservabilityError> {
    let sentry_guard = config.logging.as_ref().map(|logging| {
        sentry::init((
            logging.sentry_dsn.as_str(),
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(sentry_guard.as_ref().map(|_| sentry::integrations::tracing::layer()))
        .init();

    if let Some(metrics_config) = &config.metrics {
        init_metrics(metrics_config)?;
    }

    Ok(ObservabilityGuard {
        _sentry: sentry_guard,
    })
}

fn init_metrics(config: &MetricsConfig) -> Result<(), ObservabilityError> {
    let recorder = StatsdBuilder::from(config.statsd_host.as_str(), config.statsd_port)
        .build(Some(METRICS_PREFIX))?;
    metrics::set_global_recorder(recorder).map_err(|_| ObservabilityError::RecorderAlreadyInstalled)?;
    ortb_converter::metrics_defs::describe_metrics();

    tracing::info!(
        host = %config.statsd_host,
        port = config.statsd_port,
        "Sending metrics to statsd"
    );
    Ok(())
}
