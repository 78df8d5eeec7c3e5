#![warn(missing_docs, clippy::missing_docs_in_private_items)]

//! An HTTP relay that fronts a news-search provider.
//!
//! Gazette authenticates callers with a shared secret, forwards their search
//! to the NewsAPI "everything" endpoint, and reshapes the answer into a fixed
//! article schema. It is split into several subcrates that work in
//! collaboration.
//!
//! - [gazette-newsapi](../gazette_newsapi/index.html)
//! - [gazette-settings](../gazette_settings/index.html)
//! - [gazette-web](../gazette_web/index.html)
//! - [gazette-integration-tests](../gazette_integration_tests/index.html)

mod docs;

use anyhow::{Context, Result};
use cadence::{BufferedUdpMetricSink, QueuingMetricSink, StatsdClient};
use gazette_settings::{LogFormat, Settings};
use std::net::{TcpListener, UdpSocket};
use tracing_actix_web_mozlog::{JsonStorageLayer, MozLogFormatLayer};
use tracing_log::LogTracer;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

/// Primary entry point
#[actix_rt::main]
async fn main() -> Result<()> {
    let settings = Settings::load().context("Loading settings")?;
    init_logging(&settings).context("Initializing logging")?;
    let metrics_client = build_metrics_client(&settings).context("Building metrics client")?;
    let listener = TcpListener::bind(settings.http.listen).context("Binding port")?;

    tracing::info!(listen = %settings.http.listen, env = %settings.env, "Starting Gazette");

    gazette_web::run(listener, metrics_client, settings)
        .context("Starting gazette-web server")?
        .await
        .context("Running gazette-web server")?;

    Ok(())
}

/// Set up logging for Gazette, based on settings and the `RUST_LOG`
/// environment variable.
fn init_logging(settings: &Settings) -> Result<()> {
    LogTracer::init()?;
    let env_filter: EnvFilter = (&settings.logging.levels).into();

    match settings.logging.format {
        LogFormat::Pretty => {
            let subscriber = tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty());
            tracing::subscriber::set_global_default(subscriber)?;
        }
        LogFormat::Compact => {
            let subscriber = tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().compact());
            tracing::subscriber::set_global_default(subscriber)?;
        }
        LogFormat::MozLog => {
            let subscriber = tracing_subscriber::registry()
                .with(env_filter)
                .with(JsonStorageLayer)
                .with(MozLogFormatLayer::new("gazette", std::io::stdout));
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }

    Ok(())
}

/// Build a statsd client pointed at the configured metrics sink.
///
/// Metrics are sent over nonblocking UDP and queued off the request path, so
/// an unreachable sink never slows request handling down.
fn build_metrics_client(settings: &Settings) -> Result<StatsdClient> {
    let socket = UdpSocket::bind("0.0.0.0:0").context("Binding metrics socket")?;
    socket
        .set_nonblocking(true)
        .context("Setting metrics socket to nonblocking")?;

    let host = (
        settings.metrics.sink_host.as_str(),
        settings.metrics.sink_port,
    );
    let udp_sink = BufferedUdpMetricSink::from(host, socket).context("Building metrics sink")?;
    let queuing_sink = QueuingMetricSink::from(udp_sink);

    Ok(StatsdClient::from_sink("gazette", queuing_sink))
}
