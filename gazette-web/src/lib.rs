#![warn(missing_docs, clippy::missing_docs_in_private_items)]

//! Web server for [Gazette](../gazette/index.html)'s public API.

mod dockerflow;
mod errors;
mod extractors;
mod logging;
mod middleware;
mod search;

use actix_cors::Cors;
use actix_web::{
    dev::Server,
    web::{self, Data},
    App, HttpResponse, HttpServer,
};
use anyhow::{Context, Result};
use cadence::StatsdClient;
use gazette_newsapi::NewsApiClient;
use gazette_settings::Settings;
use std::net::TcpListener;
use tracing_actix_web::TracingLogger;

use crate::logging::GazetteRootSpanBuilder;

/// Run the web server
///
/// The returned server is a `Future` that must either be `.await`ed, or run as
/// a background task using `tokio::spawn`.
///
/// Most of the details from `settings` will be respected, except for those
/// that go into building the listener (the host and port). If you want to
/// respect the settings specified in that object, you must include them in the
/// construction of `listener`.
///
/// # Errors
///
/// Returns an error if the upstream client cannot be built from the settings,
/// or if the server cannot be started on the provided listener.
///
/// # Examples
///
/// Run the server in the foreground. This will only return if there is an
/// error that causes the server to shut down. This is used to run Gazette as a
/// service, such as in production.
///
/// ```no_run
/// # tokio_test::block_on(async {
/// let listener = std::net::TcpListener::bind("127.0.0.1:8080")
///     .expect("Failed to bind port");
/// let settings = gazette_settings::Settings::load()
///     .expect("Failed to load settings");
/// let metrics_client = cadence::StatsdClient::from_sink("gazette", cadence::NopMetricSink);
/// gazette_web::run(listener, metrics_client, settings)
///     .expect("Failed to start server")
///     .await
///     .expect("Fatal error while running server");
/// # })
/// ```
///
/// Run the server as a background task. This will return immediately and
/// process requests. This is useful for tests.
///
/// ```no_run
/// use std::net::TcpListener;
/// use gazette_settings::Settings;
///
/// let listener = TcpListener::bind("127.0.0.1:8080")
///     .expect("Failed to bind port");
/// let settings = Settings::load()
///     .expect("Failed to load settings");
/// let metrics_client = cadence::StatsdClient::from_sink("gazette", cadence::NopMetricSink);
/// let server = gazette_web::run(listener, metrics_client, settings)
///     .expect("Failed to start server");
///
/// /// The server can be stopped with `join_handle::abort()`, if needed.
/// let join_handle = tokio::spawn(server);
/// ```
pub fn run(
    listener: TcpListener,
    metrics_client: StatsdClient,
    settings: Settings,
) -> Result<Server> {
    let num_workers = settings.http.workers;

    let news_client = Data::new(
        NewsApiClient::from_settings(&settings).context("Building news provider client")?,
    );
    let metrics_client = Data::new(metrics_client);
    let settings = Data::new(settings);

    let mut server = HttpServer::new(move || {
        App::new()
            .app_data(settings.clone())
            .app_data(news_client.clone())
            .app_data(metrics_client.clone())
            .wrap(TracingLogger::<GazetteRootSpanBuilder>::new())
            .wrap(middleware::Metrics)
            .wrap(Cors::permissive())
            // The core functionality of Gazette
            .service(
                web::resource("/")
                    .route(web::post().to(search::search))
                    .route(web::get().to(root_info)),
            )
            // Add the behavior necessary to satisfy Dockerflow.
            .service(web::scope("").configure(dockerflow::configure))
    })
    .listen(listener)
    .context("Binding server to listener")?;

    if let Some(n) = num_workers {
        server = server.workers(n);
    }

    Ok(server.run())
}

/// The root view, to provide information about what this service is.
///
/// This is intended to be seen by people trying to investigate what this
/// service is. It should redirect to documentation, if it is available, or
/// provide a short message otherwise.
async fn root_info(settings: Data<Settings>) -> HttpResponse {
    match &settings.public_documentation {
        Some(redirect_url) => HttpResponse::Found()
            .insert_header(("location", redirect_url.clone()))
            .finish(),
        None => HttpResponse::Ok()
            .content_type("text/plain")
            .body("Gazette is a relay service in front of the NewsAPI article search API."),
    }
}
