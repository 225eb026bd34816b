//! # docxtract: Word document content extraction over HTTP
//!
//! `docxtract` is a small HTTP service that accepts an uploaded Word document and returns its
//! content as JSON. It exposes exactly one endpoint:
//!
//! ```text
//! POST /extract          multipart/form-data, file part named `document`
//! 200 application/json   {"content": "..."}
//! ```
//!
//! ## Request Flow
//!
//! 1. The multipart body is read with a size cap (`max_upload_size`, 10 MiB by default).
//! 2. The `document` part's declared `Content-Type` is checked against an allow-list (OOXML and
//!    legacy Word). Only the header is trusted; the bytes are never sniffed, so a client can
//!    spoof the type. Anything that is not really an OOXML package then fails in extraction.
//! 3. The part is streamed into a uniquely named temp file ([`staging`]).
//! 4. A [`ContentExtractor`](extract::ContentExtractor) runs on the blocking pool against the
//!    temp file. The strategy is set by configuration: flat text runs, or the body as XML.
//! 5. The temp file is removed, whatever the outcome, and the result is returned.
//!
//! Failures are returned as plain text with a 4xx/5xx status; see [`errors`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use docxtract::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = docxtract::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     docxtract::telemetry::init_telemetry(config.enable_otel_export)?;
//!
//!     Application::new(config)
//!         .serve(async {
//!             tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!         })
//!         .await
//! }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.

pub mod api;
pub mod config;
pub mod errors;
pub mod extract;
pub mod limits;
pub mod staging;
pub mod telemetry;

#[cfg(test)]
pub mod test_utils;

#[cfg(test)]
mod test;

use crate::extract::{ContentExtractor, create_extractor};
use crate::limits::Limiters;
use axum::{Router, extract::DefaultBodyLimit, routing::post};
use bon::Builder;
pub use config::Config;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{Level, debug, info};

/// Application state shared across all request handlers.
///
/// Everything here is read-only once built; requests never share mutable state.
#[derive(Clone, Builder)]
pub struct AppState {
    pub config: Arc<Config>,
    pub extractor: Arc<dyn ContentExtractor>,
    #[builder(default)]
    pub limiters: Limiters,
}

impl AppState {
    /// Build state from configuration, choosing the configured extraction strategy.
    pub fn from_config(config: Config) -> Self {
        let extractor = create_extractor(&config.extraction);
        let limiters = Limiters::new(&config.limits, config.extraction.max_part_size);

        AppState::builder()
            .config(Arc::new(config))
            .extractor(extractor)
            .limiters(limiters)
            .build()
    }
}

/// Build the application router.
///
/// `/extract` only serves `POST`; every other method on it gets a plain-text 405. The body
/// limit applies to the whole multipart request.
pub fn build_router(state: &AppState) -> Router {
    let extract_route = post(api::handlers::extract::extract_document)
        .layer(DefaultBodyLimit::max(state.config.max_upload_size))
        .fallback(api::handlers::extract::method_not_allowed);

    Router::new().route("/extract", extract_route).with_state(state.clone()).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    )
}

/// Main application struct that owns the router and configuration.
pub struct Application {
    router: Router,
    config: Arc<Config>,
    limiters: Limiters,
}

impl Application {
    pub fn new(config: Config) -> Self {
        debug!("Starting docxtract with configuration: {:#?}", config);

        let state = AppState::from_config(config);
        let router = build_router(&state);

        Self {
            router,
            config: state.config,
            limiters: state.limiters,
        }
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Bind the configured address and serve until `shutdown` resolves.
    ///
    /// Failing to bind the listener is returned as an error, which is fatal for the binary.
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!("Server starting on port {}...", self.config.port);
        info!(
            strategy = %self.config.extraction.strategy,
            max_upload_size = self.config.max_upload_size,
            max_part_size = self.config.extraction.max_part_size,
            "Listening on http://{}",
            listener.local_addr()?
        );
        match &self.limiters.extractions {
            Some(limiter) => info!(
                memory_ceiling = limiter.memory_ceiling(),
                "Extraction concurrency limited"
            ),
            None => debug!("Extraction concurrency unlimited"),
        }

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Shutting down telemetry...");
        telemetry::shutdown_telemetry();

        Ok(())
    }
}
