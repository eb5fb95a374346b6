use std::{ffi::OsStr, sync::Arc};

use aide::{
    axum::{
        ApiRouter,
        routing::{delete, get, put},
    },
    openapi::{Info, OpenApi},
    scalar::Scalar,
    transform::TransformOpenApi,
};
use anyhow::{Context as _, Result, anyhow};
use app_state::AppState;
use axum::{
    Extension, Json,
    extract::{DefaultBodyLimit, Request},
    http::{self, HeaderValue, Method},
    response::IntoResponse,
};
use log::{error, info};
use tokio::signal;
use tower_http::{
    LatencyUnit,
    cors::CorsLayer,
    trace::{
        DefaultOnBodyChunk, DefaultOnEos, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse,
        TraceLayer,
    },
};
use tracing::{Level, info_span};

use crate::errors::{SerializedError, not_found_error};

mod app_state;
mod auth;
mod delete_document;
mod fetch_document_corrections;
mod fetch_final_text;
mod fetch_page_comparison;
mod ingest_page_comparison;
mod ping;
mod requests;
mod responses;
mod save_page_correction;

pub async fn create_server(config_path: Option<&OsStr>) -> Result<()> {
    // `gen` needs the raw form since it became a keyword in Rust 2024.
    aide::r#gen::on_error(|err| error!("{err}"));
    aide::r#gen::extract_schemas(true);

    let app_state = AppState::try_new(config_path)
        .await
        .context("Failed to initialise app state")?;

    let address = format!(
        "{}:{}",
        &app_state.config.server.host, &app_state.config.server.port
    );

    let mut api = OpenApi {
        info: Info {
            title: "Collate correction store".to_owned(),
            summary: Some(
                "Stores page comparison snapshots and the reviewer's corrections per page."
                    .to_owned(),
            ),
            description: Some(include_str!("../README.md").to_owned()),
            version: env!("CARGO_PKG_VERSION").to_owned(),
            ..Info::default()
        },
        ..OpenApi::default()
    };

    let app = ApiRouter::new()
        .api_route("/ping", get(ping::ping))
        .api_route(
            "/documents/:document_id/pages/:page_number/comparison",
            put(ingest_page_comparison::ingest_page_comparison),
        )
        .api_route(
            "/documents/:document_id/pages/:page_number/comparison",
            get(fetch_page_comparison::fetch_page_comparison),
        )
        .api_route(
            "/documents/:document_id/pages/:page_number/correction",
            put(save_page_correction::save_page_correction),
        )
        .api_route(
            "/documents/:document_id/corrections",
            get(fetch_document_corrections::fetch_document_corrections),
        )
        .api_route(
            "/documents/:document_id/final",
            get(fetch_final_text::fetch_final_text),
        )
        .api_route(
            "/documents/:document_id",
            delete(delete_document::delete_document),
        )
        .route("/", Scalar::new("/api.json").axum_route())
        .route("/api.json", axum::routing::get(serve_api))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    info_span!(
                        "http_request",
                        method = ?request.method(),
                        uri = ?request.uri(),
                    )
                })
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .latency_unit(LatencyUnit::Millis),
                )
                .on_body_chunk(DefaultOnBodyChunk::new())
                .on_eos(DefaultOnEos::new())
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
        .layer(DefaultBodyLimit::max(
            app_state.config.server.max_body_size_mb * 1024 * 1024,
        ))
        .layer(
            CorsLayer::new()
                .allow_origin("*".parse::<HeaderValue>().expect("Failed to parse origin"))
                .allow_headers([http::header::CONTENT_TYPE, http::header::AUTHORIZATION])
                .allow_methods([Method::GET, Method::PUT, Method::DELETE]),
        )
        .with_state(app_state)
        .finish_api_with(&mut api, api_docs)
        .layer(Extension(Arc::new(api)))
        .fallback(handler_404)
        .into_make_service();

    let listener = tokio::net::TcpListener::bind(address.clone())
        .await
        .with_context(|| format!("Failed to bind to address: {address}"))?;

    info!(
        "Listening on http://{}",
        listener
            .local_addr()
            .context("Failed to get local address")?
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .tcp_nodelay(true)
        .await
        .context("Failed to start server")
}

async fn serve_api(Extension(api): Extension<Arc<OpenApi>>) -> impl IntoResponse { Json(api) }

fn api_docs(api: TransformOpenApi<'_>) -> TransformOpenApi<'_> {
    api.default_response_with::<Json<SerializedError>, _>(|res| {
        res.example(SerializedError {
            message: "An error has occurred".to_owned(),
            causes: vec![],
        })
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

async fn handler_404() -> impl IntoResponse { not_found_error(anyhow!("Page not found")) }
