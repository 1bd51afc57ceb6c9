//! Medical information chat backend
//!
//! (c) Softlandia 2025

use medichat_api::api;
use medichat_api::core::answer::HttpAnswerProvider;
use medichat_api::core::services::{ConversationLocks, MyChatService};
use medichat_api::infrastructure::database::DatabaseConnection;
use medichat_api::infrastructure::repositories::{DbConversationRepository, DbUserDirectory};

use axum::Router;
use axum::http::{HeaderName, HeaderValue, Method, header};
use axum::routing::get;
use di::{Injectable, ServiceCollection};
use di_axum::RouterServiceProviderExtensions;
use log::info;
use std::env;
use tokio::runtime::{Builder, Runtime};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // initialize tracing
    tracing_subscriber::fmt::init();

    let runtime: Runtime = Builder::new_multi_thread().enable_all().build()?;
    runtime.block_on(web_server_task());

    Ok(())
}

async fn web_server_task() {
    let provider = ServiceCollection::new()
        .add(DatabaseConnection::singleton())
        .add(DbUserDirectory::scoped())
        .add(DbConversationRepository::scoped())
        .add(HttpAnswerProvider::singleton())
        .add(ConversationLocks::singleton())
        .add(MyChatService::scoped())
        .build_provider()
        .unwrap();

    let connection = provider.get_required::<DatabaseConnection>();
    sqlx::migrate!()
        .run(&**connection)
        .await
        .expect("failed to run migrations");

    // build our application with a route
    let app = Router::new()
        .nest("/api/chat", api::chat::router())
        .route("/api/chat/", get(api::chat::index))
        .layer(
            CorsLayer::new()
                .allow_origin("http://localhost:5173".parse::<HeaderValue>().unwrap())
                .allow_methods([Method::GET, Method::POST, Method::DELETE])
                .allow_headers([header::CONTENT_TYPE, HeaderName::from_static("x-user-id")])
                .allow_credentials(true),
        )
        .layer(TraceLayer::new_for_http())
        .with_provider(provider);

    let port = env::var("PORT").unwrap_or("8000".to_owned());
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .unwrap();
    info!("listening on {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.unwrap();
    info!("Shutting down...");
}
