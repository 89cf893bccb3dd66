mod db;
mod llm;
mod model;
mod persistence;
mod routes;
mod services;
mod state;
mod store;
mod wizard;

use std::sync::Arc;

use crate::llm::LlmChat;
use crate::persistence::local::LocalStore;
use crate::store::ProjectStore;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()
        .expect("invalid PORT");

    // Optional Postgres pool: without it the app runs local-only, with
    // auth and hosted sync disabled.
    let pool = match std::env::var("DATABASE_URL") {
        Ok(url) => Some(db::init_pool(&url).await.expect("database init failed")),
        Err(_) => {
            tracing::info!("DATABASE_URL not set — auth and hosted sync disabled");
            None
        }
    };

    // Initialize LLM client (non-fatal: suggestion endpoints serve canned
    // responses if config is missing).
    let llm: Option<Arc<dyn LlmChat>> = match llm::LlmClient::from_env() {
        Ok(client) => {
            tracing::info!(model = client.model(), "LLM client initialized");
            Some(Arc::new(client))
        }
        Err(e) => {
            tracing::warn!(error = %e, "LLM client not configured — serving canned suggestions");
            None
        }
    };

    let data_dir = persistence::local::data_dir_from_env();
    let mut store = ProjectStore::new(Box::new(LocalStore::new(&data_dir)));
    store.initialize().await.expect("project store init failed");
    tracing::info!(projects = store.projects().len(), dir = %data_dir.display(), "project store loaded");

    let state = state::AppState::new(store, pool, llm);

    let app = routes::api_routes(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "content-wizard listening");
    axum::serve(listener, app).await.expect("server failed");
}
