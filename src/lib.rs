//! shelf application library
//!
//! Wires the books module to its store and serves it over HTTP.

pub mod modules;

use std::sync::Arc;

use anyhow::Context;
use shelf_kernel::{
    settings::{Settings, StoreBackend},
    InitCtx, ModuleRegistry,
};

use modules::books::store::{BookStore, InMemoryBookStore, MongoBookStore};

/// Re-export commonly used types
pub use modules::*;

/// Open the configured document store.
pub async fn open_store(settings: &Settings) -> anyhow::Result<Arc<dyn BookStore>> {
    match settings.database.backend {
        StoreBackend::Mongo => {
            let database = shelf_db::connect(&settings.database)
                .await
                .context("failed to connect to the books database")?;
            Ok(Arc::new(MongoBookStore::new(
                &database,
                &settings.database.collection,
            )))
        }
        StoreBackend::Memory => {
            tracing::warn!("using the in-memory store; books are lost on exit");
            Ok(Arc::new(InMemoryBookStore::new()))
        }
    }
}

/// Build a registry with every application module bound to `store`.
pub fn build_registry(store: Arc<dyn BookStore>, settings: &Settings) -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, store, settings);
    registry
}

/// Run the HTTP service until a shutdown signal arrives.
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let store = open_store(&settings).await?;
    let registry = build_registry(store, &settings);

    let ctx = InitCtx {
        settings: &settings,
    };
    registry
        .start_all(&ctx)
        .await
        .context("failed to start modules")?;

    let served = shelf_http::start_server(&registry, &settings, shelf_http::shutdown_signal()).await;

    registry
        .stop_all()
        .await
        .context("failed to stop modules")?;

    served
}
