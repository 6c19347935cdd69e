//! MongoDB client factory.

use anyhow::Context;
use mongodb::{bson::doc, options::ClientOptions, Client, Database};

use shelf_kernel::settings::DatabaseSettings;

const APP_NAME: &str = "shelf";

/// Connect to the configured deployment and confirm it answers a ping.
///
/// The driver pools connections internally; the returned handle is cheap to
/// clone and safe to share across requests.
pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<Database> {
    let mut options = ClientOptions::parse(&settings.uri)
        .await
        .with_context(|| "invalid MongoDB connection string")?;
    options.app_name = Some(APP_NAME.to_string());

    let client = Client::with_options(options).context("failed to create MongoDB client")?;
    let database = client.database(&settings.name);

    database
        .run_command(doc! { "ping": 1 })
        .await
        .with_context(|| format!("MongoDB at '{}' did not answer ping", redact(&settings.uri)))?;

    tracing::info!(
        target: "shelf-db",
        database = %settings.name,
        "connected to MongoDB"
    );

    Ok(database)
}

/// Strip credentials from a connection string before it reaches a log line.
pub fn redact(uri: &str) -> String {
    let Some((scheme, rest)) = uri.split_once("://") else {
        return uri.to_string();
    };

    match rest.split_once('@') {
        Some((_, host)) => format!("{}://***@{}", scheme, host),
        None => uri.to_string(),
    }
}
