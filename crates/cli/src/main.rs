use anyhow::{bail, Context};
use clap::{Parser, Subcommand};

use shelf_kernel::settings::Settings;

/// Operator entrypoint for the shelf books service
#[derive(Debug, Parser)]
#[command(name = "shelf-cli", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the HTTP API until interrupted
    Serve,
    /// Delete every book and generate fresh placeholder data
    Seed {
        /// Number of books to generate
        #[arg(long)]
        amount: u64,
        /// Confirm that all existing books may be deleted
        #[arg(long)]
        yes: bool,
    },
    /// Print the effective configuration as JSON
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load().with_context(|| "failed to load shelf settings")?;

    match cli.command {
        Command::Serve => {
            shelf_telemetry::init(&settings.telemetry)?;
            shelf_app::run(settings).await
        }
        Command::Seed { amount, yes } => {
            if !yes {
                bail!("seeding deletes every existing book; pass --yes to confirm");
            }
            if amount > settings.admin.max_seed_amount {
                bail!(
                    "amount {} exceeds admin.max_seed_amount ({})",
                    amount,
                    settings.admin.max_seed_amount
                );
            }

            shelf_telemetry::init(&settings.telemetry)?;
            let store = shelf_app::open_store(&settings).await?;
            let report = shelf_app::books::seed::seed(store.as_ref(), amount)
                .await
                .context("seeding failed")?;
            tracing::info!(
                deleted = report.deleted,
                created = report.created,
                "books collection reseeded"
            );

            println!("{}", serde_json::to_string(&report)?);
            Ok(())
        }
        Command::Config => {
            println!("{}", serde_json::to_string_pretty(&settings)?);
            Ok(())
        }
    }
}
