use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    view, FailureHandling, HttpProductStore, ProductField, ProductListController,
};
use shared::domain::ProductId;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod shell;

use config::{load_settings, normalize_base_url};

#[derive(Parser, Debug)]
#[command(name = "products", about = "Manage a remote product list")]
struct Cli {
    /// Config file (defaults to ./products.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Product store base url, e.g. https://shop.example.com
    #[arg(long, global = true)]
    base_url: Option<String>,
    /// log_only or propagate
    #[arg(long, global = true)]
    failure_handling: Option<FailureHandling>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the product table.
    List,
    /// Create a product.
    Add {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        price: String,
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        quantity: String,
    },
    /// Edit fields of an existing product and save it.
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        price: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        quantity: Option<String>,
    },
    /// Delete a product by id.
    Delete { id: String },
    /// Interactive editor over stdin.
    Shell,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = load_settings(cli.config.as_deref())?;
    if let Some(base_url) = cli.base_url {
        settings.base_url = base_url;
    }
    if let Some(failure_handling) = cli.failure_handling {
        settings.failure_handling = failure_handling;
    }
    let base_url = normalize_base_url(&settings.base_url)?;

    let store = HttpProductStore::with_timeout(&base_url, settings.request_timeout())
        .context("failed to build product store client")?;
    let store_url = store.base_url().clone();
    let controller =
        ProductListController::with_failure_handling(Arc::new(store), settings.failure_handling);
    info!(
        base_url = %store_url,
        failure_handling = ?controller.failure_handling(),
        "using product store"
    );

    controller.load().await?;

    match cli.command {
        Command::List => {}
        Command::Add {
            name,
            description,
            price,
            quantity,
        } => {
            controller.edit_new_field(ProductField::Name, &name).await;
            controller
                .edit_new_field(ProductField::Description, &description)
                .await;
            controller.edit_new_field(ProductField::Price, &price).await;
            controller
                .edit_new_field(ProductField::Quantity, &quantity)
                .await;
            controller.create().await?;
        }
        Command::Update {
            id,
            name,
            description,
            price,
            quantity,
        } => {
            let id = ProductId::from(id);
            if !controller.select_for_edit_by_id(&id).await {
                bail!("no product with id {id}");
            }
            let edits = [
                (ProductField::Name, name),
                (ProductField::Description, description),
                (ProductField::Price, price),
                (ProductField::Quantity, quantity),
            ];
            for (field, value) in edits {
                if let Some(value) = value {
                    controller.edit_field(field, &value).await;
                }
            }
            controller.update().await?;
        }
        Command::Delete { id } => {
            controller.delete(&ProductId::from(id)).await?;
        }
        Command::Shell => {
            let stdin = BufReader::new(tokio::io::stdin());
            let mut stdout = tokio::io::stdout();
            return shell::run(&controller, stdin, &mut stdout).await;
        }
    }

    print!("{}", view::render_table(&controller.products().await));
    Ok(())
}
