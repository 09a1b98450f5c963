//! CLI administration tool for device-registry.
//!
//! Provides database maintenance and device inspection without going through
//! the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Apply pending migrations
//! cargo run --bin admin -- migrate
//!
//! # Check database connection / show server info
//! cargo run --bin admin -- db check
//! cargo run --bin admin -- db info
//!
//! # Insert the sample device catalog
//! cargo run --bin admin -- seed --yes
//!
//! # List devices
//! cargo run --bin admin -- devices list --brand Apple --state in_use
//! ```
//!
//! # Environment Variables
//!
//! Same as the server: `DATABASE_URL` (or `DB_HOST`/`DB_USER`/...), `DB_SCHEMA`
//! and the pool settings.

use device_registry::application::services::DeviceService;
use device_registry::config::{self, Config, StorageBackend};
use device_registry::domain::entities::{DeviceFilter, DeviceState, NewDevice, PageRequest};
use device_registry::domain::repositories::DeviceRepository;
use device_registry::infrastructure::database;
use device_registry::infrastructure::persistence::PgDeviceRepository;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing device-registry.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },

    /// Insert the sample device catalog
    Seed {
        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Inspect devices
    Devices {
        #[command(subcommand)]
        action: DevicesAction,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

/// Device subcommands.
#[derive(Subcommand)]
enum DevicesAction {
    /// List devices, one page at a time
    List {
        /// Filter by brand (case-insensitive)
        #[arg(short, long)]
        brand: Option<String>,

        /// Filter by state: available, in_use or inactive
        #[arg(short, long)]
        state: Option<DeviceState>,

        /// Zero-based page index
        #[arg(short, long, default_value_t = 0)]
        page: u32,

        /// Page size
        #[arg(long, default_value_t = 20)]
        size: u32,
    },
}

/// Devices inserted by `seed`.
const SAMPLE_DEVICES: [(&str, &str, DeviceState); 6] = [
    ("iPhone 15 Pro", "Apple", DeviceState::Available),
    ("MacBook Air M3", "Apple", DeviceState::InUse),
    ("Galaxy S24", "Samsung", DeviceState::Available),
    ("Galaxy Tab S9", "Samsung", DeviceState::Inactive),
    ("Pixel 8", "Google", DeviceState::InUse),
    ("ThinkPad X1 Carbon", "Lenovo", DeviceState::Available),
];

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = config::load_from_env()?;
    if config.storage != StorageBackend::Postgres {
        anyhow::bail!("The admin tool requires STORAGE=postgres");
    }

    let pool = database::connect(&config)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::Migrate => handle_migrate(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool, &config).await?,
        Commands::Seed { yes } => handle_seed(&pool, yes).await?,
        Commands::Devices { action } => handle_devices_action(action, &pool).await?,
    }

    Ok(())
}

fn device_service(pool: &PgPool) -> DeviceService {
    let repository: Arc<dyn DeviceRepository> =
        Arc::new(PgDeviceRepository::new(Arc::new(pool.clone())));
    DeviceService::new(repository)
}

/// Applies pending migrations and reports what is in place.
async fn handle_migrate(pool: &PgPool) -> Result<()> {
    println!("{}", "Applying migrations...".bright_blue());

    database::run_migrations(pool).await?;

    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success")
        .fetch_one(pool)
        .await?;

    println!("{}", "Migrations up to date".green().bold());
    println!(
        "  Applied: {}",
        applied.to_string().bright_white().bold()
    );
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool, config: &Config) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;
            let schema: String = sqlx::query_scalar("SELECT current_schema()")
                .fetch_one(pool)
                .await?;
            let devices = device_service(pool)
                .list_devices(DeviceFilter::new(), PageRequest::new(0, 1))
                .await
                .map_err(|e| anyhow::anyhow!("Failed to count devices: {}", e))?
                .total_elements;

            println!("  PostgreSQL: {}", version.bright_white());
            println!(
                "  Database:   {}",
                config::mask_connection_string(config.database_url.as_deref().unwrap_or(""))
                    .bright_black()
            );
            println!("  Schema:     {}", schema.cyan());
            println!(
                "  Devices:    {}",
                devices.to_string().bright_green().bold()
            );
            println!();
        }
    }

    Ok(())
}

/// Inserts [`SAMPLE_DEVICES`] after confirmation (unless `--yes`).
async fn handle_seed(pool: &PgPool, skip_confirm: bool) -> Result<()> {
    println!("{}", "Seed sample devices".bright_blue().bold());
    println!();

    for (name, brand, state) in SAMPLE_DEVICES {
        println!("  {:<22} {:<10} {}", name.cyan(), brand, state_label(state));
    }
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt(format!("Insert {} devices?", SAMPLE_DEVICES.len()))
            .default(true)
            .interact()?;

        if !confirmed {
            println!("{}", "Cancelled".red());
            return Ok(());
        }
    }

    let service = device_service(pool);
    for (name, brand, state) in SAMPLE_DEVICES {
        service
            .create_device(NewDevice {
                name: name.to_string(),
                brand: brand.to_string(),
                state,
            })
            .await
            .map_err(|e| anyhow::anyhow!("Failed to insert '{}': {}", name, e))?;
    }

    println!();
    println!(
        "{}",
        format!("Inserted {} devices", SAMPLE_DEVICES.len())
            .green()
            .bold()
    );
    println!();

    Ok(())
}

/// Dispatches device inspection commands.
async fn handle_devices_action(action: DevicesAction, pool: &PgPool) -> Result<()> {
    match action {
        DevicesAction::List {
            brand,
            state,
            page,
            size,
        } => list_devices(pool, brand, state, page, size).await,
    }
}

/// Prints one page of devices.
///
/// # Output Format
///
/// ```text
/// Devices
///
///   ID    Name                     Brand           State       Created
///   ───────────────────────────────────────────────────────────────────────
///   1     iPhone 15 Pro            Apple           available   2024-01-15 10:30
///
///   Page 1 of 1 (1 devices)
/// ```
async fn list_devices(
    pool: &PgPool,
    brand: Option<String>,
    state: Option<DeviceState>,
    page: u32,
    size: u32,
) -> Result<()> {
    if size == 0 {
        anyhow::bail!("--size must be at least 1");
    }

    println!("{}", "Devices".bright_blue().bold());
    println!();

    let filter = DeviceFilter::new()
        .with_brand(brand.as_deref())
        .with_state(state);
    let result = device_service(pool)
        .list_devices(filter, PageRequest::new(page, size))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list devices: {}", e))?;

    if result.items.is_empty() {
        println!("{}", "  No devices found".yellow());
        println!();
        return Ok(());
    }

    println!(
        "  {:<5} {:<24} {:<15} {:<11} {}",
        "ID".bright_white().bold(),
        "Name".bright_white().bold(),
        "Brand".bright_white().bold(),
        "State".bright_white().bold(),
        "Created".bright_white().bold()
    );
    println!("  {}", "─".repeat(75).bright_black());

    for device in &result.items {
        println!(
            "  {:<5} {:<24} {:<15} {:<11} {}",
            device.id.to_string().bright_black(),
            device.name.cyan(),
            device.brand,
            state_label(device.state),
            device
                .created_on
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black()
        );
    }

    println!();
    println!(
        "  Page {} of {} ({} devices)",
        (result.number + 1).to_string().bright_white().bold(),
        result.total_pages().to_string().bright_white().bold(),
        result.total_elements
    );
    println!();

    Ok(())
}

fn state_label(state: DeviceState) -> ColoredString {
    match state {
        DeviceState::Available => state.as_api_str().green(),
        DeviceState::InUse => state.as_api_str().yellow(),
        DeviceState::Inactive => state.as_api_str().bright_black(),
    }
}
