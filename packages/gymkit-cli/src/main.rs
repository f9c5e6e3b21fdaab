//! `gymkit` — command-line client for the GymKit membership service.
//!
//! Stands in for the mobile presentation layer: every subcommand goes
//! through the auth controller and gateway client the same way the app
//! screens would.

mod commands;

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use gymkit_api::GatewayClient;
use gymkit_auth::AuthController;
use gymkit_storage::FileStore;

#[derive(Parser)]
#[command(name = "gymkit", about = "GymKit membership client", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in with a phone number and one-time code
    Login,
    /// Register a new membership
    Register,
    /// Show the signed-in member profile
    Profile,
    /// Edit profile fields
    EditProfile,
    /// Show the member dashboard
    Dashboard,
    /// List membership plans
    Plans,
    /// Show payment history
    Payments,
    /// Show the assigned trainer
    Trainer,
    /// Check in at a gym
    Checkin {
        /// Gym code displayed at the front desk
        #[arg(long)]
        code: Option<String>,
    },
    /// Check out of the current visit
    Checkout,
    /// Validate a gym code (or a scanned QR payload with --qr)
    Validate {
        #[arg(long)]
        qr: bool,
        value: String,
    },
    /// Clear the local session
    Logout,
    /// Show who is signed in
    Whoami,
}

/// Shared collaborators, injected into every command.
pub struct App {
    pub gateway: Arc<GatewayClient>,
    pub auth: AuthController,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let gateway = Arc::new(GatewayClient::from_env()?);
    let data_dir = dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("gymkit");
    let store = Arc::new(FileStore::new(data_dir));

    let auth = AuthController::new(gateway.clone(), store);
    // The one async gate before anything may act on identity state.
    auth.load_persisted().await;

    let app = App { gateway, auth };

    match cli.command {
        Commands::Login => commands::login(&app).await,
        Commands::Register => commands::register(&app).await,
        Commands::Profile => commands::profile(&app).await,
        Commands::EditProfile => commands::edit_profile(&app).await,
        Commands::Dashboard => commands::dashboard(&app).await,
        Commands::Plans => commands::plans(&app).await,
        Commands::Payments => commands::payments(&app).await,
        Commands::Trainer => commands::trainer(&app).await,
        Commands::Checkin { code } => commands::check_in(&app, code.as_deref()).await,
        Commands::Checkout => commands::check_out(&app).await,
        Commands::Validate { qr, value } => commands::validate(&app, qr, &value).await,
        Commands::Logout => commands::logout(&app).await,
        Commands::Whoami => commands::whoami(&app).await,
    }
}
