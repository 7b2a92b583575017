use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use migration::{Migrator, MigratorTrait};
use service::provisioning::{DisabledNotifier, OfficeAdminProvisioner};
use service::requests::RequestWorkflow;
use service::Principal;
use tracing::{error, info};
use uuid::Uuid;

/// Operator commands for the services directory database.
#[derive(Parser, Debug)]
#[command(name = "directory", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply or roll back schema migrations
    Migrate {
        #[command(subcommand)]
        action: MigrateAction,
    },
    /// Print catalog and request statistics as JSON
    Stats,
    /// Create or reset the admin account of an office; the password is printed
    /// because no delivery channel is wired into this binary
    ProvisionAdmin {
        #[arg(long)]
        office_id: Uuid,
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
    },
}

#[derive(Subcommand, Debug)]
enum MigrateAction {
    Up,
    Down {
        #[arg(long, default_value_t = 1)]
        steps: u32,
    },
    Status,
}

fn main() -> ExitCode {
    dotenv().ok();
    let cli = Cli::parse();
    let cfg = match configs::AppConfig::load_and_validate() {
        Ok(cfg) => cfg,
        Err(e) => {
            common::utils::logging::init_logging_default();
            error!(event = "config_invalid", error = %e, "failed to load configuration");
            return ExitCode::FAILURE;
        }
    };
    common::utils::logging::init_logging(cfg.logging.json);

    std::panic::set_hook(Box::new(|info| {
        error!(event = "panic", message = %info, "unhandled panic occurred");
    }));

    let rt = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return ExitCode::FAILURE;
        }
    };
    match rt.block_on(run(cli.command, cfg)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(event = "command_failed", error = %e, "command failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command, cfg: configs::AppConfig) -> anyhow::Result<()> {
    let db = models::db::connect_with_config(&models::db::DatabaseConfig::from(&cfg.database)).await?;
    match command {
        Command::Migrate { action: MigrateAction::Up } => {
            Migrator::up(&db, None).await?;
            info!(event = "migrated_up", "all pending migrations applied");
        }
        Command::Migrate { action: MigrateAction::Down { steps } } => {
            Migrator::down(&db, Some(steps)).await?;
            info!(event = "migrated_down", steps, "migrations rolled back");
        }
        Command::Migrate { action: MigrateAction::Status } => {
            let applied = Migrator::get_applied_migrations(&db).await?;
            let pending = Migrator::get_pending_migrations(&db).await?;
            let status = serde_json::json!({
                "applied": applied.iter().map(|m| m.name().to_string()).collect::<Vec<_>>(),
                "pending": pending.iter().map(|m| m.name().to_string()).collect::<Vec<_>>(),
            });
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        Command::Stats => {
            let catalog = service::stats::catalog_stats(&db).await?;
            let requests = RequestWorkflow::new(db.clone(), cfg.catalog.clone()).stats().await?;
            let out = serde_json::json!({ "catalog": catalog, "requests": requests });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Command::ProvisionAdmin { office_id, email, name } => {
            let provisioner = OfficeAdminProvisioner::new(db.clone(), Arc::new(DisabledNotifier), cfg.catalog.clone());
            let operator = Principal::admin(Uuid::nil());
            let outcome = provisioner.provision_office_admin(&operator, office_id, &email, &name).await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
    }
    Ok(())
}
