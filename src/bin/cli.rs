use std::process::ExitCode;

use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use marquee::cli::{activate_user, grant_permission, list_permissions, migrate};
use marquee::marquee_config::DatabaseConfig;
use marquee::marquee_db::init_db_pool;

#[derive(Parser)]
#[command(name = "marquee-cli")]
#[command(about = "Marquee CLI - Administrative tools for the Marquee API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Grant a permission code to a user
    GrantPermission {
        /// Email address of the user
        #[arg(short = 'e', long)]
        email: String,

        /// Permission code, e.g. movies:write
        #[arg(short = 'c', long)]
        code: String,
    },
    /// List the permission codes held by a user
    Permissions {
        /// Email address of the user
        #[arg(short = 'e', long)]
        email: String,
    },
    /// Activate a user account without an activation token
    Activate {
        /// Email address of the user
        #[arg(short = 'e', long)]
        email: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\n❌ {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = DatabaseConfig::from_env()?;
    config.max_open_conns = 2;
    let pool = init_db_pool(&config).await?;

    match cli.command {
        Commands::Migrate => {
            migrate(&pool).await?;
            println!("✅ Migrations applied");
        }
        Commands::GrantPermission { email, code } => {
            if grant_permission(&pool, &email, &code).await? {
                println!("✅ Granted {code} to {email}");
            } else {
                println!("ℹ️  {email} already has {code}");
            }
        }
        Commands::Permissions { email } => {
            let permissions = list_permissions(&pool, &email).await?;
            if permissions.is_empty() {
                println!("{email} has no permissions");
            }
            for code in permissions.iter() {
                println!("{code}");
            }
        }
        Commands::Activate { email } => {
            if activate_user(&pool, &email).await? {
                println!("✅ Activated {email}");
            } else {
                println!("ℹ️  {email} is already activated");
            }
        }
    }

    Ok(())
}
