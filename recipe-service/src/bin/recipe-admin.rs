//! Management commands for the recipe service database.
//!
//! ```bash
//! recipe-admin migrate
//! recipe-admin create-superuser --email admin@example.com --password s3cret
//! recipe-admin promote --email cook@example.com --superuser
//! recipe-admin deactivate --email cook@example.com
//! ```
//!
//! Reads the same environment as the server (`DATABASE_URL`, `LOG_LEVEL`, ...).

use clap::{Parser, Subcommand};
use recipe_service::{
    config::RecipeConfig,
    db,
    services::{Database, TokenService, UserStore},
    utils::Password,
};
use service_core::{error::AppError, observability::init_tracing};

#[derive(Parser)]
#[command(name = "recipe-admin")]
#[command(author, version, about = "Recipe service management tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Create a user with staff and superuser rights
    CreateSuperuser {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,
    },
    /// Grant staff rights to an existing user; rights already held are kept
    Promote {
        #[arg(short, long)]
        email: String,

        /// Also grant superuser rights
        #[arg(long)]
        superuser: bool,
    },
    /// Disable a user's login and revoke their token
    Deactivate {
        #[arg(short, long)]
        email: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!(error = %e, "Command failed");
        eprintln!("recipe-admin: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let config = RecipeConfig::from_env()?;
    init_tracing("recipe-admin", &config.log_level, None)?;

    let pool = db::create_pool(&config.database).await?;
    db::run_migrations(&pool).await?;

    let database = Database::new(pool);
    let users = UserStore::new(database.clone());

    match cli.command {
        Commands::Migrate => {
            tracing::info!("Migrations are up to date");
        }
        Commands::CreateSuperuser { email, password } => {
            Password::new(password.as_str())
                .ensure_min_length()
                .map_err(AppError::BadRequest)?;
            let user = users.create_superuser(&email, &password).await?;
            println!("Created superuser {} (id {})", user.email, user.id);
        }
        Commands::Promote { email, superuser } => {
            let user = users.grant_admin_flags(&email, superuser).await?;
            println!(
                "{} is now staff{}",
                user.email,
                if user.is_superuser { " and superuser" } else { "" }
            );
        }
        Commands::Deactivate { email } => {
            let user = users.set_active(&email, false).await?;
            let revoked = TokenService::new(database).revoke_tokens(user.id).await?;
            println!("Deactivated {} ({} token(s) revoked)", user.email, revoked);
        }
    }

    Ok(())
}
