use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{error, info};

use rankgate::auth::{Authenticator, HashingEngine, Identity, IdentityAugmentor};
use rankgate::{Config, Database};

#[derive(Parser)]
#[command(author, version, about = "Credential verification and rank-based roles", long_about = None)]
struct Cli {
    /// Path to the configuration file.
    #[arg(long, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Hash a password with a fresh salt and print a seeding statement")]
    Generate {
        #[arg(required = true)]
        password: String,
        /// Username used in the printed SQL statement.
        #[arg(long, default_value = "alice")]
        username: String,
    },
    #[command(about = "Check a username and password against the database")]
    Login {
        #[arg(required = true)]
        username: String,
        #[arg(required = true)]
        password: String,
    },
    #[command(about = "Print the roles an account's rank grants, as JSON")]
    Roles {
        #[arg(required = true)]
        username: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Load configuration
    let config = match Config::load_with_env(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {}: {e}", cli.config);
            eprintln!("Using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };

    // Initialize logging
    if let Err(e) = rankgate::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        rankgate::logging::init_console_only(&config.logging.level);
    }

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {e}");
        return ExitCode::FAILURE;
    }

    let engine = match HashingEngine::from_config(&config.hashing) {
        Ok(engine) => engine,
        Err(e) => {
            error!("Invalid hashing parameters: {e}");
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Command::Generate { password, username } => generate(&engine, &username, &password),
        Command::Login { username, password } => {
            let Some(db) = open_database(&config).await else {
                return ExitCode::FAILURE;
            };
            let authenticator = Authenticator::new(db, engine);
            let verdict = authenticator.authenticate(&username, &password).await;
            println!("{verdict}");
            if verdict.is_authenticated() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Command::Roles { username } => {
            let Some(db) = open_database(&config).await else {
                return ExitCode::FAILURE;
            };
            let augmentor = IdentityAugmentor::new(db);
            let identity = augmentor.augment(Identity::authenticated(username)).await;
            match serde_json::to_string(identity.roles()) {
                Ok(json) => {
                    println!("{json}");
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    error!("Failed to serialize roles: {e}");
                    ExitCode::FAILURE
                }
            }
        }
    }
}

fn generate(engine: &HashingEngine, username: &str, password: &str) -> ExitCode {
    let salt = engine.generate_salt();
    let hash = match engine.hash_password(password, &salt) {
        Ok(hash) => hash,
        Err(e) => {
            error!("Failed to hash password: {e}");
            return ExitCode::FAILURE;
        }
    };

    println!("salt: {salt}");
    println!("hash: {hash}");
    println!();
    println!(
        "INSERT INTO users (username, password_hash, salt, activated) VALUES ('{}', '{hash}', '{salt}', 1);",
        username.replace('\'', "''")
    );
    ExitCode::SUCCESS
}

async fn open_database(config: &Config) -> Option<Database> {
    match Database::open(&config.database.path).await {
        Ok(db) => {
            info!("Database ready at {}", config.database.path);
            Some(db)
        }
        Err(e) => {
            error!("Failed to open database {}: {e}", config.database.path);
            None
        }
    }
}
