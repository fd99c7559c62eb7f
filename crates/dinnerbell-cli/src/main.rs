mod config;
mod household_cmds;
mod input;
mod order_cmds;
mod plan_cmds;
mod services;

use clap::{Parser, Subcommand};
use sqlx::PgPool;

use dinnerbell_db::config::DbConfig;
use dinnerbell_db::pool;

use config::DinnerbellConfig;

#[derive(Parser)]
#[command(name = "dinnerbell", about = "Weekly dinner planner: propose, approve, sync and order")]
struct Cli {
    /// Database URL (overrides DINNERBELL_DATABASE_URL env var)
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a dinnerbell config file (no database required)
    Init {
        /// PostgreSQL connection URL
        #[arg(long, default_value = DbConfig::DEFAULT_URL)]
        db_url: String,
        /// Mealie server URL
        #[arg(long)]
        mealie_url: Option<String>,
        /// Mealie API token
        #[arg(long)]
        mealie_token: Option<String>,
        /// Anthropic API key
        #[arg(long)]
        anthropic_api_key: Option<String>,
        /// Instacart Connect access token
        #[arg(long)]
        instacart_token: Option<String>,
        /// Instacart retailer ID
        #[arg(long)]
        retailer_id: Option<String>,
        /// Instacart store location ID
        #[arg(long)]
        store_id: Option<String>,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Initialize the dinnerbell database (requires config file or env vars)
    DbInit,
    #[command(flatten)]
    Planner(PlannerCommands),
}

/// Commands that open the database and act through the planner.
#[derive(Subcommand)]
pub enum PlannerCommands {
    /// Household preferences
    Preferences {
        #[command(subcommand)]
        command: PreferenceCommands,
    },
    /// Feedback on past plans
    Feedback {
        #[command(subcommand)]
        command: FeedbackCommands,
    },
    /// Meal plan lifecycle
    Plan {
        #[command(subcommand)]
        command: PlanCommands,
    },
    /// Grocery orders
    Order {
        #[command(subcommand)]
        command: OrderCommands,
    },
}

#[derive(Subcommand)]
pub enum PreferenceCommands {
    /// Replace preferences from a JSON or TOML file
    Set {
        /// Path to the preferences file
        file: String,
    },
    /// Show saved preferences
    Show,
}

#[derive(Subcommand)]
pub enum FeedbackCommands {
    /// Record feedback
    Add {
        /// Plan the feedback is about
        #[arg(long = "plan")]
        plan_id: Option<String>,
        /// A meal the household liked (repeatable)
        #[arg(long)]
        liked: Vec<String>,
        /// A meal the household disliked (repeatable)
        #[arg(long)]
        disliked: Vec<String>,
        /// Free-form suggestions
        #[arg(long)]
        suggestions: Option<String>,
    },
    /// List all feedback, oldest first
    List,
}

#[derive(Subcommand)]
pub enum PlanCommands {
    /// Draft a plan for next week
    Generate,
    /// Show the most recent pending or approved plan
    Current,
    /// List all plans, newest first
    List,
    /// Show one plan
    Show {
        /// Plan ID
        plan_id: String,
    },
    /// Approve a plan and sync it to the household
    Approve {
        /// Plan ID
        plan_id: String,
        /// JSON or TOML file with replacement meals
        #[arg(long)]
        meals: Option<String>,
    },
    /// Re-run the household sync for an approved plan
    Sync {
        /// Plan ID
        plan_id: String,
    },
}

#[derive(Subcommand)]
pub enum OrderCommands {
    /// Order an approved plan's shopping list for pickup
    Place {
        /// Plan ID
        plan_id: String,
        /// Pickup time (RFC 3339, e.g. 2026-10-19T17:30:00-04:00)
        #[arg(long)]
        pickup: String,
    },
    /// List all orders
    List,
    /// Show pickup availability at the configured store
    Availability,
}

/// Show only the first few characters of a credential.
fn mask(secret: &str) -> String {
    let head: String = secret.chars().take(4).collect();
    format!("{head}...")
}

/// Execute the `dinnerbell init` command: write config file.
fn cmd_init(cfg: config::ConfigFile, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    println!("  database.url = {}", cfg.database.url);
    if let Some(url) = &cfg.mealie.url {
        println!("  mealie.url = {url}");
    }
    if let Some(token) = &cfg.mealie.token {
        println!("  mealie.token = {}", mask(token));
    }
    if let Some(key) = &cfg.anthropic.api_key {
        println!("  anthropic.api_key = {}", mask(key));
    }
    if let Some(token) = &cfg.instacart.access_token {
        println!("  instacart.access_token = {}", mask(token));
    }
    println!();
    println!("Next: run `dinnerbell db-init` to create and migrate the database.");

    Ok(())
}

/// Execute the `dinnerbell db-init` command: create database and run migrations.
async fn cmd_db_init(cli_db_url: Option<&str>) -> anyhow::Result<()> {
    let resolved = DinnerbellConfig::resolve(cli_db_url)?;

    println!("Initializing dinnerbell database...");

    pool::ensure_database_exists(&resolved.db_config).await?;
    let db_pool = pool::create_pool(&resolved.db_config).await?;
    pool::run_migrations(&db_pool).await?;

    let counts = pool::table_counts(&db_pool).await?;
    println!("Database ready. Tables:");
    for (table, count) in &counts {
        println!("  {table}: {count} rows");
    }

    db_pool.close().await;

    println!("dinnerbell db-init complete.");
    Ok(())
}

/// Open the planner over the pool and run one of its commands.
async fn run_planner_command(
    command: PlannerCommands,
    resolved: &DinnerbellConfig,
    db_pool: PgPool,
) -> anyhow::Result<()> {
    let planner = services::build_planner(resolved, db_pool)?;
    match command {
        PlannerCommands::Preferences { command } => {
            household_cmds::run_preference_command(command, &planner).await
        }
        PlannerCommands::Feedback { command } => {
            household_cmds::run_feedback_command(command, &planner).await
        }
        PlannerCommands::Plan { command } => plan_cmds::run_plan_command(command, &planner).await,
        PlannerCommands::Order { command } => {
            order_cmds::run_order_command(command, &planner).await
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init {
            db_url,
            mealie_url,
            mealie_token,
            anthropic_api_key,
            instacart_token,
            retailer_id,
            store_id,
            force,
        } => {
            let cfg = config::ConfigFile {
                database: config::DatabaseSection { url: db_url },
                mealie: config::MealieSection {
                    url: mealie_url,
                    token: mealie_token,
                },
                anthropic: config::AnthropicSection {
                    api_key: anthropic_api_key,
                    ..Default::default()
                },
                instacart: config::InstacartSection {
                    access_token: instacart_token,
                    retailer_id,
                    store_id,
                    base_url: None,
                },
            };
            cmd_init(cfg, force)?;
        }
        Commands::DbInit => {
            cmd_db_init(cli.database_url.as_deref()).await?;
        }
        Commands::Planner(command) => {
            let resolved = DinnerbellConfig::resolve(cli.database_url.as_deref())?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let result = run_planner_command(command, &resolved, db_pool.clone()).await;
            db_pool.close().await;
            result?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod test_util {
    use std::sync::{Mutex, MutexGuard};

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    /// Serialize tests that mutate process environment variables.
    pub fn lock_env() -> MutexGuard<'static, ()> {
        ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn approve_takes_an_optional_meals_file() {
        let cli = Cli::try_parse_from([
            "dinnerbell",
            "plan",
            "approve",
            "0d6f0a5e-8d59-4d5e-9a59-2a1f6f0b8c11",
            "--meals",
            "meals.toml",
        ])
        .unwrap();
        match cli.command {
            Commands::Planner(PlannerCommands::Plan {
                command: PlanCommands::Approve { plan_id, meals },
            }) => {
                assert_eq!(plan_id, "0d6f0a5e-8d59-4d5e-9a59-2a1f6f0b8c11");
                assert_eq!(meals.as_deref(), Some("meals.toml"));
            }
            _ => panic!("expected plan approve"),
        }
    }

    #[test]
    fn feedback_flags_repeat() {
        let cli = Cli::try_parse_from([
            "dinnerbell",
            "feedback",
            "add",
            "--liked",
            "Chili",
            "--liked",
            "Tacos",
            "--disliked",
            "Liver",
        ])
        .unwrap();
        match cli.command {
            Commands::Planner(PlannerCommands::Feedback {
                command: FeedbackCommands::Add {
                    liked, disliked, plan_id, ..
                },
            }) => {
                assert_eq!(liked, vec!["Chili", "Tacos"]);
                assert_eq!(disliked, vec!["Liver"]);
                assert!(plan_id.is_none());
            }
            _ => panic!("expected feedback add"),
        }
    }

    #[test]
    fn setup_commands_stay_outside_the_planner() {
        let cli = Cli::try_parse_from(["dinnerbell", "db-init"]).unwrap();
        assert!(matches!(cli.command, Commands::DbInit));

        let cli = Cli::try_parse_from(["dinnerbell", "order", "list"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Planner(PlannerCommands::Order {
                command: OrderCommands::List
            })
        ));
    }

    #[test]
    fn order_place_requires_pickup() {
        assert!(Cli::try_parse_from(["dinnerbell", "order", "place", "some-id"]).is_err());
    }

    #[test]
    fn global_database_url_after_subcommand() {
        let cli = Cli::try_parse_from([
            "dinnerbell",
            "plan",
            "list",
            "--database-url",
            "postgresql://h/db",
        ])
        .unwrap();
        assert_eq!(cli.database_url.as_deref(), Some("postgresql://h/db"));
    }

    #[test]
    fn mask_keeps_four_characters() {
        assert_eq!(mask("sk-ant-secret"), "sk-a...");
        assert_eq!(mask("ab"), "ab...");
    }
}
