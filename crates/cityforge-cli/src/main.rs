mod build_cmd;
mod config;
mod serve_cmd;
mod status_cmd;

use clap::{Parser, Subcommand};

use cityforge_db::pool;

use config::CityforgeConfig;

#[derive(Parser)]
#[command(name = "cityforge", about = "Phased city-build orchestrator driven by a generative backend")]
struct Cli {
    /// Database URL (overrides CITYFORGE_DATABASE_URL env var)
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a cityforge config file (no database required)
    Init {
        /// PostgreSQL connection URL
        #[arg(long, default_value = "postgresql://localhost:5432/cityforge")]
        db_url: String,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Initialize the cityforge database (create + migrate)
    DbInit,
    /// Run the HTTP API server
    Serve {
        /// Bind address
        #[arg(long, default_value = "127.0.0.1")]
        bind: String,
        /// Port
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
    /// Create a project and run its build sequence inline
    Build {
        /// Project name
        name: String,
        /// Free-text request describing the city to build
        prompt: String,
        /// Owner user id (0 = anonymous)
        #[arg(long, default_value_t = 0)]
        owner: i64,
        /// Emit the full paced inter-role narration
        #[arg(long)]
        narrate: bool,
    },
    /// Show a project's status and progress
    Status {
        /// Project id
        project_id: i64,
    },
}

/// Execute the `cityforge init` command: write config file.
fn cmd_init(db_url: &str, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let cfg = config::ConfigFile {
        database: config::DatabaseSection {
            url: db_url.to_string(),
        },
        llm: Default::default(),
    };

    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    println!("  database.url = {db_url}");
    println!("  llm.base_url = {}", cfg.llm.base_url);
    println!();
    println!("Set CITYFORGE_LLM_API_KEY (or llm.api_key in the config file), then");
    println!("run `cityforge db-init` to create and migrate the database.");

    Ok(())
}

/// Execute the `cityforge db-init` command: create database and run
/// migrations.
async fn cmd_db_init(cli_db_url: Option<&str>) -> anyhow::Result<()> {
    let resolved = CityforgeConfig::resolve(cli_db_url)?;

    println!("Initializing cityforge database...");

    // 1. Create the database if it does not exist.
    pool::ensure_database_exists(&resolved.db_config).await?;

    // 2. Connect to the target database.
    let db_pool = pool::create_pool(&resolved.db_config).await?;

    // 3. Run migrations.
    pool::run_migrations(&db_pool).await?;

    // 4. Print success with table counts.
    let counts = pool::table_counts(&db_pool).await?;
    println!("Database ready. Tables:");
    for (table, count) in &counts {
        println!("  {table}: {count} rows");
    }

    // 5. Clean shutdown.
    db_pool.close().await;

    println!("cityforge db-init complete.");
    Ok(())
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
        Commands::Init { db_url, force } => {
            cmd_init(&db_url, force)?;
        }
        Commands::DbInit => {
            cmd_db_init(cli.database_url.as_deref()).await?;
        }
        Commands::Serve { bind, port } => {
            let resolved = CityforgeConfig::resolve(cli.database_url.as_deref())?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let result = serve_cmd::run_serve(db_pool, &resolved.llm_config, &bind, port).await;
            result?;
        }
        Commands::Build {
            name,
            prompt,
            owner,
            narrate,
        } => {
            let resolved = CityforgeConfig::resolve(cli.database_url.as_deref())?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let result = build_cmd::run_build(
                db_pool.clone(),
                &resolved.llm_config,
                &name,
                &prompt,
                owner,
                narrate,
            )
            .await;
            db_pool.close().await;
            result?;
        }
        Commands::Status { project_id } => {
            let resolved = CityforgeConfig::resolve(cli.database_url.as_deref())?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let result = status_cmd::run_status(&db_pool, project_id).await;
            db_pool.close().await;
            result?;
        }
    }

    Ok(())
}
