use anyhow::Result;
use clap::{Parser, Subcommand};
use emb_status::{valid_statuses, EntityKind};

#[derive(Parser)]
#[command(name = "emb")]
#[command(about = "Embroidery shop operator CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Database commands
    Db {
        #[command(subcommand)]
        cmd: DbCmd,
    },

    /// Compute layered config hash
    ConfigHash {
        /// Paths in merge order: base -> overlays
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Print the code table for an entity kind (order, job, goods, payments, ...)
    Statuses {
        kind: String,
        /// Emit the table as a JSON array instead of tab-separated lines.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum DbCmd {
    Status,
    Migrate {
        /// Required to migrate while jobs are IN_PROGRESS.
        #[arg(long, default_value_t = false)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::Db { cmd } => {
            let pool = emb_db::connect_from_env().await?;
            match cmd {
                DbCmd::Status => {
                    let s = emb_db::status(&pool).await?;
                    println!("db_ok={} has_orders_table={}", s.ok, s.has_orders_table);
                }
                DbCmd::Migrate { yes } => {
                    let s = emb_db::status(&pool).await?;
                    if s.has_orders_table {
                        let n = emb_db::count_running_jobs(&pool).await?;
                        if n > 0 && !yes {
                            anyhow::bail!(
                                "REFUSING MIGRATE: {} job(s) IN_PROGRESS. Re-run with: `emb db migrate --yes`",
                                n
                            );
                        }
                    }

                    emb_db::migrate(&pool).await?;
                    tracing::info!("migrations applied");
                    println!("migrations_applied=true");
                }
            }
        }

        Commands::ConfigHash { paths } => {
            let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
            let loaded = emb_config::load_layered_yaml(&path_refs)?;
            println!("config_hash={}", loaded.config_hash);
            println!("{}", loaded.canonical_json);
            for key in loaded.unused_keys() {
                eprintln!("unused_key={key}");
            }
        }

        Commands::Statuses { kind, json } => {
            let kind = EntityKind::parse(&kind)
                .ok_or_else(|| anyhow::anyhow!("unknown entity kind: {kind:?}"))?;
            let entries = valid_statuses(kind);
            if json {
                println!("{}", serde_json::to_string(entries)?);
            } else {
                println!("kind={}", kind.as_str());
                for entry in entries {
                    println!("{}\t{}", entry.code, entry.label);
                }
            }
        }
    }

    Ok(())
}
