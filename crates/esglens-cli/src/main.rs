//! esglens process bootstrap and management CLI.
//!
//! `run` starts the cycle scheduler; everything else is one-shot store
//! management and querying. The store pool is constructed exactly once here
//! and passed by reference into every component.

mod query;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "esglens")]
#[command(about = "ESG news ingestion and analysis")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Start the cycle scheduler (never returns).
    Run,
    /// Execute one ingestion cycle and exit.
    Cycle,
    /// Seed tracked organizations from the watchlist file.
    Seed,
    /// Manage tracked organizations.
    Org {
        #[command(subcommand)]
        command: OrgCommands,
    },
    /// Manage organization synonyms.
    Synonym {
        #[command(subcommand)]
        command: SynonymCommands,
    },
    /// List the sustainability-topic catalog.
    Topics,
    /// Query analyzed news for one organization.
    News(query::NewsArgs),
}

#[derive(Debug, Subcommand)]
enum OrgCommands {
    /// Track a new organization.
    Add { name: String },
    /// Stop tracking an organization (cascades to synonyms and
    /// article associations).
    Remove { name: String },
    /// List tracked organizations and their synonyms.
    List,
}

#[derive(Debug, Subcommand)]
enum SynonymCommands {
    /// Add a synonym to a tracked organization.
    Add { organization: String, name: String },
    /// Remove a synonym from a tracked organization.
    Remove { organization: String, name: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = esglens_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = esglens_db::PoolConfig::from_app_config(&config);
    let pool = esglens_db::connect_pool(&config.database_url, pool_config).await?;
    esglens_db::run_migrations(&pool).await?;
    esglens_db::seed_topics(&pool).await?;

    match cli.command {
        Commands::Run => {
            esglens_pipeline::run_scheduler(&pool, &config).await;
        }
        Commands::Cycle => {
            let summary = esglens_pipeline::run_cycle(&pool, &config).await?;
            println!(
                "cycle complete: {} terms searched, {} articles fetched, \
                 {} ingested, {} reused, {} skipped",
                summary.terms,
                summary.fetched,
                summary.fanout.ingested,
                summary.fanout.reused,
                summary.fanout.skipped
            );
        }
        Commands::Seed => {
            let file = esglens_core::organizations::load_organizations(&config.organizations_path)?;
            let count = esglens_db::seed_organizations(&pool, &file.organizations).await?;
            println!("seeded {count} organizations from {}", config.organizations_path.display());
        }
        Commands::Org { command } => match command {
            OrgCommands::Add { name } => {
                let org = esglens_db::create_organization(&pool, &name).await?;
                println!("tracking organization '{}'", org.name);
            }
            OrgCommands::Remove { name } => {
                esglens_db::delete_organization(&pool, &name).await?;
                println!("removed organization '{name}'");
            }
            OrgCommands::List => {
                for org in esglens_db::list_organizations(&pool).await? {
                    let synonyms = esglens_db::list_synonyms_for(&pool, &org.name).await?;
                    if synonyms.is_empty() {
                        println!("{}", org.name);
                    } else {
                        let names: Vec<&str> =
                            synonyms.iter().map(|s| s.name.as_str()).collect();
                        println!("{} ({})", org.name, names.join(", "));
                    }
                }
            }
        },
        Commands::Synonym { command } => match command {
            SynonymCommands::Add { organization, name } => {
                let synonym = esglens_db::create_synonym(&pool, &organization, &name).await?;
                println!(
                    "added synonym '{}' to organization '{}'",
                    synonym.name, synonym.organization_name
                );
            }
            SynonymCommands::Remove { organization, name } => {
                esglens_db::delete_synonym(&pool, &organization, &name).await?;
                println!("removed synonym '{name}' from organization '{organization}'");
            }
        },
        Commands::Topics => {
            for topic in esglens_db::list_topics(&pool).await? {
                println!("{}", topic.name);
            }
        }
        Commands::News(args) => {
            query::run_news_query(&pool, &config, &args).await?;
        }
    }

    Ok(())
}

/// Default lower bound when no `--from` date is given: effectively "all time".
fn min_date() -> NaiveDate {
    NaiveDate::MIN
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn parses_org_add() {
        let cli = Cli::try_parse_from(["esglens", "org", "add", "Acme"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Org {
                command: OrgCommands::Add { ref name }
            } if name == "Acme"
        ));
    }

    #[test]
    fn parses_synonym_add() {
        let cli =
            Cli::try_parse_from(["esglens", "synonym", "add", "Acme", "Acme Corp"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Synonym {
                command: SynonymCommands::Add { ref organization, ref name }
            } if organization == "Acme" && name == "Acme Corp"
        ));
    }

    #[test]
    fn parses_news_query_with_filters() {
        let cli = Cli::try_parse_from([
            "esglens",
            "news",
            "Acme",
            "--topic",
            "Climate Risks",
            "--max-sentiment",
            "4.5",
            "--from",
            "2024-01-01",
            "--stats",
        ])
        .unwrap();
        let Commands::News(args) = cli.command else {
            panic!("expected news command");
        };
        assert_eq!(args.organization, "Acme");
        assert_eq!(args.topic.as_deref(), Some("Climate Risks"));
        assert!((args.max_sentiment - 4.5).abs() < f64::EPSILON);
        assert!(args.stats);
    }

    #[test]
    fn rejects_unknown_subcommands() {
        assert!(Cli::try_parse_from(["esglens", "frobnicate"]).is_err());
    }
}
