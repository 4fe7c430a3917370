//! influxq CLI
//!
//! Command-line tool for the query client:
//! - List databases, measurements, retention policies
//! - Run ad-hoc queries or build SELECT statements
//! - Create/drop databases and retention policies
//!
//! Connection settings come from flags, then `INFLUXQ_*` environment
//! variables, then a TOML config file.

use clap::{Parser, Subcommand};
use influxq::{Client, Config, DataSource, RetentionPolicy, Statement, Table};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "influxq")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Query and administer a time-series database over HTTP")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Server host
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Server port
    #[arg(long, global = true)]
    pub port: Option<u16>,

    /// Use HTTPS
    #[arg(long, global = true)]
    pub ssl: bool,

    /// Database to select
    #[arg(long, global = true)]
    pub db: Option<String>,

    /// Username for basic auth
    #[arg(short, long, global = true)]
    pub username: Option<String>,

    /// Password for basic auth
    #[arg(short, long, global = true)]
    pub password: Option<String>,

    /// Connect timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Config file path (default: probe standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List databases
    Databases,

    /// List measurements of the selected database
    Measurements,

    /// List series of the selected database
    Series,

    /// List retention policies of a database
    Policies {
        /// Database name (default: the selected database)
        database: Option<String>,
    },

    /// Run a query and print the result table
    Query {
        /// Raw query text; omit to build a SELECT from the flags below
        text: Option<String>,
        /// Measurement to select from
        #[arg(short, long)]
        measurement: Option<String>,
        /// Column expression (default: *)
        #[arg(long)]
        columns: Option<String>,
        /// Row limit
        #[arg(short, long, default_value = "0")]
        limit: u64,
        /// Row offset
        #[arg(short, long, default_value = "0")]
        offset: u64,
    },

    /// Create a database
    CreateDatabase {
        name: String,
        /// Retention duration, e.g. 30d
        #[arg(long)]
        duration: Option<String>,
        /// Replication factor
        #[arg(long)]
        replication: Option<u32>,
        /// Shard group duration, e.g. 1h
        #[arg(long)]
        shard_duration: Option<String>,
        /// Retention policy name
        #[arg(long)]
        policy_name: Option<String>,
    },

    /// Drop a database
    DropDatabase { name: String },

    /// Create a retention policy
    CreatePolicy {
        /// Policy name
        name: String,
        /// Database to attach the policy to
        #[arg(long)]
        database: String,
        /// Retention duration, e.g. 30d
        #[arg(long)]
        duration: String,
        /// Replication factor
        #[arg(long, default_value = "1")]
        replication: u32,
        /// Shard group duration, e.g. 1h
        #[arg(long)]
        shard_duration: Option<String>,
        /// Make this the default policy
        #[arg(long)]
        default: bool,
    },

    /// Drop a retention policy
    DropPolicy {
        name: String,
        #[arg(long)]
        database: String,
    },

    /// Ping the server and print version and round-trip time
    Ping,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "influxq=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    // Flags override environment, which overrides the config file
    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(host) = &cli.host {
        config.connection.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.connection.port = port;
    }
    if cli.ssl {
        config.connection.ssl = true;
    }
    if let Some(db) = &cli.db {
        config.connection.database = db.clone();
    }
    if let Some(username) = &cli.username {
        config.connection.username = username.clone();
    }
    if let Some(password) = &cli.password {
        config.connection.password = password.clone();
    }
    if let Some(timeout) = cli.timeout {
        config.connection.timeout_secs = timeout;
    }

    let mut client = Client::connect(&config.connection).await?;

    match cli.command {
        Commands::Databases => {
            for name in client.show_databases().await? {
                println!("{}", name);
            }
        }

        Commands::Measurements => {
            for name in client.measurements().await? {
                println!("{}", name);
            }
        }

        Commands::Series => {
            let table = client.show_series().await?;
            print_table(&table);
        }

        Commands::Policies { database } => {
            let database = match database {
                Some(db) => db,
                None => client.database().to_string(),
            };
            if database.is_empty() {
                eprintln!("No database selected; pass a name or --db");
                std::process::exit(1);
            }
            let table = client.retention_policies(&database).await?;
            print_table(&table);
        }

        Commands::Query {
            text,
            measurement,
            columns,
            limit,
            offset,
        } => {
            let table = match (text, measurement) {
                (Some(text), _) => client.query(&text).await?,
                (None, Some(measurement)) => {
                    let mut stmt =
                        Statement::select(vec![DataSource::measurement(measurement)])?
                            .with_limit(limit)
                            .with_offset(offset);
                    if let Some(columns) = columns {
                        stmt = stmt.with_columns(columns);
                    }
                    client.execute(&stmt).await?
                }
                (None, None) => {
                    eprintln!("Pass query text or --measurement");
                    std::process::exit(1);
                }
            };
            print_table(&table);
        }

        Commands::CreateDatabase {
            name,
            duration,
            replication,
            shard_duration,
            policy_name,
        } => {
            let policy = RetentionPolicy {
                name: policy_name.unwrap_or_default(),
                duration: duration.unwrap_or_default(),
                replication,
                shard_group_duration: shard_duration.unwrap_or_default(),
            };
            let policy = if policy == RetentionPolicy::default() {
                None
            } else {
                Some(policy)
            };
            client.create_database(&name, policy.as_ref()).await?;
            println!("Created database {}", name);
        }

        Commands::DropDatabase { name } => {
            client.drop_database(&name).await?;
            println!("Dropped database {}", name);
        }

        Commands::CreatePolicy {
            name,
            database,
            duration,
            replication,
            shard_duration,
            default,
        } => {
            let policy = RetentionPolicy {
                name: name.clone(),
                duration,
                replication: Some(replication),
                shard_group_duration: shard_duration.unwrap_or_default(),
            };
            client
                .create_retention_policy(&database, &policy, default)
                .await?;
            println!("Created retention policy {} on {}", name, database);
        }

        Commands::DropPolicy { name, database } => {
            client.drop_retention_policy(&database, &name).await?;
            println!("Dropped retention policy {} from {}", name, database);
        }

        Commands::Ping => {
            let (round_trip, version) = client.ping().await?;
            println!("version={} ping={:?}", version, round_trip);
        }
    }

    client.close();
    Ok(())
}

/// Render a table as ASCII columns on stdout
fn print_table(table: &Table) {
    let mut widths: Vec<usize> = table.columns.iter().map(String::len).collect();
    let rendered: Vec<Vec<String>> = table
        .values
        .iter()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect();
    for row in &rendered {
        for (i, cell) in row.iter().enumerate() {
            if cell.len() > widths[i] {
                widths[i] = cell.len();
            }
        }
    }

    if !table.name.is_empty() {
        println!("{}", table.name);
    }
    if !table.tags.is_empty() {
        let mut tags: Vec<String> = table
            .tags
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        tags.sort();
        println!("tags: {}", tags.join(", "));
    }

    let header: Vec<String> = table
        .columns
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{:<width$}", c, width = widths[i]))
        .collect();
    println!("{}", header.join(" | "));
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    println!("{}", rule.join("-+-"));
    for row in &rendered {
        let line: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, cell)| format!("{:<width$}", cell, width = widths[i]))
            .collect();
        println!("{}", line.join(" | "));
    }
    if table.partial {
        println!("(partial result, more data available)");
    }
}
