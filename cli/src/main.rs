//! neo4u CLI: run raw Cypher against a Neo4j server over HTTP

use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table};
use neo4u::{logging, Configuration, Neo4u, PropertyMap, PropertyValue, ResultSet};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "neo4u", version, about = "Neo4u command-line client")]
struct Cli {
    /// YAML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Server host
    #[arg(long, global = true, env = "NEO4U_HOST")]
    host: Option<String>,

    /// Server HTTP port
    #[arg(long, global = true, env = "NEO4U_PORT")]
    port: Option<u16>,

    /// Basic auth user
    #[arg(long, global = true, env = "NEO4U_USER")]
    user: Option<String>,

    /// Basic auth password
    #[arg(long, global = true, env = "NEO4U_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: OutputFormat,

    /// Log level written to stderr/stdout
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, clap::ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a Cypher statement
    Query {
        /// The Cypher statement
        cypher: String,

        /// Statement parameter as key=value; values are parsed as JSON when possible
        #[arg(long = "param", value_parser = parse_param)]
        params: Vec<(String, PropertyValue)>,
    },
    /// Check that the server answers `RETURN 1`
    Ping,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_with(&cli.log_level);

    let neo4u = match connect(&cli) {
        Ok(neo4u) => neo4u,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let result = match &cli.command {
        Commands::Query { cypher, params } => run_query(&neo4u, cypher, params, &cli.format).await,
        Commands::Ping => run_ping(&neo4u).await,
    };
    neo4u.close().await;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Configuration precedence: file, then `NEO4U_*` variables, then flags
fn connect(cli: &Cli) -> Result<Neo4u, Box<dyn std::error::Error>> {
    let config = match &cli.config {
        Some(path) => Configuration::from_file(path)?,
        None => Configuration::default(),
    };
    let mut config = config.apply_env()?;

    if let Some(host) = &cli.host {
        config.neo4j.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.neo4j.port = port;
    }
    if let Some(user) = &cli.user {
        config.neo4j.user = user.clone();
    }
    if let Some(password) = &cli.password {
        config.neo4j.password = password.clone();
    }

    Ok(Neo4u::new(config)?)
}

fn parse_param(raw: &str) -> Result<(String, PropertyValue), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))?;
    if key.is_empty() {
        return Err(format!("missing parameter name in '{}'", raw));
    }

    let value = match serde_json::from_str::<serde_json::Value>(value) {
        Ok(json) => PropertyValue::from_json(&json),
        Err(_) => PropertyValue::String(value.to_string()),
    };
    Ok((key.to_string(), value))
}

async fn run_query(
    neo4u: &Neo4u,
    cypher: &str,
    params: &[(String, PropertyValue)],
    format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let parameters: Option<PropertyMap> = if params.is_empty() {
        None
    } else {
        Some(params.iter().cloned().collect())
    };

    let result = neo4u
        .run(cypher, parameters)
        .await
        .ok_or("query failed; see the log for details")?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&to_json(&result))?);
        }
        OutputFormat::Table => {
            if result.columns.is_empty() {
                println!("(no results)");
                return Ok(());
            }

            let mut table = Table::new();
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(&result.columns);

            for record in &result.records {
                let cells: Vec<String> = result
                    .columns
                    .iter()
                    .map(|column| match record.get(column) {
                        Some(value) => format_table_value(&value.to_json()),
                        None => String::new(),
                    })
                    .collect();
                table.add_row(cells);
            }

            println!("{}", table);
            println!("{} row(s)", result.len());
        }
    }

    Ok(())
}

async fn run_ping(neo4u: &Neo4u) -> Result<(), Box<dyn std::error::Error>> {
    let uri = neo4u.config().neo4j.uri();
    match neo4u.run("RETURN 1", None).await {
        Some(_) => {
            println!("PONG ({})", uri);
            Ok(())
        }
        None => Err(format!("no answer from {}", uri).into()),
    }
}

/// `{"columns": [..], "records": [{column: value}, ..]}`
fn to_json(result: &ResultSet) -> serde_json::Value {
    let records: Vec<serde_json::Value> = result
        .records
        .iter()
        .map(|record| {
            serde_json::Value::Object(
                record
                    .keys()
                    .filter_map(|key| {
                        record.get(key).map(|value| (key.to_string(), value.to_json()))
                    })
                    .collect(),
            )
        })
        .collect();
    serde_json::json!({ "columns": result.columns, "records": records })
}

fn format_table_value(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::Null => "null".to_string(),
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}
