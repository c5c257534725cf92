use std::path::PathBuf;

use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;

const COLLECTION: &str = "/v1/resources/objectschemas";

#[derive(Parser)]
#[command(name = "objectschema-cli")]
#[command(about = "Management CLI for the ObjectSchema registry", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Sent as the Authorization header when present
    #[arg(short, long)]
    auth: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List object schemas
    List {
        #[arg(long)]
        limit: Option<u64>,
        #[arg(long)]
        offset: Option<u64>,
        /// e.g. `namespace,version|desc`
        #[arg(long)]
        sort: Option<String>,
        /// Comma-separated field list
        #[arg(long)]
        fields: Option<String>,
        #[arg(long)]
        raw: bool,
    },
    /// Fetch one object schema
    Get { id: String },
    /// Create an object schema from a JSON file
    Create { file: PathBuf },
    /// Replace an object schema at a known version
    Replace {
        id: String,
        version: u64,
        file: PathBuf,
    },
    /// Delete an object schema
    Delete { id: String },
    /// Count stored object schemas
    Count,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = format!("{}{}", cli.url.trim_end_matches('/'), COLLECTION);

    let mut headers = HeaderMap::new();
    if let Some(auth) = &cli.auth {
        headers.insert(AUTHORIZATION, HeaderValue::from_str(auth)?);
    }

    let request = match cli.command {
        Commands::List {
            limit,
            offset,
            sort,
            fields,
            raw,
        } => {
            let mut query: Vec<(&str, String)> = Vec::new();
            if let Some(limit) = limit {
                query.push(("limit", limit.to_string()));
            }
            if let Some(offset) = offset {
                query.push(("offset", offset.to_string()));
            }
            if let Some(sort) = sort {
                query.push(("sort", sort));
            }
            if let Some(fields) = fields {
                query.push(("dataFields", fields));
            }
            if raw {
                query.push(("raw", "true".to_string()));
            }
            client.get(&base).query(&query)
        }
        Commands::Get { id } => client.get(format!("{}/{}", base, id)),
        Commands::Create { file } => client.post(&base).json(&read_json(&file)?),
        Commands::Replace { id, version, file } => client
            .put(format!("{}/{}/{}", base, id, version))
            .json(&read_json(&file)?),
        Commands::Delete { id } => client.delete(format!("{}/{}", base, id)),
        Commands::Count => client.get(format!("{}/count", base)),
    };

    let res = request.headers(headers).send().await?;
    if !print_response(res).await? {
        std::process::exit(1);
    }
    Ok(())
}

fn read_json(path: &PathBuf) -> Result<Value, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Print the envelope; returns whether the status was a success.
async fn print_response(res: reqwest::Response) -> Result<bool, Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    if !status.is_success() {
        eprintln!("Error: registry returned status {}", status);
    }
    Ok(status.is_success())
}
