use std::sync::Arc;

use axum::http::Method;
use clap::{Parser, Subcommand};
use serde_json::Value;
use url::Url;

use worker_gateway::client::{ApiClient, ClientError, HttpFetch, Payload, SendOptions};
use worker_gateway::config::{ClientConfig, GatewayConfig};
use worker_gateway::demo;

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Call the demo API of a running gateway dev host", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080/")]
    url: Url,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List route keys and names
    Routes,
    /// Call one route by key (`/api/todos/:id:GET`) or name (`todos.show`)
    Send {
        route: String,

        /// Path parameter, `name=value`
        #[arg(short, long = "param", value_parser = parse_pair)]
        params: Vec<(String, String)>,

        /// Query parameter, `name=value`
        #[arg(short, long = "query", value_parser = parse_pair)]
        query: Vec<(String, String)>,

        /// JSON request body
        #[arg(short, long)]
        json: Option<String>,

        /// Send with this method instead of the route's
        #[arg(short, long)]
        method: Option<Method>,
    },
}

fn parse_pair(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected name=value, got `{raw}`"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let defaults = GatewayConfig::default();
    let client_config = ClientConfig {
        base_url: cli.url,
        ..defaults.client
    };
    let registry = Arc::new(demo::registry(Arc::new(demo::TodoStore::new()))?);
    let transport = Arc::new(HttpFetch::new(&client_config)?);
    let client = ApiClient::new(registry, transport, &client_config, &defaults.protocol);

    match cli.command {
        Commands::Routes => {
            for route in client.routes() {
                let name = route.route().name().unwrap_or("-");
                println!("{:<28} {}", route.key(), name);
            }
        }
        Commands::Send {
            route,
            params,
            query,
            json,
            method,
        } => {
            let Some(route) = client.by_name(&route).or_else(|| client.by_key(&route)) else {
                return Err(format!("unknown route `{route}`").into());
            };

            let mut options = SendOptions::new();
            for (name, value) in params {
                options = options.param(name, value);
            }
            for (name, value) in query {
                options = options.query(name, value);
            }
            if let Some(json) = json {
                options = options.json_value(serde_json::from_str::<Value>(&json)?);
            }
            if let Some(method) = method {
                options = options.method(method);
            }

            match route.send(options).await {
                Ok(Some(Payload::Json(value))) => println!("{}", serde_json::to_string_pretty(&value)?),
                Ok(Some(Payload::Text(text))) => println!("{}", text),
                Ok(None) => println!("(empty response)"),
                Err(ClientError::Navigate(signal)) => println!("→ {}", signal.target),
                Err(e) => return Err(e.into()),
            }
        }
    }

    Ok(())
}
