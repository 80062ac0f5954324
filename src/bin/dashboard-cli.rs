use std::sync::Arc;

use clap::{Parser, ValueEnum};
use futures_util::future::join_all;
use serde_json::Value;

use dashboard_api::client::{HttpTransport, MockTransport, Transport};
use dashboard_api::config::{MockConfig, RequestConfig};
use dashboard_api::{ApiRequest, MockApi, MockDb, RequestManager};

#[derive(Parser)]
#[command(name = "dashboard-cli")]
#[command(about = "Send requests through the de-duplicating request manager", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://127.0.0.1:3000/mock-api")]
    url: String,

    /// Serve the request from an in-process seeded mock instead of HTTP
    #[arg(long)]
    mock: bool,

    /// Bearer token for authenticated routes
    #[arg(short, long)]
    token: Option<String>,

    #[arg(value_enum)]
    verb: Verb,

    /// Path relative to the base url, e.g. /users/1
    path: String,

    /// Query parameter as key=value; repeatable
    #[arg(short, long = "param", value_parser = parse_param)]
    params: Vec<(String, Value)>,

    /// JSON request body
    #[arg(short, long)]
    body: Option<String>,

    /// Issue this many identical requests concurrently
    #[arg(short, long, default_value_t = 1)]
    repeat: usize,
}

#[derive(Clone, Copy, ValueEnum)]
enum Verb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

fn parse_param(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got `{raw}`"))?;
    // Numbers and booleans keep their JSON type; anything else is a string.
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let body = match &cli.body {
        Some(raw) => serde_json::from_str(raw)?,
        None => Value::Null,
    };
    let mut request = match cli.verb {
        Verb::Get => ApiRequest::get(&cli.path)?,
        Verb::Post => ApiRequest::post(&cli.path, body)?,
        Verb::Put => ApiRequest::put(&cli.path, body)?,
        Verb::Patch => ApiRequest::patch(&cli.path, body)?,
        Verb::Delete => ApiRequest::delete(&cli.path)?,
    };
    for (key, value) in cli.params {
        request = request.with_param(key, value);
    }

    let config = RequestConfig {
        base_url: cli.url.clone(),
        ..RequestConfig::default()
    };
    let transport: Arc<dyn Transport> = if cli.mock {
        let api = MockApi::new(Arc::new(MockDb::seeded()), &MockConfig::default());
        let mut transport = MockTransport::new(Arc::new(api));
        if let Some(token) = &cli.token {
            transport = transport.with_token(token.clone());
        }
        Arc::new(transport)
    } else {
        let mut transport = HttpTransport::new(&config)?;
        if let Some(token) = &cli.token {
            transport = transport.with_token(token.clone());
        }
        Arc::new(transport)
    };

    let manager = Arc::new(RequestManager::from_config(transport, &config));
    let calls = (0..cli.repeat.max(1)).map(|_| {
        let manager = manager.clone();
        let request = request.clone();
        async move { manager.execute(request).await }
    });

    for (i, result) in join_all(calls).await.into_iter().enumerate() {
        match result {
            Ok(data) => println!("{}", serde_json::to_string_pretty(&data)?),
            Err(e) => eprintln!("Error (call {}): {}", i + 1, e),
        }
    }

    Ok(())
}
