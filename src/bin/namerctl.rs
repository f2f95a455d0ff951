use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::RequestBuilder;
use serde_json::Value;

#[derive(Parser)]
#[command(name = "namerctl")]
#[command(about = "Management CLI for namerd", long_about = None)]
struct Cli {
    /// Base URL of the HTTP control interface
    #[arg(short, long, default_value = "http://localhost:4180")]
    url: String,

    /// Base URL of the admin server
    #[arg(short, long, default_value = "http://localhost:9991")]
    admin_url: String,

    /// Admin API key, if the admin server requires one
    #[arg(short, long, env = "NAMERD_API_KEY")]
    key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show admin status
    Status,
    /// List configured namers
    Namers,
    /// Manage dtabs
    #[command(subcommand)]
    Dtab(DtabCommand),
    /// Resolve a path through the namers
    Resolve { path: String },
}

#[derive(Subcommand)]
enum DtabCommand {
    /// List namespaces
    List,
    /// Show a namespace's dtab and version
    Get { namespace: String },
    /// Create or replace a namespace's dtab
    Put {
        namespace: String,
        dtab: String,
        /// Only replace if the stored version matches
        #[arg(long)]
        version: Option<u64>,
    },
    /// Delete a namespace
    Delete { namespace: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut admin_headers = HeaderMap::new();
    if let Some(key) = &cli.key {
        admin_headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {key}"))?);
    }
    let api = |path: &str| format!("{}/api/1{}", cli.url.trim_end_matches('/'), path);

    let request = match cli.command {
        Commands::Status => client
            .get(format!("{}/admin/status", cli.admin_url.trim_end_matches('/')))
            .headers(admin_headers),
        Commands::Namers => client
            .get(format!("{}/admin/namers", cli.admin_url.trim_end_matches('/')))
            .headers(admin_headers),
        Commands::Resolve { path } => client.get(api("/resolve")).query(&[("path", path)]),
        Commands::Dtab(DtabCommand::List) => client.get(api("/dtabs")),
        Commands::Dtab(DtabCommand::Get { namespace }) => client.get(api(&format!("/dtabs/{namespace}"))),
        Commands::Dtab(DtabCommand::Put {
            namespace,
            dtab,
            version,
        }) => {
            let request = client.put(api(&format!("/dtabs/{namespace}"))).body(dtab);
            match version {
                Some(version) => request.header(reqwest::header::IF_MATCH, version.to_string()),
                None => request,
            }
        }
        Commands::Dtab(DtabCommand::Delete { namespace }) => {
            client.delete(api(&format!("/dtabs/{namespace}")))
        }
    };

    send(request).await
}

async fn send(request: RequestBuilder) -> Result<(), Box<dyn std::error::Error>> {
    let res = request.send().await?;
    let status = res.status();
    let text = res.text().await?;
    if !status.is_success() {
        eprintln!("Error: namerd returned status {status}");
        if !text.is_empty() {
            eprintln!("Response: {text}");
        }
        std::process::exit(1);
    }

    if text.is_empty() {
        println!("{status}");
        return Ok(());
    }
    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{text}"),
    }
    Ok(())
}
