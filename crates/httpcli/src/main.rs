mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use httpcli_playbook::{ClientConfig, Settings};

#[derive(Parser, Debug)]
#[command(name = "http")]
#[command(version, about = "Simplified command line HTTP client", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Request header as "Key: Value" (repeatable)
    #[arg(short = 'H', long = "headers", global = true, value_name = "HEADER")]
    headers: Vec<String>,

    /// Pretty print the response body based on its Content-Type
    #[arg(short, long, global = true)]
    pretty: bool,

    /// Print the response status line and headers
    #[arg(short, long, global = true)]
    include: bool,

    /// Print the outgoing request
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Perform a GET request
    Get { url: String },

    /// Perform a HEAD request
    Head { url: String },

    /// Perform a PUT request
    Put {
        url: String,
        #[arg(short, long, default_value = "")]
        data: String,
    },

    /// Perform a POST request
    Post {
        url: String,
        #[arg(short, long, default_value = "")]
        data: String,
    },

    /// Perform a DELETE request
    Delete {
        url: String,
        #[arg(short, long, default_value = "")]
        data: String,
    },

    /// Run the requests of a playbook file in order
    #[command(verbatim_doc_comment)]
    Execute {
        /// Path to the playbook YAML file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Refuse to run a playbook with validation findings
        #[arg(long)]
        strict: bool,

        /// Print the run summary as JSON when done
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    fn client_config(&self) -> ClientConfig {
        ClientConfig {
            headers: self.headers.clone(),
            pretty: self.pretty,
            include_headers: self.include,
            verbose: self.verbose,
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let settings = Settings::from_env();
    let config = cli.client_config();

    match cli.command {
        Commands::Get { url } => {
            commands::single_request(&settings, &config, "GET", &url, "").await
        }
        Commands::Head { url } => {
            commands::single_request(&settings, &config, "HEAD", &url, "").await
        }
        Commands::Put { url, data } => {
            commands::single_request(&settings, &config, "PUT", &url, &data).await
        }
        Commands::Post { url, data } => {
            commands::single_request(&settings, &config, "POST", &url, &data).await
        }
        Commands::Delete { url, data } => {
            commands::single_request(&settings, &config, "DELETE", &url, &data).await
        }
        Commands::Execute { file, strict, json } => {
            commands::execute(&settings, &config, &file, strict, json).await
        }
    }
}
