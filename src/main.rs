use std::process::ExitCode;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use do_facts::{Client, FactsParams, FactsTarget, Outcome, invoke};
use tracing_subscriber::EnvFilter;

/// Report DigitalOcean resources as JSON facts
#[derive(Debug, Parser)]
#[command(name = "do-facts", version)]
struct Cli {
    /// Log verbosity on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List floating IPs (token fallback: DO_OAUTH_TOKEN)
    FloatingIps(FloatingIpArgs),
    /// List account SSH keys (token fallback: DO_API_TOKEN, DO_API_KEY)
    SshKeys(ApiArgs),
}

#[derive(Debug, Args)]
struct ApiArgs {
    /// DigitalOcean OAuth token
    #[arg(long)]
    oauth_token: Option<String>,

    /// API base URL
    #[arg(long)]
    api_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,
}

#[derive(Debug, Args)]
struct FloatingIpArgs {
    #[command(flatten)]
    api: ApiArgs,

    /// Desired state of the target (present, absent)
    #[arg(long)]
    state: Option<String>,

    /// Public IP address of the floating IP
    #[arg(long, alias = "id")]
    ip: Option<String>,

    /// Region the floating IP is reserved to
    #[arg(long)]
    region: Option<String>,

    /// Droplet the floating IP is assigned to
    #[arg(long)]
    droplet_id: Option<String>,
}

impl ApiArgs {
    fn into_params(self) -> FactsParams {
        FactsParams {
            oauth_token: self.oauth_token,
            api_url: self.api_url,
            timeout: self.timeout.map(Duration::from_secs),
            ..FactsParams::default()
        }
    }
}

impl Commands {
    fn into_request(self) -> (FactsTarget, FactsParams) {
        match self {
            Self::FloatingIps(args) => (
                FactsTarget::FloatingIps,
                FactsParams {
                    state: args.state,
                    ip: args.ip,
                    region: args.region,
                    droplet_id: args.droplet_id,
                    ..args.api.into_params()
                },
            ),
            Self::SshKeys(args) => (FactsTarget::SshKeys, args.into_params()),
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let (target, params) = cli.command.into_request();
    let outcome = invoke(params, target, |name| std::env::var(name).ok(), Client::new()).await;

    let rendered = outcome
        .to_json()
        .unwrap_or_else(|err| Outcome::failure(err.to_string()).to_json().unwrap_or_default());
    println!("{rendered}");
    ExitCode::from(outcome.exit_code() as u8)
}
