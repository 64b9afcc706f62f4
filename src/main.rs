mod export;
mod server;
mod settings;

use anyhow::Result;
use clap::{arg, Command};
use tracing_subscriber::{
    filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

use crate::settings::Settings;

static CLIENT_NAME: &str = "passbook";
static LINK_USER_ID: &str = "user-id";
static COUNTRY_CODES: [&str; 1] = ["US"];
static PRODUCTS: [&str; 2] = ["auth", "transactions"];

async fn run() -> Result<()> {
    let app = Command::new(CLIENT_NAME)
        .about("The passbook utility bridges Plaid's API for small clients: it \
         serves the account linking endpoints and exports linked transactions to CSV.")
        .version("0.1.0")
        .subcommand_required(true)
        .allow_external_subcommands(false)
        .arg(arg!(CONFIG: -c --config [FILE] "Sets a custom config file"))
        .arg(arg!(verbose: -v --verbose [Boolean] "Sets the level of verbosity"))
        .subcommand(Command::new("serve")
            .about("Runs the Plaid passthrough HTTP server.")
            .arg(arg!(listen: -l --listen [ADDR] "The socket address to listen on, defaults to 127.0.0.1:3003.")))
        .subcommand(Command::new("export")
            .about("Fetches transactions for the configured access token and writes them to a CSV file.")
            .arg(arg!(begin: --begin [DATE] "The first day of transactions to export, defaults to 2022-01-01. Start date is inclusive."))
            .arg(arg!(until: --until [DATE] "The last day of transactions to export, defaults to 2024-12-31. End date is inclusive."))
            .arg(arg!(output: -o --output [FILE] "The file to write records to, defaults to transactions.csv. Overwrites any existing file.")));

    let matches = app.get_matches();

    let default_level = if matches.value_of("verbose") == Some("true") {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    tracing_subscriber::registry()
        .with(
            EnvFilter::builder()
                .with_default_directive(default_level.into())
                .from_env_lossy(),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::new(matches.value_of("CONFIG"))?;

    match matches.subcommand() {
        Some(("serve", serve_matches)) => server::run(serve_matches, settings).await,
        Some(("export", export_matches)) => export::run(export_matches, settings).await,
        None => unreachable!("subcommand is required"),
        _ => unreachable!(),
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        println!("{}", err);
        std::process::exit(1);
    }
}
