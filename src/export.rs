use std::fs::File;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use clap::ArgMatches;
use plaid_api::model::{Transaction, TransactionsGetOptions, TransactionsGetRequest};
use plaid_api::{Builder, Credentials};
use serde::Serialize;
use tracing::info;

use crate::settings::Settings;

const DEFAULT_BEGIN: &str = "2022-01-01";
const DEFAULT_UNTIL: &str = "2024-12-31";
const DEFAULT_OUTPUT: &str = "transactions.csv";
const PAGE_SIZE: u32 = 100;

const CSV_HEADER: [&str; 6] = [
    "transaction_id",
    "date",
    "name",
    "amount",
    "category",
    "account_id",
];

#[derive(Debug, Serialize)]
struct CsvRecord<'a> {
    transaction_id: &'a str,
    date: NaiveDate,
    name: &'a str,
    amount: f64,
    category: String,
    account_id: &'a str,
}

impl<'a> From<&'a Transaction> for CsvRecord<'a> {
    fn from(tx: &'a Transaction) -> Self {
        Self {
            transaction_id: &tx.transaction_id,
            date: tx.date,
            name: &tx.name,
            amount: tx.amount,
            category: tx.category.as_deref().unwrap_or_default().join(", "),
            account_id: &tx.account_id,
        }
    }
}

fn write_csv<W: std::io::Write>(wr: W, transactions: &[Transaction]) -> Result<()> {
    let mut out = csv::WriterBuilder::new().has_headers(false).from_writer(wr);

    // The header is written by hand so an empty result set still produces a
    // well-formed file.
    out.write_record(CSV_HEADER)?;
    for tx in transactions {
        out.serialize(CsvRecord::from(tx))?;
    }
    out.flush()?;

    Ok(())
}

async fn export(begin: NaiveDate, until: NaiveDate, output: &Path, settings: Settings) -> Result<()> {
    let access_token = settings
        .access_token
        .clone()
        .ok_or_else(|| anyhow!("no access token configured, set PLAID_ACCESS_TOKEN"))?;

    let plaid = Builder::new()
        .with_credentials(Credentials {
            client_id: settings.client_id.clone(),
            secret: settings.secret.clone(),
        })
        .with_env(settings.env.clone())
        .build();

    let res = plaid
        .transactions_get(&TransactionsGetRequest {
            access_token: &access_token,
            start_date: begin,
            end_date: until,
            options: Some(TransactionsGetOptions {
                count: Some(PAGE_SIZE),
                offset: Some(0),
                ..TransactionsGetOptions::default()
            }),
        })
        .await?;

    info!(
        "fetched {} of {} transactions",
        res.transactions.len(),
        res.total_transactions
    );

    let fd = File::create(output)
        .with_context(|| format!("failed to create output file {}", output.display()))?;
    write_csv(fd, &res.transactions)?;

    info!("transactions exported to {}", output.display());

    Ok(())
}

pub(crate) async fn run(matches: &ArgMatches, settings: Settings) -> Result<()> {
    let begin = NaiveDate::parse_from_str(
        matches.value_of("begin").unwrap_or(DEFAULT_BEGIN),
        "%Y-%m-%d",
    )?;
    let until = NaiveDate::parse_from_str(
        matches.value_of("until").unwrap_or(DEFAULT_UNTIL),
        "%Y-%m-%d",
    )?;
    let output = matches.value_of("output").unwrap_or(DEFAULT_OUTPUT);

    export(begin, until, Path::new(output), settings).await
}
