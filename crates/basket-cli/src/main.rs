use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use basket_engine::{Catalog, DataIntegrityWarning, SegmentAttribute, TableQueryParams};
use clap::{Parser, Subcommand};
use serde::Serialize;

mod config;

use config::Config;

#[derive(Debug, Parser)]
#[command(name = "basket")]
#[command(about = "Household purchase analytics: segment charts and paged transaction queries as JSON.")]
struct Cli {
    /// Detailed transaction CSV. Defaults to `$BASKET_DATA_PATH`, then `data/detailed-data.csv`.
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Field delimiter of the CSV input.
    #[arg(long, global = true, default_value_t = ',')]
    delimiter: char,

    /// Pretty-print the JSON output.
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Segment statistics and chart series for one demographic attribute.
    Segments(SegmentsArgs),
    /// Chart series for every dashboard attribute.
    Dashboard,
    /// Filter, sort and page the raw transaction table.
    Table(TableArgs),
    /// Households whose demographic attributes conflict across lines.
    Warnings,
}

#[derive(Debug, Parser)]
struct SegmentsArgs {
    /// One of `age_range`, `marital_status`, `income_range`, `children`.
    #[arg(long)]
    attribute: String,

    /// Chart title suffix. Defaults to the dashboard title of the attribute.
    #[arg(long)]
    title: Option<String>,
}

#[derive(Debug, Parser)]
struct TableArgs {
    /// Only rows of this household number.
    #[arg(long)]
    search: Option<String>,

    /// `[+|-]COLUMN`, e.g. `-SPEND` for descending spend.
    #[arg(long, allow_hyphen_values = true)]
    sort: Option<String>,

    /// First row of the page (requires `--length`).
    #[arg(long, allow_negative_numbers = true)]
    start: Option<i64>,

    /// Page size (requires `--start`).
    #[arg(long, allow_negative_numbers = true)]
    length: Option<i64>,
}

#[derive(Debug, Serialize)]
struct WarningsReport<'a> {
    households: usize,
    warnings: &'a [DataIntegrityWarning],
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    config::init_logging();

    let config = Config::resolve(cli.data, cli.delimiter)?;
    let lines = basket_model::read_transactions_from_path(&config.data_path, &config.csv)
        .with_context(|| format!("loading {}", config.data_path.display()))?;
    let catalog = Catalog::build(lines).context("building aggregates")?;

    match cli.command {
        Command::Segments(args) => {
            let attribute: SegmentAttribute = args.attribute.parse()?;
            let title = args
                .title
                .unwrap_or_else(|| attribute.default_title().to_string());
            write_json(&catalog.segment_charts(attribute, &title), cli.pretty)
        }
        Command::Dashboard => write_json(&catalog.dashboard(), cli.pretty),
        Command::Table(args) => {
            let params = TableQueryParams {
                search: args.search,
                sort: args.sort,
                start: args.start,
                length: args.length,
            };
            write_json(&catalog.query_table(&params)?, cli.pretty)
        }
        Command::Warnings => write_json(
            &WarningsReport {
                households: catalog.households().len(),
                warnings: catalog.integrity_warnings(),
            },
            cli.pretty,
        ),
    }
}

/// Write `value` as one JSON document on stdout. A closed stdout is not an error.
fn write_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let mut buf = if pretty {
        serde_json::to_vec_pretty(value)?
    } else {
        serde_json::to_vec(value)?
    };
    buf.push(b'\n');

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    match handle.write_all(&buf).and_then(|()| handle.flush()) {
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => Ok(other?),
    }
}
