//! csv-scout CLI - dialect and schema sniffer

use clap::Parser;
use csv_scout::{
    CsvReader, DatePreference, GuessOptions, Locale, Metadata, Quote, ReadOptions, SampleSize,
    Sniffer, Warning,
};
use log::LevelFilter;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Detect the dialect and column types of delimited text files.
///
/// Guesses the code page, delimiter, quote character, newline style,
/// preamble rows and header, then infers a type and format per column.
#[derive(Parser, Debug)]
#[command(name = "csv-scout")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input file(s) to sniff
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Number of lines handed to the dialect guessers
    #[arg(short = 'n', long)]
    sample_records: Option<usize>,

    /// Number of bytes handed to the dialect guessers (default: 262144)
    #[arg(short = 'b', long)]
    sample_bytes: Option<usize>,

    /// Read entire file instead of a prefix
    #[arg(short = 'a', long)]
    all: bool,

    /// Force specific delimiter (single character)
    #[arg(short = 'd', long)]
    delimiter: Option<char>,

    /// Force specific quote character (single character, or 'none')
    #[arg(short = 'q', long)]
    quote: Option<String>,

    /// Escape character honoured outside of quotes
    #[arg(long)]
    escape: Option<char>,

    /// Force the comment line prefix
    #[arg(long)]
    comment: Option<String>,

    /// Force the number of lines before the header
    #[arg(long)]
    skip_rows: Option<usize>,

    /// Force header presence (true or false)
    #[arg(long)]
    has_header: Option<bool>,

    /// Use day-month-year date format preference (default: month-day-year)
    #[arg(long)]
    dmy: bool,

    /// Locale for month and day names: en, de, fr or es
    #[arg(long, default_value = "en")]
    locale: String,

    /// Also try spreadsheet serial dates
    #[arg(long)]
    serial_dates: bool,

    /// Distinct values sampled per column
    #[arg(long, default_value = "200")]
    samples: usize,

    /// Records read at most while sampling
    #[arg(long, default_value = "10000")]
    max_records: u64,

    /// Start sampling at a random record
    #[arg(long)]
    random: bool,

    /// Join short rows with the following line
    #[arg(long)]
    combine_rows: bool,

    /// Move overflowing fields back into text columns
    #[arg(long)]
    realign: bool,

    /// Output format: text (default) or json
    #[arg(short = 'f', long, default_value = "text")]
    format: OutputFormat,

    /// Print the first N rows as normalized CSV
    #[arg(long)]
    rows: Option<usize>,

    /// Show detector decisions on stderr
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Only output the detected delimiter character
    #[arg(long)]
    delimiter_only: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    file: String,
    is_json: bool,
    encoding: &'static str,
    has_bom: bool,
    delimiter: Option<char>,
    quote: Option<char>,
    escape: Option<char>,
    comment_prefix: &'a str,
    newline: &'static str,
    skip_rows: usize,
    has_header: bool,
    num_fields: usize,
    records_sampled: u64,
    columns: Vec<ColumnReport<'a>>,
}

#[derive(Debug, Serialize)]
struct ColumnReport<'a> {
    name: &'a str,
    ordinal: usize,
    data_type: String,
    format: String,
    ignore: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    time_part: Option<&'a str>,
}

fn init_logging(verbose: bool) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
    if std::env::var("RUST_LOG").is_err() {
        let level = if verbose { LevelFilter::Debug } else { LevelFilter::Warn };
        builder.filter_module("csv_scout", level);
    }
    let _ = builder.format_timestamp_millis().try_init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut exit_code = ExitCode::SUCCESS;

    for file in &args.files {
        if let Err(e) = sniff_file(file, &args) {
            eprintln!("Error processing {}: {}", file.display(), e);
            exit_code = ExitCode::FAILURE;
        }
    }

    exit_code
}

fn build_sniffer(args: &Args) -> Result<Sniffer, Box<dyn std::error::Error>> {
    let mut sniffer = Sniffer::new();

    if args.all {
        sniffer.sample_size(SampleSize::All);
    } else if let Some(bytes) = args.sample_bytes {
        sniffer.sample_size(SampleSize::Bytes(bytes));
    } else if let Some(records) = args.sample_records {
        sniffer.sample_size(SampleSize::Records(records));
    }

    if let Some(delim) = args.delimiter {
        sniffer.delimiter(delim);
    }
    if let Some(ref quote_str) = args.quote {
        if quote_str.eq_ignore_ascii_case("none") {
            sniffer.quote(Quote::None);
        } else if let Some(c) = quote_str.chars().next() {
            sniffer.quote(Quote::Some(c));
        }
    }
    if args.escape.is_some() {
        sniffer.escape(args.escape);
    }
    if let Some(ref prefix) = args.comment {
        sniffer.comment_prefix(prefix);
    }
    if let Some(rows) = args.skip_rows {
        sniffer.skip_rows(rows);
    }
    if let Some(has_header) = args.has_header {
        sniffer.has_header(has_header);
    }

    let locale = Locale::by_name(&args.locale)
        .ok_or_else(|| format!("unknown locale '{}'", args.locale))?;
    let guess_options = GuessOptions {
        serial_date: args.serial_dates,
        date_preference: if args.dmy {
            DatePreference::DmyFormat
        } else {
            DatePreference::MdyFormat
        },
        locale,
        ..GuessOptions::default()
    };
    let read_options = ReadOptions {
        allow_row_combining: args.combine_rows,
        realign_columns: args.realign,
        ..ReadOptions::default()
    };

    sniffer
        .guess_options(guess_options)
        .read_options(read_options)
        .samples_wanted(args.samples)
        .max_sample_records(args.max_records)
        .randomize_samples(args.random);
    Ok(sniffer)
}

fn sniff_file(path: &Path, args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let sniffer = build_sniffer(args)?;
    let metadata = sniffer.sniff_path(path)?;

    if args.delimiter_only {
        match metadata.dialect.delimiter {
            Some(delimiter) => println!("{delimiter}"),
            None => println!("none"),
        }
        return Ok(());
    }

    match args.format {
        OutputFormat::Text => print_text_output(path, &metadata),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report(path, &metadata))?),
    }

    if let Some(limit) = args.rows {
        if !metadata.is_json {
            print_rows(path, &metadata, args, limit)?;
        }
    }

    Ok(())
}

fn report<'a>(path: &Path, metadata: &'a Metadata) -> Report<'a> {
    let dialect = &metadata.dialect;
    Report {
        file: path.display().to_string(),
        is_json: metadata.is_json,
        encoding: dialect.encoding.name(),
        has_bom: dialect.has_bom,
        delimiter: dialect.delimiter,
        quote: dialect.quote.char(),
        escape: dialect.escape,
        comment_prefix: &dialect.comment_prefix,
        newline: dialect.newline.as_str(),
        skip_rows: dialect.skip_rows(),
        has_header: dialect.has_header(),
        num_fields: metadata.num_fields,
        records_sampled: metadata.records_sampled,
        columns: metadata
            .columns
            .iter()
            .map(|column| ColumnReport {
                name: &column.name,
                ordinal: column.ordinal,
                data_type: column.format.data_type.to_string(),
                format: column.format.describe(),
                ignore: column.ignore,
                time_part: column.time_part.as_deref(),
            })
            .collect(),
    }
}

fn print_text_output(path: &Path, metadata: &Metadata) {
    let dialect = &metadata.dialect;
    println!("File: {}", path.display());
    if metadata.is_json {
        println!("  Content looks like JSON");
        println!();
        return;
    }
    match dialect.delimiter {
        Some(delimiter) => println!("  Delimiter: {delimiter:?}"),
        None => println!("  Delimiter: none"),
    }
    println!("  Quote: {}", dialect.quote);
    if let Some(escape) = dialect.escape {
        println!("  Escape: {escape:?}");
    }
    if !dialect.comment_prefix.is_empty() {
        println!("  Comment prefix: {}", dialect.comment_prefix);
    }
    println!("  Newline: {}", dialect.newline);
    println!("  Encoding: {}{}", dialect.encoding.name(), if dialect.has_bom { " (BOM)" } else { "" });
    println!("  Has header: {}", dialect.header.has_header_row);
    println!("  Preamble rows: {}", dialect.header.num_preamble_rows);
    println!("  Fields: {}", metadata.num_fields);
    println!("  Records sampled: {}", metadata.records_sampled);
    println!("  Columns:");
    for column in &metadata.columns {
        let mut line = format!("    {}: {} {}", column.ordinal + 1, column.name, column.format.describe());
        if let Some(time) = &column.time_part {
            line.push_str(&format!(" + time from '{time}'"));
        }
        if column.ignore {
            line.push_str(" (ignored)");
        }
        println!("{line}");
    }
    println!();
}

fn print_rows(path: &Path, metadata: &Metadata, args: &Args, limit: usize) -> Result<(), Box<dyn std::error::Error>> {
    let read_options = ReadOptions {
        allow_row_combining: args.combine_rows,
        realign_columns: args.realign,
        ..ReadOptions::default()
    };
    let file = BufReader::new(File::open(path)?);
    let mut reader = CsvReader::open(file, &metadata.dialect, &read_options)?
        .with_warning_sink(Box::new(|warning: &Warning| eprintln!("warning: {warning}")));

    // short rows are passed through as read
    let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(io::stdout());
    writer.write_record(reader.field_names())?;
    for _ in 0..limit {
        let Some(row) = reader.read_record()? else {
            break;
        };
        writer.write_record(&row.fields)?;
    }
    writer.flush()?;
    Ok(())
}
