//! Tabload CLI - schema-driven spreadsheet imports
//!
//! # Commands
//!
//! ```bash
//! tabload serve                                   # Start HTTP server (port 3000)
//! tabload parse subjects.xlsx                     # Decode a file to JSON
//! tabload suggest subjects.csv -s subjects.json   # Show the suggested mapping
//! tabload check subjects.csv -s subjects.json     # Validate without committing
//! tabload import subjects.csv -s subjects.json -o out.json
//! ```
//!
//! `--map key=Column` overrides a suggested mapping; pass an empty column
//! (`--map key=`) to unmap a field.

use async_trait::async_trait;
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tabload::commit::CommitSink;
use tabload::error::CommitResult;
use tabload::{
    decode_file, suggest_mapping, AppConfig, HttpCommitSink, ImportDefinition, ImportSession,
    JsonFileSink, PlainRecord,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "tabload")]
#[command(about = "Map, review and commit spreadsheet imports against a field schema", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a CSV or workbook and output its records as JSON
    Parse {
        /// Input file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the header → field mapping that would be suggested
    Suggest {
        /// Input file
        input: PathBuf,

        /// Import definition JSON
        #[arg(short, long)]
        schema: PathBuf,
    },

    /// Run a file through mapping and validation and report findings
    Check {
        /// Input file
        input: PathBuf,

        /// Import definition JSON
        #[arg(short, long)]
        schema: PathBuf,

        /// Mapping override, `key=Column`
        #[arg(short, long = "map", value_parser = parse_assignment)]
        maps: Vec<(String, String)>,
    },

    /// Map, validate and commit a file
    Import {
        /// Input file
        input: PathBuf,

        /// Import definition JSON
        #[arg(short, long)]
        schema: PathBuf,

        /// Mapping override, `key=Column`
        #[arg(short, long = "map", value_parser = parse_assignment)]
        maps: Vec<(String, String)>,

        /// Write committed records to this file
        #[arg(short, long, conflicts_with = "commit_url")]
        output: Option<PathBuf>,

        /// POST committed records to this URL (default: TABLOAD_COMMIT_URL)
        #[arg(long)]
        commit_url: Option<String>,
    },

    /// Start HTTP server
    Serve {
        /// Port to listen on (default: TABLOAD_PORT or 3000)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tabload=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env();

    let result = match cli.command {
        Commands::Parse { input, output } => cmd_parse(&input, output.as_deref()),

        Commands::Suggest { input, schema } => cmd_suggest(&input, &schema),

        Commands::Check { input, schema, maps } => cmd_check(&input, &schema, &maps),

        Commands::Import {
            input,
            schema,
            maps,
            output,
            commit_url,
        } => cmd_import(&input, &schema, &maps, output, commit_url, &config).await,

        Commands::Serve { port } => {
            let config = AppConfig {
                port: port.unwrap_or(config.port),
                ..config
            };
            tabload::server::start_server(config).await
        }
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn parse_assignment(value: &str) -> Result<(String, String), String> {
    let (key, column) = value
        .split_once('=')
        .ok_or_else(|| format!("expected key=Column, got '{}'", value))?;
    if key.trim().is_empty() {
        return Err(format!("missing field key in '{}'", value));
    }
    Ok((key.trim().to_string(), column.to_string()))
}

fn cmd_parse(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Decoding: {}", input.display());

    let table = decode_file(input)?;

    if let Some(encoding) = &table.encoding {
        eprintln!("   Encoding: {}", encoding);
    }
    if let Some(delimiter) = table.delimiter {
        eprintln!("   Delimiter: '{}' (auto-detected)", format_delimiter(delimiter));
    }
    eprintln!("   Columns: {}", table.headers.join(", "));
    eprintln!("✅ Decoded {} records", table.records.len());

    let json = serde_json::to_string_pretty(&table.records)?;
    write_output(&json, output)?;

    Ok(())
}

fn cmd_suggest(input: &Path, schema_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let definition = ImportDefinition::from_file(schema_path)?;
    let table = decode_file(input)?;
    let mapping = suggest_mapping(&table.headers, &definition.fields);

    eprintln!("🔗 Suggested mapping for \"{}\":", definition.title);
    for field in definition.fields.iter() {
        let marker = if field.required { "*" } else { " " };
        match mapping.get(&field.key) {
            Some(column) => eprintln!("  {} {:<20} ← {}", marker, field.key, column),
            None => eprintln!("  {} {:<20} ← (unmapped)", marker, field.key),
        }
    }

    let missing = mapping.missing_required(&definition.fields);
    if !missing.is_empty() {
        eprintln!("\n⚠️  Required fields unmapped: {}", missing.join(", "));
    }

    println!("{}", serde_json::to_string_pretty(&mapping)?);
    Ok(())
}

/// Decode, apply mapping overrides and move to preview.
fn open_preview(
    input: &Path,
    schema_path: &Path,
    maps: &[(String, String)],
) -> Result<ImportSession, Box<dyn std::error::Error>> {
    let definition = ImportDefinition::from_file(schema_path)?;
    let mut session = ImportSession::from_definition(definition);

    let bytes = fs::read(input)?;
    let file_name = input.file_name().and_then(|n| n.to_str());
    session.upload(&bytes, file_name)?;

    for (key, column) in maps {
        session.set_mapping(key, Some(column.as_str()))?;
    }

    session.proceed()?;
    Ok(session)
}

fn cmd_check(
    input: &Path,
    schema_path: &Path,
    maps: &[(String, String)],
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("✔️  Checking: {}", input.display());

    let session = open_preview(input, schema_path, maps)?;
    let report = session
        .report()
        .ok_or("session did not reach preview")?;
    let summary = report.summary();

    let violations = report.violations();
    for (row, key, verdict) in violations.iter().take(20) {
        let mut reasons = Vec::new();
        if verdict.missing {
            reasons.push("missing");
        }
        if verdict.duplicate {
            reasons.push("duplicate");
        }
        eprintln!("   ❌ Row {} [{}]: {}", row + 1, key, reasons.join(", "));
    }
    if violations.len() > 20 {
        eprintln!("   ... and {} more", violations.len() - 20);
    }

    eprintln!(
        "\n📊 Results: {} rows, {} flagged ({} missing, {} duplicate)",
        summary.rows, summary.error_rows, summary.missing, summary.duplicates
    );

    if summary.error_rows > 0 {
        std::process::exit(1);
    }

    eprintln!("✅ All {} rows valid!", summary.rows);
    Ok(())
}

async fn cmd_import(
    input: &Path,
    schema_path: &Path,
    maps: &[(String, String)],
    output: Option<PathBuf>,
    commit_url: Option<String>,
    config: &AppConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Importing: {}", input.display());

    let mut session = open_preview(input, schema_path, maps)?;
    if let Some(summary) = session.report().map(|r| r.summary()) {
        if summary.error_rows > 0 {
            eprintln!(
                "   ⚠️  {} of {} rows flagged, committing anyway",
                summary.error_rows, summary.rows
            );
        }
    }

    let commit_url = commit_url.or_else(|| config.commit_url.clone());
    let sink: Box<dyn CommitSink> = match (output, commit_url) {
        (Some(path), _) => {
            let mut sink = JsonFileSink::new(path);
            if let Some(key) = &config.placeholder_key {
                sink = sink.with_placeholder_key(key);
            }
            Box::new(sink)
        }
        (None, Some(url)) => {
            let mut sink = HttpCommitSink::new(url);
            if let Some(token) = &config.commit_token {
                sink = sink.with_token(token);
            }
            if let Some(key) = &config.placeholder_key {
                sink = sink.with_placeholder_key(key);
            }
            Box::new(sink)
        }
        (None, None) => Box::new(StdoutSink),
    };

    let committed = session.finalize(sink.as_ref()).await?;
    eprintln!("\n✨ Done! {} records committed", committed);
    Ok(())
}

/// Prints committed records as pretty JSON.
struct StdoutSink;

#[async_trait]
impl CommitSink for StdoutSink {
    async fn commit(&self, records: Vec<PlainRecord>) -> CommitResult<()> {
        println!("{}", serde_json::to_string_pretty(&records)?);
        Ok(())
    }
}

fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
