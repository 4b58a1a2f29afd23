use clap::Parser;
use colored::*;
use directories::ProjectDirs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use versecache::api::{CacheApi, CmdMessage, CmdResult, MessageLevel};
use versecache::cache::{CacheStats, CheckReport};
use versecache::config::CacheConfig;
use versecache::document::Document;
use versecache::error::{CacheError, Result};
use versecache::versification::Versifications;

mod args;
use args::{Cli, Commands};

/// Overrides the default cache directory (primarily for testing)
const DIR_ENV: &str = "VERSECACHE_DIR";

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let dir = cache_dir(cli.dir.clone())?;
    tracing::debug!(dir = %dir.display(), "using cache directory");
    let api = CacheApi::new(dir, Versifications::new());

    match cli.command {
        Commands::Init {
            versification,
            title,
        } => handle_init(&api, &versification, title),
        Commands::Put { reference, text } => handle_put(&api, &reference, &text),
        Commands::Import { file } => handle_import(&api, file),
        Commands::Get { passages, json } => handle_get(&api, &passages, json),
        Commands::Check => handle_check(&api),
        Commands::Info => handle_info(&api),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "versecache=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cache_dir(flag: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = flag {
        return Ok(dir);
    }
    if let Ok(dir) = std::env::var(DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }
    let proj_dirs = ProjectDirs::from("org", "versecache", "versecache").ok_or_else(|| {
        CacheError::Config("Could not determine a data directory; pass --dir".to_string())
    })?;
    Ok(proj_dirs.data_dir().join("default"))
}

fn handle_init(api: &CacheApi, versification: &str, title: Option<String>) -> Result<()> {
    let result = api.init(versification, title)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_put(api: &CacheApi, reference: &str, text: &str) -> Result<()> {
    let result = api.put(reference, text)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_import(api: &CacheApi, file: PathBuf) -> Result<()> {
    let result = api.import(&file)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_get(api: &CacheApi, passages: &[String], json: bool) -> Result<()> {
    let result = api.get(passages)?;
    if json {
        print_json(&result)?;
        return Ok(());
    }
    if let Some(document) = &result.document {
        print_document(document);
    }
    print_messages(&result.messages);
    Ok(())
}

fn handle_check(api: &CacheApi) -> Result<()> {
    let result = api.check()?;
    if let Some(report) = &result.check {
        print_check(report);
    }
    print_messages(&result.messages);
    if result.has_level(MessageLevel::Error) {
        std::process::exit(1);
    }
    Ok(())
}

fn handle_info(api: &CacheApi) -> Result<()> {
    let result = api.info()?;
    println!("{} {}", "location".dimmed(), api.dir().display());
    if let Some(config) = &result.config {
        print_config(config);
    }
    if let Some(stats) = &result.stats {
        print_stats(stats);
    }
    print_messages(&result.messages);
    Ok(())
}

fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => println!("{}", message.content.red()),
        }
    }
}

fn print_document(document: &Document) {
    for (i, section) in document.sections.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!("{}", section.title.yellow().bold());
        for entry in &section.entries {
            println!("{:>4} {}", entry.verse.verse.to_string().dimmed(), entry.text);
        }
    }
}

fn print_json(result: &CmdResult) -> Result<()> {
    let value = serde_json::json!({
        "document": result.document,
        "missing": result.missing,
    });
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn print_check(report: &CheckReport) {
    println!("{} {}", "verses checked".dimmed(), report.verses_checked);
    println!("{} {}", "records".dimmed(), report.record_count);
    println!("{} {}", "live bytes".dimmed(), report.live_bytes);
}

fn print_config(config: &CacheConfig) {
    println!("{} {}", "versification".dimmed(), config.versification);
    if let Some(title) = &config.title {
        println!("{} {}", "title".dimmed(), title);
    }
    if let Some(created) = config.created_at {
        println!(
            "{} {}",
            "created".dimmed(),
            created.format("%Y-%m-%d %H:%M:%S UTC")
        );
    }
    println!("{} {}", "sync on flush".dimmed(), config.sync_on_flush);
}

fn print_stats(stats: &CacheStats) {
    println!(
        "{} {}/{}",
        "verses".dimmed(),
        stats.present_verses,
        stats.total_verses
    );
    println!("{} {} bytes ({})", "data file".dimmed(), stats.blob_len, stats.mode);
}
