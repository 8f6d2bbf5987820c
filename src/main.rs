//! txtbook - inspect plain-text novels

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use log::LevelFilter;

use txtbook::{Paginator, PipelineConfig, RawDocument, analyze};

#[derive(Parser)]
#[command(name = "txtbook")]
#[command(version, about = "Detect encoding, chapters and pages of plain-text novels", long_about = None)]
#[command(after_help = "EXAMPLES:
    txtbook info novel.txt               Show encoding, structure and page count
    txtbook chapters novel.txt --json    List chapters as JSON
    txtbook page novel.txt 12            Print page 12")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// JSON pipeline configuration; missing fields use defaults
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Only print errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Show detected encoding, segmentation strategy and pagination
    Info {
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },
    /// List chapters
    Chapters {
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Print chapters (with content) as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print one page (1-based)
    Page {
        #[arg(value_name = "FILE")]
        input: PathBuf,

        #[arg(value_name = "PAGE")]
        page: usize,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn run(cli: &Cli) -> Result<(), String> {
    let config = load_config(cli.config.as_deref())?;
    match &cli.command {
        Command::Info { input } => show_info(input, &config),
        Command::Chapters { input, json } => list_chapters(input, &config, *json),
        Command::Page { input, page } => show_page(input, &config, *page),
    }
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig, String> {
    let Some(path) = path else {
        return Ok(PipelineConfig::default());
    };
    let json = fs::read_to_string(path).map_err(|e| format!("{}: {e}", path.display()))?;
    PipelineConfig::from_json(&json).map_err(|e| e.to_string())
}

fn show_info(path: &Path, config: &PipelineConfig) -> Result<(), String> {
    let raw = RawDocument::open(path).map_err(|e| e.to_string())?;
    let analysis = analyze(&raw, config).map_err(|e| e.to_string())?;

    println!("File: {}", path.display());
    println!("Size: {} bytes", raw.len());
    println!(
        "Encoding: {} ({:?}, confidence {:.2})",
        analysis.decoded.encoding_label(),
        analysis.decoded.method,
        analysis.decoded.confidence
    );
    println!("Characters: {}", analysis.index.total_chars);
    println!(
        "Pages: {} ({} chars per page)",
        analysis.index.total_pages, analysis.index.chars_per_page
    );
    println!("Structure: {}", analysis.segmentation.strategy);
    println!("Chapters: {}", analysis.chapters.len());

    Ok(())
}

fn list_chapters(path: &Path, config: &PipelineConfig, json: bool) -> Result<(), String> {
    let raw = RawDocument::open(path).map_err(|e| e.to_string())?;
    let analysis = analyze(&raw, config).map_err(|e| e.to_string())?;

    if json {
        let out = serde_json::to_string_pretty(&analysis.chapters).map_err(|e| e.to_string())?;
        println!("{out}");
        return Ok(());
    }

    for chapter in &analysis.chapters {
        println!(
            "{:>5}  {}  ({} chars)",
            chapter.index + 1,
            chapter.title,
            chapter.content.chars().count()
        );
    }
    Ok(())
}

fn show_page(path: &Path, config: &PipelineConfig, page: usize) -> Result<(), String> {
    let raw = RawDocument::open(path).map_err(|e| e.to_string())?;
    let analysis = analyze(&raw, config).map_err(|e| e.to_string())?;
    let paginator = Paginator::new(&analysis.text, config.pagination.chars_per_page);

    let index = page.checked_sub(1).unwrap_or(usize::MAX);
    let content = paginator.page(index).ok_or_else(|| {
        format!(
            "page {page} is out of range (document has {} pages)",
            paginator.total_pages()
        )
    })?;
    println!("{content}");
    eprintln!("-- {page}/{} --", paginator.total_pages());
    Ok(())
}
