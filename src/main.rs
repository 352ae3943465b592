//! dars - terminal reader for Arabic lesson files
//!
//! Shows a lesson with in-page search highlighting, section tracking and
//! copying of quoted verses, hadith and supplications.

mod clipboard;
mod command;
mod config;
mod display;
mod document;
mod error;
mod input;
mod layout;
mod navigation;
mod search;
mod search_bar;
mod style;
mod terminal;
mod viewer;
mod viewport;

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Mutex;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use config::Config;
use error::{Result, ViewerError};
use layout::Layout;
use search::SearchHighlighter;
use terminal::Terminal;
use viewer::Viewer;

/// Width used by --print
const PRINT_WIDTH: usize = 80;

/// One text row plus the mode line and minibuffer
const MIN_ROWS: u16 = 3;

#[derive(Parser)]
#[command(name = "dars", version, about = "Read a lesson in the terminal")]
struct Cli {
    /// Lesson file (TOML)
    file: PathBuf,

    /// Print the lesson as plain text and exit
    #[arg(long)]
    print: bool,

    /// Highlight QUERY, list the matches and exit
    #[arg(long, value_name = "QUERY")]
    find: Option<String>,

    /// Read settings from PATH instead of ~/.dars.conf
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Append logs to PATH (filter with DARS_LOG)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    if let Some(path) = &cli.log_file {
        init_logging(path)?;
    }

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load(),
    };
    let mut tree = document::load(&cli.file)?;

    if let Some(query) = &cli.find {
        let mut highlighter = SearchHighlighter::with_min_chars(config.min_query_chars);
        if query.chars().count() < highlighter.min_chars() {
            eprintln!(
                "note: queries shorter than {} characters are not highlighted",
                highlighter.min_chars()
            );
        }
        highlighter.set_query(&mut tree, query);
        for mark in highlighter.marks(&tree) {
            println!(
                "{}:{}:{}-{}: {}",
                tree.section_id(mark.section),
                mark.run,
                mark.chars.start,
                mark.chars.end,
                mark.text
            );
        }
        println!("{} matches", highlighter.mark_count(&tree));
        if !cli.print {
            return Ok(());
        }
    }

    if cli.print {
        let width = if config.wrap_width == 0 {
            PRINT_WIDTH
        } else {
            config.wrap_width
        };
        print!("{}", layout::render_plain(&Layout::build(&tree, width)));
        return Ok(());
    }

    let mut terminal = Terminal::new()?;
    if terminal.rows() < MIN_ROWS {
        return Err(ViewerError::Message(format!(
            "terminal too small: need at least {} rows",
            MIN_ROWS
        )));
    }
    let mut viewer = Viewer::new(tree, config, terminal.cols(), terminal.rows());
    viewer.run(&mut terminal)?;
    tracing::info!("viewer closed");

    Ok(())
}

fn init_logging(path: &Path) -> Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_env_filter(EnvFilter::try_from_env("DARS_LOG").unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    tracing::info!(log = %path.display(), "dars started");
    Ok(())
}
