use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use alice_anchor::dom::parser::parse_html;
use alice_anchor::dom::range::range_text;
use alice_anchor::engine::pipeline::PageResult;
use alice_anchor::fragment::{display_text, url::with_text_directive};
use alice_anchor::{Anchor, AnchorConfig, AnchorEngine, AnchorError};

#[derive(Parser)]
#[command(name = "alice-anchor")]
#[command(about = "Re-find text passages in web pages from text-fragment locators")]
#[command(version)]
struct Cli {
    /// Chars of slack allowed between prefix/suffix context and the match
    #[arg(long, default_value_t = 20, global = true)]
    window: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Locate text fragments in a page (URL or local HTML file)
    Find {
        /// URL (its `#:~:text=` directives are used) or path to an HTML file
        source: String,

        /// Extra locator, e.g. `prefix-,start,-suffix` (repeatable)
        #[arg(short = 't', long = "text")]
        locators: Vec<String>,
    },
    /// Build a locator for a passage of a local HTML file
    Capture {
        /// Path to an HTML file
        file: PathBuf,

        /// Exact text to select (case-sensitive, within one block)
        #[arg(long)]
        select: String,

        /// Which occurrence to select, counting from 0
        #[arg(long, default_value_t = 0)]
        occurrence: usize,

        /// Print a full link to this URL instead of the bare locator
        #[arg(long)]
        url: Option<String>,
    },
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();
    let engine = AnchorEngine::new(AnchorConfig::default().with_proximity_window(cli.window));

    let result = match cli.command {
        Commands::Find { source, locators } => find(&engine, &source, &locators),
        Commands::Capture {
            file,
            select,
            occurrence,
            url,
        } => capture(&engine, &file, &select, occurrence, url.as_deref()),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn read_html(path: &Path) -> Result<String, String> {
    std::fs::read_to_string(path).map_err(|e| format!("cannot read {}: {}", path.display(), e))
}

fn find(engine: &AnchorEngine, source: &str, locators: &[String]) -> Result<ExitCode, String> {
    let page: PageResult = if Path::new(source).is_file() {
        let html = read_html(Path::new(source))?;
        engine.process_html(&html, source, locators)
    } else {
        engine
            .load_page(source, locators)
            .map_err(|e: AnchorError| e.to_string())?
    };

    if page.anchors.is_empty() {
        return Err("no locators given (use -t or a URL with #:~:text=)".to_string());
    }

    let mut all_found = true;
    for (locator, anchor) in &page.anchors {
        match anchor {
            Anchor::Found(range) => {
                let text = range_text(&page.dom, range).unwrap_or_default();
                println!("found      {:?}: {:?}", display_text(locator), text);
            }
            Anchor::NotFound => {
                all_found = false;
                println!("not found  {:?}", display_text(locator));
            }
            Anchor::Malformed(err) => {
                all_found = false;
                println!("malformed  {:?}: {}", locator, err);
            }
        }
    }

    Ok(if all_found {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    })
}

fn capture(
    engine: &AnchorEngine,
    file: &Path,
    select: &str,
    occurrence: usize,
    url: Option<&str>,
) -> Result<ExitCode, String> {
    let html = read_html(file)?;
    let dom = parse_html(&html, &file.display().to_string());

    let selection = engine
        .select_text(&dom, select, occurrence)
        .ok_or_else(|| format!("{:?} (occurrence {}) not found in a single block", select, occurrence))?;
    let locator = engine.capture(&dom, &selection).map_err(|e| e.to_string())?;

    match url {
        Some(url) => {
            let base = url::Url::parse(url).map_err(|e| format!("invalid URL {}: {}", url, e))?;
            println!("{}", with_text_directive(&base, &locator));
        }
        None => println!("#:~:text={}", locator),
    }
    Ok(ExitCode::SUCCESS)
}
