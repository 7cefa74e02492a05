//! # Cornell Notes CLI
//!
//! Usage:
//!   cornell-notes lecture.md -o out/ --font serif
//!   cornell-notes lecture.md --summary "Week 3" --images ./images

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;

use cornell_notes::{
    export_to_pdf, DirectoryImageStore, ExportOptions, FontPreference, ImageStore, NoImageStore, Note,
};

#[derive(Parser)]
#[command(name = "cornell-notes")]
#[command(version)]
#[command(about = "Export a markdown note as a Cornell-style PDF", long_about = None)]
struct Cli {
    /// Markdown note to export
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output directory
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    output: PathBuf,

    /// Note title (defaults to the input file name)
    #[arg(long)]
    title: Option<String>,

    /// Summary printed under the title
    #[arg(long, default_value = "")]
    summary: String,

    /// Typeface: sans, serif or mixed
    #[arg(long)]
    font: Option<FontPreference>,

    /// Directory holding images referenced as cornell-image://<id>
    #[arg(long, value_name = "DIR")]
    images: Option<PathBuf>,

    /// Export options as JSON
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("✗ {}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let markdown = fs::read_to_string(&cli.input)
        .map_err(|e| format!("failed to read {}: {}", cli.input.display(), e))?;

    let mut options = match &cli.config {
        Some(path) => ExportOptions::from_json(&fs::read_to_string(path)?)?,
        None => ExportOptions::default(),
    };
    if let Some(font) = cli.font {
        options = options.with_font(font);
    }

    let title = cli.title.clone().unwrap_or_else(|| file_stem(&cli.input));
    let note = Note::new(title, cli.summary.clone(), markdown);

    let store: Box<dyn ImageStore> = match &cli.images {
        Some(dir) => Box::new(DirectoryImageStore::new(dir)),
        None => Box::new(NoImageStore),
    };

    let document = export_to_pdf(&note, &options, store.as_ref())?;
    fs::create_dir_all(&cli.output)?;
    let path = document.save_to(&cli.output)?;
    eprintln!(
        "✓ Written {} bytes ({} pages) to {}",
        document.bytes.len(),
        document.page_count,
        path.display()
    );
    Ok(())
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
