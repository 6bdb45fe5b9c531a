//! Penpage command line tool.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use penpage_core::storage::{self, StorageError};
use penpage_core::{Document, NoteKind, PageTemplate};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{0} already exists; refusing to overwrite")]
    AlreadyExists(PathBuf),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Parser, Debug)]
#[command(name = "penpage", about = "Create, inspect and repair Penpage notes")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write an empty note.
    New {
        path: PathBuf,
        #[arg(long, value_enum, default_value_t = KindArg::Canvas)]
        kind: KindArg,
        #[arg(long, value_enum, default_value_t = TemplateArg::Blank)]
        template: TemplateArg,
    },
    /// Print a summary of a note.
    Info { path: PathBuf },
    /// Load a note with defaults applied and write it back in the current format.
    Repair {
        path: PathBuf,
        /// Write the repaired note here instead of overwriting the input.
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum KindArg {
    Canvas,
    A4,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum TemplateArg {
    Blank,
    Ruled,
    Grid,
    #[value(alias = "dot_grid")]
    DotGrid,
}

impl From<KindArg> for NoteKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Canvas => NoteKind::Canvas,
            KindArg::A4 => NoteKind::PagedA4,
        }
    }
}

impl From<TemplateArg> for PageTemplate {
    fn from(template: TemplateArg) -> Self {
        match template {
            TemplateArg::Blank => PageTemplate::Blank,
            TemplateArg::Ruled => PageTemplate::Ruled,
            TemplateArg::Grid => PageTemplate::Grid,
            TemplateArg::DotGrid => PageTemplate::DotGrid,
        }
    }
}

fn create(path: PathBuf, kind: KindArg, template: TemplateArg) -> Result<(), CliError> {
    if path.exists() {
        return Err(CliError::AlreadyExists(path));
    }
    let document = Document::new(kind.into(), template.into());
    storage::save_path(&path, &document)?;
    log::info!("Created {:?} note at {}", document.note_kind(), path.display());
    println!("{}", path.display());
    Ok(())
}

fn describe(document: &Document) -> String {
    let mut out = String::new();
    let kind = match document.note_kind() {
        NoteKind::Canvas => "canvas",
        NoteKind::PagedA4 => "a4_notes",
    };
    out.push_str(&format!("kind:      {kind}\n"));
    out.push_str(&format!("size:      {} x {}\n", document.width, document.height));
    if document.is_paged() {
        out.push_str(&format!("template:  {:?}\n", document.page_template));
        out.push_str(&format!(
            "pages:     {} (current {})\n",
            document.total_pages(),
            document.current_page()
        ));
    }
    for (number, layer) in document.pages() {
        out.push_str(&format!(
            "page {number}: {} strokes, {} shapes, {} text boxes\n",
            layer.strokes().len(),
            layer.shapes().len(),
            layer.text_boxes().len()
        ));
    }
    out
}

fn info(path: PathBuf) -> Result<(), CliError> {
    let document = storage::load_path(&path)?;
    print!("{}", describe(&document));
    Ok(())
}

fn repair(path: PathBuf, out: Option<PathBuf>) -> Result<(), CliError> {
    let document = storage::load_path(&path)?;
    let target = out.unwrap_or(path);
    storage::save_path(&target, &document)?;
    log::info!("Rewrote {} ({} entities)", target.display(), document.entity_count());
    println!("{}", target.display());
    Ok(())
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::New { path, kind, template } => create(path, kind, template),
        Command::Info { path } => info(path),
        Command::Repair { path, out } => repair(path, out),
    }
}

fn main() -> ExitCode {
    env_logger::init();
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("penpage: {e}");
            ExitCode::FAILURE
        }
    }
}
