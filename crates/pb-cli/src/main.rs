//! `pb`: command-line access to a page builder document store.
//!
//! Works on a directory repository (one file per document plus
//! `index.json`). Set `RUST_LOG=debug` for store diagnostics.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use pb_core::tree::walk;
use pb_core::{ComponentType, Document, NodeId, prebuilt, transcode};
use pb_editor::{Editor, EditorConfig, FileRepository, MemoryClipboard, StoreFormat};
use std::fmt::Write as _;
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "pb")]
#[command(about = "Inspect, edit and export page builder documents", long_about = None)]
struct Cli {
    /// Document store directory
    #[arg(short, long, default_value = "./pages", global = true)]
    dir: PathBuf,

    /// Encoding of document files in the store
    #[arg(long, value_enum, default_value = "json", global = true)]
    format: Format,

    /// Editor settings (JSON); absent keys use defaults
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Msgpack,
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportKind {
    Html,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// List stored documents, most recent first
    List,

    /// Print a document's component outline
    Show { id: String },

    /// Create an empty document
    New {
        /// Document name (defaults to the configured name)
        name: Option<String>,
    },

    /// Delete a stored document
    Delete { id: String },

    /// Store a document JSON file, keeping its ids
    Import { file: PathBuf },

    /// Export a document as HTML or JSON
    Export {
        id: String,

        #[arg(short, long, value_enum, default_value = "html")]
        kind: ExportKind,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Append a palette component or prebuilt section to a document
    Add {
        id: String,

        /// Component type (container, text, image, button, input, icon)
        /// or prebuilt section name
        what: String,

        /// Target container id
        #[arg(short, long)]
        parent: Option<String>,

        /// Prop overrides as a JSON object
        #[arg(long)]
        props: Option<String>,
    },

    /// Validate a clipboard payload from a file or stdin
    CheckClip { file: Option<PathBuf> },

    /// List the prebuilt sections
    Prebuilts,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            EditorConfig::from_json(&text)?
        }
        None => EditorConfig::default(),
    };
    let format = match cli.format {
        Format::Json => StoreFormat::Json,
        Format::Msgpack => StoreFormat::MessagePack,
    };

    let dir = cli.dir;
    let open = move || -> Result<Editor> {
        let repository = FileRepository::with_format(&dir, format)
            .with_context(|| format!("opening store {}", dir.display()))?;
        Ok(Editor::new(config, Box::new(repository), Box::new(MemoryClipboard::new())))
    };

    match cli.command {
        Commands::List => {
            let editor = open()?;
            let docs = editor.list_documents()?;
            if docs.is_empty() {
                println!("no documents");
            }
            for meta in docs {
                println!(
                    "{}  {:<24} rev {:<4} {}",
                    meta.last_modified.format("%Y-%m-%d %H:%M"),
                    meta.name,
                    meta.revision,
                    meta.id
                );
            }
        }
        Commands::Show { id } => {
            let mut editor = open()?;
            editor.load_document(&id)?;
            if let Some(doc) = editor.document() {
                print!("{}", outline(doc));
            }
        }
        Commands::New { name } => {
            let id = open()?.new_document(name.as_deref())?;
            println!("{id}");
        }
        Commands::Delete { id } => {
            if !open()?.delete_document(&id)? {
                bail!("no document {id:?}");
            }
            log::info!("deleted {id}");
        }
        Commands::Import { file } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let mut editor = open()?;
            editor.import_json(&text)?;
            if !editor.save()? {
                bail!("store holds a newer revision of {}", file.display());
            }
            if let Some(doc) = editor.document() {
                println!("{}", doc.id);
            }
        }
        Commands::Export { id, kind, output } => {
            let mut editor = open()?;
            editor.load_document(&id)?;
            let text = match kind {
                ExportKind::Html => editor.export_html()?,
                ExportKind::Json => editor.export_json()?,
            };
            write_output(output.as_deref(), &text)?;
        }
        Commands::Add {
            id,
            what,
            parent,
            props,
        } => {
            let mut editor = open()?;
            editor.load_document(&id)?;
            let added = add(&mut editor, &what, parent.as_deref(), props.as_deref())?;
            if !editor.save()? {
                bail!("store holds a newer revision of {id}");
            }
            println!("{added}");
        }
        Commands::CheckClip { file } => check_clip(file.as_deref())?,
        Commands::Prebuilts => {
            for p in prebuilt::catalog() {
                println!("{:<16} {}", p.name, p.description);
            }
        }
    }
    Ok(())
}

fn add(editor: &mut Editor, what: &str, parent: Option<&str>, props: Option<&str>) -> Result<NodeId> {
    let parent = parent.map(NodeId::intern);
    let added = match ComponentType::parse(what) {
        Some(kind) => {
            let overrides = match props {
                Some(text) => serde_json::from_str(text).context("--props must be a JSON object")?,
                None => Default::default(),
            };
            editor.add(kind, overrides, parent)?
        }
        None => {
            if props.is_some() {
                bail!("--props only applies to palette components");
            }
            editor.add_prebuilt(what, parent)?
        }
    };
    match added {
        Some(id) => Ok(id),
        None => bail!("{what} could not be added there"),
    }
}

fn check_clip(file: Option<&Path>) -> Result<()> {
    let text = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let node = transcode::deserialize(&text)?;
    let count = walk(std::slice::from_ref(&node)).count();
    println!("ok: {} with {count} node(s)", node.kind.as_str());
    Ok(())
}

fn write_output(path: Option<&Path>, text: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
            log::info!("wrote {}", path.display());
        }
        None => println!("{text}"),
    }
    Ok(())
}

/// Indented `type "name" #id` lines, one per node.
fn outline(doc: &Document) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", doc.name, doc.id);
    for (depth, node) in walk(&doc.components) {
        let indent = "  ".repeat(depth + 1);
        let _ = write!(out, "{indent}{} \"{}\" #{}", node.kind.as_str(), node.display_name(), node.id);
        if node.background_source.is_some() {
            let _ = write!(out, " [background]");
        }
        let _ = writeln!(out);
    }
    out
}
