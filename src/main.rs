//! fb2outline - show the outline or header of a FictionBook rendered as HTML

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use fb2outline::dom::{Document, parse_html};
use fb2outline::head::HeadModel;
use fb2outline::outline::{Handle, OutlineModel, Role};
use fb2outline::scheme::Scheme;
use fb2outline::util::{decode_text, extract_xml_encoding};

#[derive(Parser)]
#[command(name = "fb2outline")]
#[command(version, about = "FictionBook outline viewer", long_about = None)]
#[command(after_help = "EXAMPLES:
    fb2outline book.html                    Print the outline
    fb2outline --head book.html             Print the header tree
    fb2outline --json book.html             Print the outline as JSON
    fb2outline -l 'DIV=0,DIV=2' book.html   Show the row a location reaches

Set RUST_LOG=debug for diagnostics.")]
struct Cli {
    /// Input file (HTML rendering of a FictionBook)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Print the header (description) tree instead of the outline
    #[arg(long)]
    head: bool,

    /// Print JSON instead of an indented tree
    #[arg(short, long)]
    json: bool,

    /// Resolve a location descriptor against the outline
    #[arg(short, long, value_name = "LOCATION", conflicts_with = "head")]
    locate: Option<String>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    let doc = load(&cli.input).map_err(|e| format!("{}: {e}", cli.input.display()))?;

    if let Some(location) = &cli.locate {
        locate(&doc, location)
    } else if cli.head {
        show_head(&doc, cli.json)
    } else {
        show_outline(&doc, cli.json)
    }
}

fn load(path: &Path) -> fb2outline::Result<Document> {
    let bytes = std::fs::read(path)?;
    let text = decode_text(&bytes, extract_xml_encoding(&bytes));
    Ok(parse_html(&text))
}

fn show_outline(doc: &Document, json: bool) -> Result<(), String> {
    let model = OutlineModel::new(doc);
    let Some(tree) = model.tree() else {
        return Err("document has no <body>".to_string());
    };

    if json {
        let snapshot = tree.snapshot(tree.root());
        let out = serde_json::to_string_pretty(&snapshot).map_err(|e| e.to_string())?;
        println!("{out}");
        return Ok(());
    }

    print_rows(&model, None, 0);
    Ok(())
}

fn print_rows(model: &OutlineModel, parent: Option<Handle>, depth: usize) {
    for row in 0..model.row_count(parent) {
        let Some(handle) = model.index(row, 0, parent) else {
            continue;
        };
        if let Some(text) = model.data(handle, Role::Display) {
            println!("{:indent$}{text}", "", indent = depth * 2);
        }
        print_rows(model, Some(handle), depth + 1);
    }
}

fn show_head(doc: &Document, json: bool) -> Result<(), String> {
    let model = HeadModel::new(doc, Scheme::packaged());
    let Some(tree) = model.tree() else {
        return Err("document has no description".to_string());
    };

    if json {
        let snapshot = tree.snapshot(tree.root());
        let out = serde_json::to_string_pretty(&snapshot).map_err(|e| e.to_string())?;
        println!("{out}");
        return Ok(());
    }

    print_head_rows(&model, None, 0);
    Ok(())
}

fn print_head_rows(model: &HeadModel<'_>, parent: Option<fb2outline::head::Handle>, depth: usize) {
    for row in 0..model.row_count(parent) {
        let Some(key) = model.index(row, 0, parent) else {
            continue;
        };
        let value = model
            .index(row, 1, parent)
            .and_then(|h| model.data(h, Role::Display))
            .unwrap_or_default();
        let key_text = model.data(key, Role::Display).unwrap_or_default();
        if value.is_empty() {
            println!("{:indent$}{key_text}", "", indent = depth * 2);
        } else {
            println!("{:indent$}{key_text}: {value}", "", indent = depth * 2);
        }
        print_head_rows(model, Some(key), depth + 1);
    }
}

fn locate(doc: &Document, location: &str) -> Result<(), String> {
    let model = OutlineModel::new(doc);
    let Some(tree) = model.tree() else {
        return Err("document has no <body>".to_string());
    };

    let Some(handle) = model.locate(location) else {
        println!("{location}: root");
        return Ok(());
    };

    println!("Row: {}", model.data(handle, Role::Display).unwrap_or_default());
    if let Some(resolved) = tree.location_of(handle.node()) {
        println!("Location: {resolved}");
    }
    match tree.selector_path(doc, handle.node()) {
        Some(path) => println!("Selector: {path}"),
        None => println!("Selector: (detached)"),
    }
    Ok(())
}
