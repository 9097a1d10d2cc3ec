use std::{env, fs, fs::File};

use anyhow::{Context, Result, bail};
use log::{error, info};
use simplelog::{LevelFilter, WriteLogger};

use orgtoc::config::TocConfig;
use orgtoc::diagram::{self, ColorScheme, DiagramConfig};
use orgtoc::panic_handler;
use orgtoc::parsing::document::ExportedDocument;
use orgtoc::session_storage::FileSessionStorage;
use orgtoc::{TocController, TocNode, decorate};

const USAGE: &str = "\
Usage:
  orgtoc decorate <input.html> [-o <output.html>] [--session <state.json>] [--config <config.json>]
  orgtoc outline <input.html> [--config <config.json>]
  orgtoc diagram-config [--dark]";

fn main() -> Result<()> {
    // Initialize logging with html5ever DEBUG logs filtered out
    WriteLogger::init(
        LevelFilter::Debug,
        simplelog::ConfigBuilder::new()
            .set_max_level(LevelFilter::Debug)
            .add_filter_ignore_str("html5ever")
            .build(),
        File::create("orgtoc.log")?,
    )?;
    panic_handler::initialize_panic_handler();

    let args: Vec<String> = env::args().skip(1).collect();
    let result = match args.first().map(|s| s.as_str()) {
        Some("decorate") => run_decorate(&args[1..]),
        Some("outline") => run_outline(&args[1..]),
        Some("diagram-config") => run_diagram_config(&args[1..]),
        _ => {
            println!("{USAGE}");
            return Ok(());
        }
    };

    if let Err(err) = &result {
        error!("orgtoc failed: {err:?}");
    }
    result
}

/// Positional input plus `--flag value` options
struct CommandArgs {
    input: Option<String>,
    output: Option<String>,
    session: Option<String>,
    config: Option<String>,
    dark: bool,
}

fn parse_args(args: &[String]) -> Result<CommandArgs> {
    let mut parsed = CommandArgs {
        input: None,
        output: None,
        session: None,
        config: None,
        dark: false,
    };

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-o" | "--output" => {
                parsed.output = Some(iter.next().context("Missing value for --output")?.clone())
            }
            "--session" => {
                parsed.session = Some(iter.next().context("Missing value for --session")?.clone())
            }
            "--config" => {
                parsed.config = Some(iter.next().context("Missing value for --config")?.clone())
            }
            "--dark" => parsed.dark = true,
            other if other.starts_with('-') => bail!("Unknown option {other}\n{USAGE}"),
            other => {
                if parsed.input.is_some() {
                    bail!("Unexpected argument {other}\n{USAGE}");
                }
                parsed.input = Some(other.to_string());
            }
        }
    }
    Ok(parsed)
}

fn read_document(args: &CommandArgs) -> Result<(String, ExportedDocument)> {
    let input = args.input.clone().context(USAGE)?;
    let html =
        fs::read_to_string(&input).with_context(|| format!("Failed to read {input}"))?;
    let document = ExportedDocument::parse(&html)?;
    Ok((input, document))
}

fn run_decorate(args: &[String]) -> Result<()> {
    let args = parse_args(args)?;
    let (input, document) = read_document(&args)?;
    let config = TocConfig::load_or_default(args.config.as_deref());
    let storage = FileSessionStorage::load_or_ephemeral(args.session.as_deref());

    info!("Decorating {input}");
    match decorate(&document, Box::new(storage), config) {
        Some(controller) => info!(
            "TOC decorated: {} entries, {} fold controls, {} collapsed",
            controller.tree().links().len(),
            controller.tree().branch_count(),
            controller.tree().collapsed_indices().len()
        ),
        None => info!("No table of contents found in {input}"),
    }

    let cleaned = diagram::clean_diagram_blocks(&document);
    if cleaned > 0 {
        info!("Cleaned Org markers from {cleaned} diagram blocks");
    }

    let html = document.to_html()?;
    match &args.output {
        Some(output) => {
            fs::write(output, html).with_context(|| format!("Failed to write {output}"))?
        }
        None => print!("{html}"),
    }
    Ok(())
}

fn run_outline(args: &[String]) -> Result<()> {
    let args = parse_args(args)?;
    let (input, document) = read_document(&args)?;
    let config = TocConfig::load_or_default(args.config.as_deref());

    let Some(controller) =
        TocController::from_document(&document, Box::new(FileSessionStorage::ephemeral()), config)
    else {
        println!("{input}: no table of contents");
        return Ok(());
    };

    let tree = controller.tree();
    println!("{}", tree.title);
    let mut fold_index = 0;
    print_nodes(tree.roots(), &mut fold_index);
    println!(
        "\n{} headings observed, {} fold controls",
        controller.observed_headings().len(),
        tree.branch_count()
    );
    Ok(())
}

fn print_nodes(nodes: &[TocNode], fold_index: &mut usize) {
    for node in nodes {
        let indent = "  ".repeat(node.depth() + 1);
        let marker = if node.is_branch() {
            let marker = format!("[{fold_index}]");
            *fold_index += 1;
            marker
        } else {
            "   ".to_string()
        };
        let anchor = node
            .anchor()
            .map(|anchor| format!(" #{anchor}"))
            .unwrap_or_default();
        println!("{indent}{marker} {}{anchor}", node.label());
        print_nodes(node.children(), fold_index);
    }
}

fn run_diagram_config(args: &[String]) -> Result<()> {
    let args = parse_args(args)?;
    let scheme = if args.dark {
        ColorScheme::Dark
    } else {
        ColorScheme::Light
    };
    println!("{}", DiagramConfig::for_scheme(scheme).to_json_pretty()?);
    Ok(())
}
