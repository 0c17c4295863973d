//! CLI logic for the gigo compiler.
//!
//! Input files are parsed, grouped by package in a [`PackageRegistry`] and
//! processed in order. Output is collected in full before it is written, so
//! a failing file never leaves partial output behind.

pub mod dump;
pub mod error_adapter;

mod args;
mod config;

pub use args::{Args, Command};

use std::{fs, io::Write};

use log::{debug, info};

use gigo::{Gigo, GigoError, NodeId, Tree, registry::PackageRegistry};

/// Run the gigo CLI application
///
/// # Arguments
///
/// * `args` - Command-line arguments
///
/// # Errors
///
/// Returns `GigoError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Syntax errors
/// - Template and mutation errors
pub fn run(args: &Args) -> Result<(), GigoError> {
    info!(
        command:? = args.command,
        files = args.files.len();
        "Processing sources"
    );

    let app_config = config::load_config(args.config.as_ref())?;
    let gigo = Gigo::new(app_config);

    let mut registry = PackageRegistry::new();
    for path in &args.files {
        let package = registry.add(gigo.parse_file(path)?);
        debug!(path = path.as_str(), package = package.as_str(); "File registered");
    }

    let mut out = String::new();
    for (package, trees) in registry.iter() {
        info!(package, files = trees.len(); "Processing package");
        for tree in trees {
            render(&gigo, args, tree, &mut out)?;
        }
    }

    match &args.output {
        Some(path) => {
            fs::write(path, &out)?;
            info!(output_file = path.as_str(); "Output written");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(out.as_bytes())?;
            stdout.flush()?;
        }
    }

    Ok(())
}

/// Append the output of `args.command` for `tree`. `gen` prints the
/// expanded tree, the other commands the tree as parsed.
fn render(gigo: &Gigo, args: &Args, tree: &Tree, out: &mut String) -> Result<(), GigoError> {
    let generated;
    let tree = if args.command.mutates() {
        generated = gigo.mutate(tree.clone())?;
        &generated
    } else {
        tree
    };

    let symbol = args.symbol.as_deref();
    match args.command {
        Command::Dump => render_symbol(tree, symbol, out, dump::dump),
        Command::Str | Command::Gen => render_symbol(tree, symbol, out, |tree, id| tree.text(id)),
    }
    Ok(())
}

/// Append the whole tree, or the first declaration named `symbol`.
fn render_symbol(
    tree: &Tree,
    symbol: Option<&str>,
    out: &mut String,
    show: impl Fn(&Tree, NodeId) -> String,
) {
    let Some(symbol) = symbol else {
        out.push_str(&show(tree, tree.root()));
        return;
    };

    match tree.find_symbols(symbol).first() {
        Some(&id) => {
            out.push_str(&show(tree, id));
            out.push('\n');
        }
        None => {
            debug!(symbol, origin:% = tree.origin(); "Symbol lookup is empty");
            out.push_str(&format!("No symbol found for {symbol}\n"));
        }
    }
}
