//! file: cli/src/main.rs
//! description: command-line driver for the syc compiler middle end.
//!
//! Reads a source file (or standard input), runs parsing and lowering, and
//! prints the requested dump. Exit status is 0 on success and non-zero on
//! the first syntax or semantic error. Debug builds additionally print the
//! AST, the symbol table, and the textual IR.
//!
use std::io::Read;
use std::io::Write;

use clap::{Arg, Command};
use console::style;
use log::{Level, error};
use syc_core::Session;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let lvl = match record.level() {
                Level::Error => style("error").red().bold(),
                Level::Warn => style("warn").yellow().bold(),
                Level::Info => style("info").green().bold(),
                Level::Debug => style("debug").cyan(),
                Level::Trace => style("trace").magenta(),
            };
            writeln!(buf, "{}: {}", lvl, record.args())
        })
        .init();

    let matches = Command::new("syc")
        .version("0.1.0")
        .about("Compiler middle end for a small C-like language")
        .arg(
            Arg::new("file")
                .help("Source file to compile (standard input when omitted)")
                .index(1),
        )
        .arg(
            Arg::new("dump")
                .help("Print a compilation stage")
                .short('d')
                .long("dump")
                .value_parser(["ast", "symbols", "ir"])
                .value_name("STAGE"),
        )
        .arg(
            Arg::new("json")
                .help("Dump the stage as JSON where available")
                .long("json")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("output")
                .help("Write the textual IR to a file")
                .short('o')
                .long("output")
                .value_name("FILE"),
        )
        .get_matches();

    let (source, module_name) = match read_source(matches.get_one::<String>("file")) {
        Ok(v) => v,
        Err(err) => {
            error!("{}", err);
            std::process::exit(1);
        }
    };

    let mut session = match Session::new() {
        Ok(s) => s,
        Err(err) => {
            error!("{}", err);
            std::process::exit(1);
        }
    };
    if let Err(err) = session.parse(&source) {
        error!("{}", err);
        std::process::exit(1);
    }

    let module = session.lower(&module_name);

    #[cfg(debug_assertions)]
    {
        if let Some(ast) = session.ast() {
            println!("--- Abstract Syntax Tree ---");
            println!("{}", ast);
        }
        println!("--- Symbol Table ---");
        print_symbol_table(&session);
        println!("--- Generated IR ---");
        println!("{}", module);
    }

    let as_json = matches.get_flag("json");
    match matches.get_one::<String>("dump").map(String::as_str) {
        Some("ast") => {
            if let Some(ast) = session.ast() {
                if as_json {
                    match serde_json::to_string_pretty(ast) {
                        Ok(text) => println!("{}", text),
                        Err(err) => error!("serializing AST failed: {}", err),
                    }
                } else {
                    println!("{}", ast);
                }
            }
        }
        Some("symbols") => {
            if as_json {
                let symbols: Vec<_> = session.symbols.iter().collect();
                match serde_json::to_string_pretty(&symbols) {
                    Ok(text) => println!("{}", text),
                    Err(err) => error!("serializing symbol table failed: {}", err),
                }
            } else {
                print_symbol_table(&session);
            }
        }
        Some("ir") => println!("{}", module),
        _ => {}
    }

    if let Some(path) = matches.get_one::<String>("output") {
        if let Err(err) = std::fs::write(path, module.to_string()) {
            error!("writing '{}' failed: {}", path, err);
            std::process::exit(1);
        }
    }
}

/// Read the source text and derive a module name from the file stem.
fn read_source(path: Option<&String>) -> Result<(String, String), std::io::Error> {
    match path {
        Some(path) => {
            let source = std::fs::read_to_string(path)?;
            let name = std::path::Path::new(path)
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("main")
                .to_string();
            Ok((source, name))
        }
        None => {
            let mut source = String::new();
            std::io::stdin().read_to_string(&mut source)?;
            Ok((source, "main".to_string()))
        }
    }
}

fn print_symbol_table(session: &Session) {
    let mut table = comfy_table::Table::new();
    table.set_header(vec!["ID", "Name", "Kind", "Data Type", "Line", "Scope"]);
    for sym in session.symbols.iter() {
        table.add_row(vec![
            sym.id.to_string(),
            sym.name.clone(),
            sym.kind_name().to_string(),
            sym.data_type.name().to_string(),
            sym.lineno.to_string(),
            sym.scope_level.to_string(),
        ]);
    }
    println!("{table}");
}
