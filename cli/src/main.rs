//! Parse a grammar-definition document and print the rules it defines.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Level};

mod logging;

use logging::LogFormat;

const EXAMPLE_GRAMMAR: &str = "
    Sum     -> Sum     [+-] Product | Product
    Product -> Product [*/] Factor | Factor
    Factor  -> '(' Sum ')' | Number
    Number  -> [0-9] Number | [0-9]
";

#[derive(Parser, Debug)]
#[command(name = "bnf-parse", about = "Parse a BNF grammar definition", version)]
struct Cli {
    /// Grammar file to parse, `-` for stdin. Parses a built-in arithmetic
    /// grammar when omitted.
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Print the parsed structure instead of grammar text.
    #[arg(long)]
    debug: bool,

    /// Log level used when RUST_LOG is unset.
    #[arg(long, default_value = "warn")]
    log_level: Level,

    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    log_format: LogFormat,
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.log_level, cli.log_format);

    match run(&cli) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(2);
        }
    }
}

/// Returns false when the document has a syntax error.
fn run(cli: &Cli) -> Result<bool> {
    let source = read_source(cli.file.as_deref())?;

    match bnf::parse(&source) {
        Ok(grammar) => {
            info!(target: "bnf::cli", rules = grammar.len(), "parsed grammar");
            if cli.debug {
                println!("{:#?}", grammar);
            } else {
                print!("{}", grammar);
            }
            Ok(true)
        }
        Err(err) => {
            eprint!("{}", bnf::report::render(&err, &source));
            Ok(false)
        }
    }
}

fn read_source(path: Option<&Path>) -> Result<String> {
    match path {
        None => Ok(EXAMPLE_GRAMMAR.to_owned()),
        Some(p) if p == Path::new("-") => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("read grammar from stdin")?;
            Ok(buf)
        }
        Some(p) => fs::read_to_string(p)
            .with_context(|| format!("read grammar file: {}", p.display())),
    }
}
