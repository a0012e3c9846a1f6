use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};
use memmap2::Mmap;

use rox::ast_printer::AstPrinter;
use rox::parser::Parser;
use rox::scanner::{scan_tokens, Scanner};
use rox::Lox;

/// Exit code for scan, parse and resolve errors.
const EXIT_SYNTAX: i32 = 65;

/// Exit code for runtime errors.
const EXIT_RUNTIME: i32 = 70;

#[derive(ClapParser, Debug)]
#[command(version, about = "Lox language interpreter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Commands,

    /// Enable logging to app.log
    #[arg(long, global = true)]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes input from a file, printing each token
    Tokenize {
        filename: PathBuf,

        /// Print one JSON object per token instead of the plain format
        #[arg(long)]
        json: bool,
    },

    /// Parses a file and prints the syntax tree of every statement
    Parse { filename: PathBuf },

    /// Runs a file as a Lox program
    Run { filename: PathBuf },

    /// Starts an interactive prompt; globals persist between lines
    Repl,
}

/// Reads a source file through a memory map.
fn read_source(filename: &Path) -> Result<String> {
    info!("Reading file: {:?}", filename);

    let file = File::open(filename).context(format!("Failed to open file {:?}", filename))?;
    let len: u64 = file
        .metadata()
        .context(format!("Failed to stat file {:?}", filename))?
        .len();

    // Mapping a zero-length file fails on some platforms.
    if len == 0 {
        return Ok(String::new());
    }

    // SAFETY: the map is read once and copied before the file could change.
    let map = unsafe { Mmap::map(&file) }.context(format!("Failed to map file {:?}", filename))?;

    let source: String = std::str::from_utf8(&map)
        .context(format!("File {:?} is not valid UTF-8", filename))?
        .to_owned();

    info!("Read {} bytes from {:?}", len, filename);

    Ok(source)
}

fn init_logger() -> Result<()> {
    let log_file = File::create("app.log").context("Failed to create app.log")?;

    Builder::new()
        .format(|buf, record| {
            // Strip 'rox::' from module path
            let module = record
                .module_path()
                .unwrap_or("<unnamed>")
                .strip_prefix("rox::")
                .unwrap_or(record.module_path().unwrap_or("<unnamed>"));
            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug)
        .parse_default_env() // RUST_LOG overrides the default level
        .init();

    info!("Logger initialized, writing to app.log");
    Ok(())
}

fn tokenize(filename: &Path, json: bool) -> Result<i32> {
    let source: String = read_source(filename)?;
    let mut tokenized: bool = true;

    for item in Scanner::new(&source) {
        match item {
            Ok(token) if json => println!("{}", serde_json::to_string(&token)?),

            Ok(token) => println!("{}", token),

            Err(e) => {
                tokenized = false;
                eprintln!("{}", e);
            }
        }
    }

    Ok(if tokenized { 0 } else { EXIT_SYNTAX })
}

fn parse(filename: &Path) -> Result<i32> {
    let source: String = read_source(filename)?;

    let (tokens, lex_errors) = scan_tokens(&source);
    let (statements, parse_errors) = Parser::new(&tokens).parse();

    let mut failed: bool = false;
    for e in lex_errors.iter().chain(parse_errors.iter()) {
        failed = true;
        eprintln!("{}", e);
    }

    if failed {
        return Ok(EXIT_SYNTAX);
    }

    let printer = AstPrinter;
    for stmt in &statements {
        println!("{}", printer.print_stmt(stmt));
    }

    Ok(0)
}

fn run(filename: &Path) -> Result<i32> {
    let source: String = read_source(filename)?;
    debug!("Provided input:\n{}", source);

    let mut lox = Lox::new();
    lox.run(&source);

    if lox.had_error() {
        Ok(EXIT_SYNTAX)
    } else if lox.had_runtime_error() {
        Ok(EXIT_RUNTIME)
    } else {
        Ok(0)
    }
}

fn repl() -> Result<i32> {
    let mut lox = Lox::new();
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        io::stdout().flush().context("Failed to flush prompt")?;

        let Some(line) = lines.next() else {
            break;
        };
        let line: String = line.context("Failed to read from stdin")?;

        lox.run(&line);
        lox.reset_errors();
    }

    println!();
    Ok(0)
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    if args.log {
        init_logger()?;
    } else {
        // Minimal logger so log macros have a sink.
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    info!("CLI arguments: {:?}", args);

    let code: i32 = match args.commands {
        Commands::Tokenize { filename, json } => tokenize(&filename, json)?,
        Commands::Parse { filename } => parse(&filename)?,
        Commands::Run { filename } => run(&filename)?,
        Commands::Repl => repl()?,
    };

    info!("Exiting with code {}", code);

    if code != 0 {
        std::process::exit(code);
    }

    Ok(())
}
