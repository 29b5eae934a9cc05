use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};

use rubel::ast_printer::AstPrinter;
use rubel::interpreter::{Interpreter, RuntimeConfig};
use rubel::parser::parse_source;
use rubel::scanner::Scanner;
use rubel::scope::DEFAULT_SCOPE_DEPTH;

#[derive(ClapParser, Debug)]
#[command(version, about = "Rubel language interpreter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Commands,

    /// Enable logging to rubel.log
    #[arg(long, global = true)]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes input from a file, printing each token
    Tokenize { filename: Option<PathBuf> },

    /// Parses a script and prints its AST
    Parse {
        filename: Option<PathBuf>,

        /// Print the AST as JSON instead of prefix form
        #[arg(long)]
        json: bool,
    },

    /// Runs a script
    Run {
        filename: Option<PathBuf>,

        /// Maximum number of active scopes
        #[arg(long, default_value_t = DEFAULT_SCOPE_DEPTH)]
        max_depth: usize,
    },
}

/// Reads the contents of a file as UTF-8 text
fn read_file(filename: &Path) -> Result<String> {
    info!("Reading file: {:?}", filename);
    let file = File::open(filename).context(format!("Failed to open file {:?}", filename))?;
    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();

    let bytes = reader
        .read_to_end(&mut buf)
        .context(format!("Failed to read file {:?}", filename))?;

    info!("Read {} bytes from {:?}", bytes, filename);

    String::from_utf8(buf).context(format!("File {:?} is not valid UTF-8", filename))
}

fn script_name(filename: &Path) -> String {
    filename
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "main".to_string())
}

fn init_logger() -> Result<()> {
    let log_file = File::create("rubel.log").context("Failed to create rubel.log")?;

    Builder::new()
        .format(|buf, record| {
            // Strip 'rubel::' from module path
            let module = record
                .module_path()
                .unwrap_or("<unnamed>")
                .strip_prefix("rubel::")
                .unwrap_or(record.module_path().unwrap_or("<unnamed>"));
            writeln!(
                buf,
                "{} [{}:{}] - {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug)
        .init();

    info!("Logger initialized, writing to rubel.log");
    Ok(())
}

fn no_input(command: &str) -> ! {
    info!("No filepath provided for {}", command);
    println!("No input filepath was provided. Exiting...");
    std::process::exit(0);
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    if args.log {
        init_logger()?;
    } else {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    info!("CLI arguments: {:?}", args);

    match args.commands {
        Commands::Tokenize { filename } => {
            let Some(filename) = filename else {
                no_input("Tokenize");
            };

            info!("Running Tokenize subcommand");
            let source = read_file(&filename)?;
            let mut tokenized = true;

            for token in Scanner::new(&source) {
                match token {
                    Ok(token) => println!("{}", token),

                    Err(e) => {
                        tokenized = false;
                        debug!("Tokenization debug: {}", e);
                        eprintln!("{}", e);
                    }
                }
            }

            if !tokenized {
                debug!("Tokenization failed, exiting with code 65");
                std::process::exit(65);
            }

            info!("Tokenization completed successfully");
        }

        Commands::Parse { filename, json } => {
            let Some(filename) = filename else {
                no_input("Parse");
            };

            info!("Running Parse subcommand");
            let source = read_file(&filename)?;

            match parse_source(&script_name(&filename), &source) {
                Ok(script) => {
                    if json {
                        let rendered = serde_json::to_string_pretty(&script)
                            .context("Failed to serialize AST")?;
                        println!("{}", rendered);
                    } else {
                        println!("{}", AstPrinter::script(&script));
                    }
                }

                Err(e) => {
                    debug!("Parse debug: {}", e);
                    eprintln!("{}", e);
                    std::process::exit(65);
                }
            }

            info!("Parse subcommand completed");
        }

        Commands::Run {
            filename,
            max_depth,
        } => {
            let Some(filename) = filename else {
                no_input("Run");
            };

            info!("Running Run subcommand");
            let source = read_file(&filename)?;

            let script = match parse_source(&script_name(&filename), &source) {
                Ok(script) => script,

                Err(e) => {
                    debug!("Parse debug: {}", e);
                    eprintln!("{}", e);
                    std::process::exit(65);
                }
            };

            info!("Parsed {} statements", script.len());

            let config = RuntimeConfig {
                scope_depth: max_depth,
                ..RuntimeConfig::default()
            };

            let mut interpreter = Interpreter::with_config(&script, config);

            interpreter
                .load_standard_groups()
                .context("Failed to load native function groups")?;

            if let Err(e) = interpreter.run() {
                debug!("Runtime debug: {}", e);
                eprintln!("{}", e);
                std::process::exit(70);
            }

            info!("Program executed successfully");
        }
    }

    Ok(())
}
