use clap::{Parser, Subcommand};
use gauge_lang::cli::{self, CliError, EvalOptions};
use std::io::{self, Read};

#[derive(Parser)]
#[command(name = "gauge")]
#[command(about = "Gauge - A stack-based query language for time-series metric expressions")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a gauge program and print the resulting stack
    Eval {
        /// The program to evaluate (reads from stdin if not provided)
        program: Option<String>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,
    },

    /// List every word in the standard dictionary
    Words,

    /// Show documentation for a specific word
    Doc {
        /// Word name, with or without the leading ':'
        word: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Eval { program, pretty } => run_eval(program, pretty),
        Commands::Words => match cli::list_words() {
            Ok(listing) => {
                print!("{}", listing);
                Ok(())
            }
            Err(e) => Err(e),
        },
        Commands::Doc { word } => match cli::word_doc(&word) {
            Ok(doc) => {
                println!("{}", doc);
                Ok(())
            }
            Err(e) => Err(e),
        },
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run_eval(program: Option<String>, pretty: bool) -> Result<(), CliError> {
    let program = match program {
        Some(p) => p,
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer.trim().to_string()
        }
        None => return Err(CliError::NoProgram),
    };
    if program.is_empty() {
        return Err(CliError::NoProgram);
    }

    let options = EvalOptions { program, pretty };
    println!("{}", cli::execute_eval(&options)?);
    Ok(())
}
