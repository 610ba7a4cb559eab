use std::fmt::Display;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::Parser;
use crossterm::execute;
use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor};
use tarn::printer::parenthesize_stmt;
use tarn::{BlockErrorPolicy, Interpreter, InterpreterConfig, Output};

/// Runs a tarn script.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Script file to run.
    #[arg(required_unless_present = "eval", conflicts_with = "eval")]
    file: Option<PathBuf>,

    /// Run the given source text instead of a file.
    #[arg(short, long, value_name = "SOURCE")]
    eval: Option<String>,

    /// Print the token stream and exit.
    #[arg(long, conflicts_with = "ast")]
    tokens: bool,

    /// Print the parsed program as parenthesized expressions and exit.
    #[arg(long)]
    ast: bool,

    /// Abort on runtime errors raised inside blocks instead of skipping the rest of the block.
    #[arg(long)]
    strict: bool,
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .with(filter)
        .init();
}

fn report(label: &str, err: impl Display) {
    // Nothing sensible left to do if stderr is gone.
    let _ = execute!(
        io::stderr(),
        SetForegroundColor(Color::Red),
        SetAttribute(Attribute::Bold),
        Print(format!("{label}: ")),
        SetAttribute(Attribute::Reset),
        SetForegroundColor(Color::Red),
        Print(format!("{err}\n")),
        ResetColor,
    );
}

fn read_source(args: &Args) -> Result<String> {
    match (&args.file, &args.eval) {
        (_, Some(source)) => Ok(source.clone()),
        (Some(path), None) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read the source file {}", path.display())),
        (None, None) => bail!("Missing source code file path!"),
    }
}

fn dump_tokens(source: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    for token in tarn::scan(source) {
        let token = token.context("Lexing failed")?;
        writeln!(stdout, "{token}")?;
    }
    Ok(())
}

/// Returns whether the program ran cleanly.
fn run(args: &Args) -> Result<bool> {
    let source = read_source(args)?;
    if args.tokens {
        dump_tokens(&source)?;
        return Ok(true);
    }

    let program = tarn::parse(tarn::scan(&source));
    for err in &program.errors {
        report("Parsing error", err);
    }

    if args.ast {
        let mut stdout = io::stdout().lock();
        for statement in &program.statements {
            writeln!(stdout, "{}", parenthesize_stmt(statement))?;
        }
        return Ok(program.is_clean());
    }

    // Statements that parsed still run when others did not.
    let config = InterpreterConfig {
        block_errors: if args.strict {
            BlockErrorPolicy::Propagate
        } else {
            BlockErrorPolicy::Swallow
        },
    };
    let mut interpreter = Interpreter::with_config(config, Output::Stdout);
    if let Err(err) = interpreter.run(&program.statements) {
        report("Interpretation error", err);
        return Ok(false);
    }
    Ok(program.is_clean())
}

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            report("Error", format!("{err:#}"));
            ExitCode::FAILURE
        }
    }
}
