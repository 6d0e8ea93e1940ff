//! Entry points for parsing and evaluating source text, plus the code to
//! configure and run the interpreter from the command line.

use std::collections::HashMap;
use std::fs;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::closure_impl::closure_ast::ExprNode;
use crate::closure_impl::closure_execution::{eval_expr, Closure, Environment, EvalError};
use crate::closure_impl::closure_recursive_descent_parsing::{parse_recursive_descent, ParseError};
use crate::levels::{play_curriculum, Progress, LEVELS};
use crate::lexical_analysis::{run_lexical_analysis, LexError};

/// Errors produced while handling one piece of source text. Parse and eval
/// errors are the user's to fix; anything else is an interpreter fault.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InterpreterError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("eval error: {0}")]
    Eval(#[from] EvalError),

    #[error("internal error: {0}")]
    Internal(#[from] LexError),
}

impl InterpreterError {
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::Parse(_) | Self::Eval(_))
    }
}

/// Parses source text into a single expression.
pub fn parse(program_str: &str) -> Result<ExprNode, InterpreterError> {
    let tokens = run_lexical_analysis(program_str, true)?;
    Ok(parse_recursive_descent(&tokens)?)
}

/// Parses source text and evaluates it under `env`.
pub fn evaluate(program_str: &str, env: &Environment) -> Result<Closure, InterpreterError> {
    let expr_node = parse(program_str)?;
    Ok(eval_expr(&expr_node, env)?)
}

/// Config for the interpreter. Instantiate via `InterpreterConfig::parse()`.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct InterpreterConfig {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Evaluate the expression in a source file and print its rendering.
    Run {
        /// The input filepath to run on.
        #[arg(short, long)]
        src_filepath: PathBuf,
    },

    /// Evaluate expressions read from standard input, one per line.
    Repl,

    /// List the levels of the curriculum.
    Levels,

    /// Judge the solutions in a directory against the curriculum, in order.
    /// Each level's solution is read from `<builtin_name>.lc`.
    Play {
        #[arg(short = 'd', long)]
        solutions_dir: PathBuf,
    },
}

/// Errors that may be thrown when running the interpreter.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("Interpreter configuration error: {0}")]
    ConfigError(String),

    #[error("Input file error: {0}")]
    InputFileError(#[from] std::io::Error),

    #[error("{0}")]
    Interpreter(#[from] InterpreterError),
}

/// Evaluates each non-blank line of `input` under an empty environment and
/// writes the result or the error to `output`.
pub fn run_repl(input: impl BufRead, mut output: impl Write) -> Result<(), RunError> {
    let env = Environment::new();

    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        match evaluate(&line, &env) {
            Ok(closure) => writeln!(output, "< {}", closure)?,
            Err(interpreter_error) => {
                if interpreter_error.is_user_error() {
                    debug!(%interpreter_error, "repl input rejected");
                } else {
                    warn!(%interpreter_error, "repl input hit an interpreter fault");
                }
                writeln!(output, "{}", interpreter_error)?;
            }
        }
    }

    Ok(())
}

/// Evaluates the expression stored in a source file.
pub fn run_source_file(src_filepath: &Path) -> Result<String, RunError> {
    let program_string = fs::read_to_string(src_filepath)?;
    let closure = evaluate(&program_string, &Environment::new())?;

    Ok(closure.to_string())
}

/// Lists the curriculum, one level per line.
pub fn list_levels() -> String {
    LEVELS
        .iter()
        .enumerate()
        .map(|(level_idx, level)| format!("{}: {} ({})", level_idx, level.title, level.builtin_name))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Reads `<builtin_name>.lc` for every level that has one in `solutions_dir`.
fn read_solutions(solutions_dir: &Path) -> Result<HashMap<String, String>, RunError> {
    if !solutions_dir.is_dir() {
        return Err(RunError::ConfigError(format!(
            "{} is not a directory",
            solutions_dir.display()
        )));
    }

    let mut solutions = HashMap::new();

    for level in LEVELS.iter() {
        let solution_path = solutions_dir.join(format!("{}.lc", level.builtin_name));
        if solution_path.is_file() {
            solutions.insert(
                String::from(level.builtin_name),
                fs::read_to_string(solution_path)?,
            );
        }
    }

    Ok(solutions)
}

/// Judges the solutions in `solutions_dir` and describes how far they got.
pub fn run_play(solutions_dir: &Path) -> Result<String, RunError> {
    let solutions = read_solutions(solutions_dir)?;
    let (progress, solved) = play_curriculum(&LEVELS, &solutions)?;

    info!(solved = solved.len(), "curriculum judged");

    let summary = match progress {
        Progress::Completed => format!("All {} levels solved.", LEVELS.len()),

        Progress::Unattempted { level_idx } => {
            let level = &LEVELS[level_idx];
            format!(
                "Level {} ({}) has no solution yet: write {}.lc.",
                level_idx, level.title, level.builtin_name
            )
        }

        Progress::Rejected { level_idx, message } => format!(
            "Level {} ({}) rejected: {}",
            level_idx, LEVELS[level_idx].title, message
        ),

        Progress::Failed { level_idx, report } => {
            let mut lines = vec![format!(
                "Level {} ({}) failed:",
                level_idx, LEVELS[level_idx].title
            )];
            lines.extend(report.failures().map(|failure| failure.to_string()));
            lines.join("\n")
        }
    };

    Ok(summary)
}

/// Run the interpreter given an interpreter config. The REPL writes its
/// output directly and returns an empty string.
pub fn run_interpreter(config: &InterpreterConfig) -> Result<String, RunError> {
    match &config.command {
        Command::Run { src_filepath } => run_source_file(src_filepath),

        Command::Repl => {
            let stdin = std::io::stdin();
            run_repl(stdin.lock(), std::io::stdout().lock())?;
            Ok(String::new())
        }

        Command::Levels => Ok(list_levels()),

        Command::Play { solutions_dir } => run_play(solutions_dir),
    }
}
