//! Run the lambda calculus interpreter from the command line.
//!
//! Example usage:
//!
//!     cargo run -- run --src-filepath programs/church_one.lc
//!     cargo run -- repl
//!     cargo run -- play --solutions-dir solutions/

use clap::Parser;
use lambda_game::end_to_end::{run_interpreter, InterpreterConfig};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let interpreter_config = InterpreterConfig::parse();

    let interpreter_result = run_interpreter(&interpreter_config);

    match interpreter_result {
        Ok(execution_result) => {
            if !execution_result.is_empty() {
                println!("{}", execution_result);
            }
        }

        Err(run_error) => {
            println!("{}", run_error);
        }
    }
}
