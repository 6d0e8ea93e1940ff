//! The level curriculum and the judge that checks a solution against a
//! level's tests.
//!
//! Each level asks for one builtin. Once a level is solved its closure is
//! bound under the builtin's name and later levels may refer to it.

use std::collections::HashMap;
use std::fmt::Display;

use lazy_static::lazy_static;
use tracing::{debug, info};

use crate::closure_impl::closure_execution::{apply_closure, Closure, Environment, EvalError};
use crate::end_to_end::{evaluate, InterpreterError};

/// One test of a level: the solution applied to `inputs`, left to right, must
/// equal `output`. All expressions are evaluated with the level's builtins.
#[derive(Debug, Clone)]
pub struct LevelTest {
    pub inputs: Vec<&'static str>,
    pub output: &'static str,
}

#[derive(Debug, Clone)]
pub struct Level {
    pub title: &'static str,
    pub description: &'static str,
    pub tests: Vec<LevelTest>,
    pub available_builtins: Vec<&'static str>,
    pub builtin_name: &'static str,
}

lazy_static! {
    pub static ref LEVELS: Vec<Level> = vec![
        Level {
            title: "Identity, please?",
            description: "Write the identity function. \
                The identity function takes one argument and produces it.",
            tests: vec![
                LevelTest {
                    inputs: vec![r"(\x.x)"],
                    output: r"(\x.x)",
                },
                LevelTest {
                    inputs: vec![r"(\y.y)"],
                    output: r"(\y.y)",
                },
            ],
            available_builtins: vec![],
            builtin_name: "identity",
        },
        Level {
            title: "Level zero",
            description: "Write the function corresponding to the Church numeral zero. \
                The zero function is a curried function taking two arguments, \
                and it returns the second argument.",
            tests: vec![LevelTest {
                inputs: vec![r"(\x.x)", r"(\y.y)"],
                output: r"(\y.y)",
            }],
            available_builtins: vec!["identity"],
            builtin_name: "zero",
        },
        Level {
            title: "Level n + 1",
            description: "Write the function add1. \
                The add1 function takes one argument, a Church numeral, \
                and it produces the successor of that numeral.",
            tests: vec![
                LevelTest {
                    inputs: vec!["zero"],
                    output: r"((\n.(\f.(\x.(f ((n f) x))))) zero)",
                },
                LevelTest {
                    inputs: vec![r"((\n.(\f.(\x.(f ((n f) x))))) zero)"],
                    output: r"((\n.(\f.(\x.(f ((n f) x))))) ((\n.(\f.(\x.(f ((n f) x))))) zero))",
                },
            ],
            available_builtins: vec!["identity", "zero"],
            builtin_name: "add1",
        },
    ];
}

/// The outcome of one failing level test, rendered for display. Builtin names
/// are kept symbolic in `expected` and `actual`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestFailure {
    pub test_idx: usize,
    pub inputs: Vec<String>,
    pub expected: String,
    pub actual: String,
}

impl Display for TestFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "test {}: inputs [{}]: expected {}, got {}",
            self.test_idx,
            self.inputs.join(", "),
            self.expected,
            self.actual
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestOutcome {
    Passed,
    Failed(TestFailure),
}

/// Verdicts for every test of one level, in test order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelReport {
    pub builtin_name: String,
    pub outcomes: Vec<TestOutcome>,
}

impl LevelReport {
    pub fn passed(&self) -> bool {
        self.outcomes
            .iter()
            .all(|outcome| *outcome == TestOutcome::Passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &TestFailure> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            TestOutcome::Passed => None,
            TestOutcome::Failed(failure) => Some(failure),
        })
    }
}

// Applies the solution to each input in turn.
fn apply_to_inputs(solution: &Closure, inputs: Vec<Closure>) -> Result<Closure, EvalError> {
    inputs
        .into_iter()
        .try_fold(solution.clone(), |result, input_value| {
            apply_closure(&result, input_value)
        })
}

/// Judges `solution_src` against `level`. The solution and the tests only see
/// the builtins from `solved` that the level makes available. Returns the
/// solution's closure alongside the report.
///
/// A solution that fails while being applied to a test's inputs fails that
/// test. Errors in the solution text itself, or in the level's own inputs and
/// outputs, are returned as `Err`.
pub fn judge_level(
    level: &Level,
    solution_src: &str,
    solved: &Environment,
) -> Result<(Closure, LevelReport), InterpreterError> {
    let scope = solved.restricted_to(&level.available_builtins);
    let solution = evaluate(solution_src, &scope)?;

    let mut outcomes = Vec::with_capacity(level.tests.len());

    for (test_idx, level_test) in level.tests.iter().enumerate() {
        let input_values = level_test
            .inputs
            .iter()
            .map(|input| evaluate(input, &scope))
            .collect::<Result<Vec<_>, _>>()?;
        let expected = evaluate(level_test.output, &scope)?;

        let actual = match apply_to_inputs(&solution, input_values) {
            Ok(actual) if actual == expected => None,
            Ok(actual) => Some(actual.render(&level.available_builtins)),
            Err(eval_error) => Some(InterpreterError::from(eval_error).to_string()),
        };

        let outcome = match actual {
            None => TestOutcome::Passed,
            Some(actual) => TestOutcome::Failed(TestFailure {
                test_idx,
                inputs: level_test.inputs.iter().map(|input| input.to_string()).collect(),
                expected: expected.render(&level.available_builtins),
                actual,
            }),
        };

        debug!(level = level.builtin_name, test_idx, ?outcome, "level test judged");
        outcomes.push(outcome);
    }

    Ok((
        solution,
        LevelReport {
            builtin_name: String::from(level.builtin_name),
            outcomes,
        },
    ))
}

/// How far a set of solutions gets through the curriculum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    Completed,
    Unattempted { level_idx: usize },
    Failed { level_idx: usize, report: LevelReport },
    /// The solution text itself does not parse or evaluate.
    Rejected { level_idx: usize, message: String },
}

/// Judges the levels in order, taking each level's solution from `solutions`
/// by builtin name. Stops at the first level that is missing a solution, is
/// rejected, or fails a test. Also returns the builtins solved so far. Only
/// internal faults are returned as `Err`.
pub fn play_curriculum(
    levels: &[Level],
    solutions: &HashMap<String, String>,
) -> Result<(Progress, Environment), InterpreterError> {
    let mut solved = Environment::new();

    for (level_idx, level) in levels.iter().enumerate() {
        let Some(solution_src) = solutions.get(level.builtin_name) else {
            return Ok((Progress::Unattempted { level_idx }, solved));
        };

        let (solution, report) = match judge_level(level, solution_src, &solved) {
            Ok(judged) => judged,
            Err(interpreter_error) if interpreter_error.is_user_error() => {
                let message = interpreter_error.to_string();
                return Ok((Progress::Rejected { level_idx, message }, solved));
            }
            Err(interpreter_error) => return Err(interpreter_error),
        };

        if !report.passed() {
            return Ok((Progress::Failed { level_idx, report }, solved));
        }

        info!(level = level.builtin_name, "level solved");
        solved = solved.extend(level.builtin_name, solution);
    }

    Ok((Progress::Completed, solved))
}
