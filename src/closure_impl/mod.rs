//! Parser and evaluator that represent programs as a tree of expression nodes
//! and runtime values as closures over copy-on-write environments.

pub mod closure_ast;
pub mod closure_execution;
pub mod closure_recursive_descent_parsing;
pub mod closure_reduction;
