//! This crate contains a call-by-value lambda calculus interpreter with
//! closures, and the level curriculum of a small teaching game built on it.

pub mod closure_impl;
pub mod end_to_end;
pub mod levels;
pub mod lexical_analysis;
