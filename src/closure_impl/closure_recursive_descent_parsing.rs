//! Recursive descent parser that builds a single lambda calculus expression
//! from a vector of tokens, using one token of lookahead.
//!
//! Grammar:
//!
//! ```text
//! expr -> IDENTIFIER
//!       | '(' '\' IDENTIFIER '.' expr ')'
//!       | '(' expr expr ')'
//! ```

use thiserror::Error;
use tracing::debug;

use crate::closure_impl::closure_ast::ExprNode;
use crate::lexical_analysis::{Token, TokenClass};

const EXPECTED_IDENTIFIER: &str = "identifier";
const EXPECTED_EXPR_START: &str = "identifier or '('";
const EXPECTED_END_OF_INPUT: &str = "end-of-input";

/// Represents a parsing error. `expected` names what the grammar required at
/// the failing position.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("expected {expected}, got '{found}'")]
    UnexpectedToken { expected: String, found: String },

    #[error("expected {expected}, got end-of-input")]
    UnexpectedEndOfInput { expected: String },
}

// Builds the error for finding `found` (or nothing) where `expected` was due.
fn unexpected(expected: &str, found: Option<&Token>) -> ParseError {
    match found {
        Some(token) => ParseError::UnexpectedToken {
            expected: String::from(expected),
            found: token.token_text.clone(),
        },
        None => ParseError::UnexpectedEndOfInput {
            expected: String::from(expected),
        },
    }
}

/// Tries to parse a token of the requested class at tokens[start_idx].
fn try_token_class<'a>(
    tokens: &'a [Token],
    start_idx: usize,
    token_class: TokenClass,
    expected: &str,
) -> Result<(&'a Token, usize), ParseError> {
    match tokens.get(start_idx) {
        Some(token) if token.token_class == token_class => Ok((token, start_idx + 1)),
        found => Err(unexpected(expected, found)),
    }
}

/// Tries to parse the rest of a lambda, `[IDENTIFIER].[EXPR])`, after the
/// opening `(\` has been consumed.
fn try_lambda_rule(tokens: &[Token], start_idx: usize) -> Result<(ExprNode, usize), ParseError> {
    let (formal_param_token, start_idx) =
        try_token_class(tokens, start_idx, TokenClass::Identifier, EXPECTED_IDENTIFIER)?;
    let (_, start_idx) = try_token_class(tokens, start_idx, TokenClass::Dot, "'.'")?;
    let (fn_body, start_idx) = try_expr_rule(tokens, start_idx)?;
    let (_, start_idx) = try_token_class(tokens, start_idx, TokenClass::RightParen, "')'")?;

    Ok((
        ExprNode::fn_def(formal_param_token.token_text.as_str(), fn_body),
        start_idx,
    ))
}

/// Tries to parse the rest of an application, `[EXPR] [EXPR])`, after the
/// opening `(` has been consumed.
fn try_application_rule(
    tokens: &[Token],
    start_idx: usize,
) -> Result<(ExprNode, usize), ParseError> {
    let (fn_body, start_idx) = try_expr_rule(tokens, start_idx)?;
    let (actual_arg, start_idx) = try_expr_rule(tokens, start_idx)?;
    let (_, start_idx) = try_token_class(tokens, start_idx, TokenClass::RightParen, "')'")?;

    Ok((ExprNode::fn_app(fn_body, actual_arg), start_idx))
}

/// Tries to parse according to the production `expr`. After an opening
/// parenthesis, a lambda marker commits to the lambda rule and anything else
/// commits to the application rule.
fn try_expr_rule(tokens: &[Token], start_idx: usize) -> Result<(ExprNode, usize), ParseError> {
    match tokens.get(start_idx) {
        Some(token) if token.token_class == TokenClass::Identifier => Ok((
            ExprNode::var(token.token_text.as_str()),
            start_idx + 1,
        )),

        Some(token) if token.token_class == TokenClass::LeftParen => {
            match tokens.get(start_idx + 1) {
                Some(next) if next.token_class == TokenClass::Lambda => {
                    try_lambda_rule(tokens, start_idx + 2)
                }
                _ => try_application_rule(tokens, start_idx + 1),
            }
        }

        found => Err(unexpected(EXPECTED_EXPR_START, found)),
    }
}

/// Uses recursive descent to parse the given vector of tokens into a single
/// expression. Tokens left over after the expression are an error.
///
/// Assumes that the input token vector has discarded whitespace (i.e. it was
/// produced via run_lexical_analysis with `discard_whitespace = true`).
pub fn parse_recursive_descent(tokens: &[Token]) -> Result<ExprNode, ParseError> {
    let (expr_node, start_idx) = try_expr_rule(tokens, 0)?;

    if let Some(trailing) = tokens.get(start_idx) {
        return Err(unexpected(EXPECTED_END_OF_INPUT, Some(trailing)));
    }

    debug!(token_count = tokens.len(), "parsed expression");

    Ok(expr_node)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use crate::lexical_analysis::run_lexical_analysis;

    use super::*;

    fn parse_str(program_str: &str) -> Result<ExprNode, ParseError> {
        let program_tokens =
            run_lexical_analysis(program_str, true).expect("Lexing failed unexpectedly.");
        parse_recursive_descent(&program_tokens)
    }

    #[test]
    fn test_single_identifier() {
        assert_eq!(parse_str("  zero "), Ok(ExprNode::var("zero")));
    }

    #[test]
    fn test_simple_lambda() {
        let expected_output = ExprNode::fn_def("x", ExprNode::var("x"));

        assert_eq!(parse_str(r"(\x.x)"), Ok(expected_output));
    }

    #[test]
    fn test_application_of_lambdas() {
        let expected_output = ExprNode::fn_app(
            ExprNode::fn_def("x", ExprNode::var("x")),
            ExprNode::fn_def("y", ExprNode::var("y")),
        );

        assert_eq!(parse_str(r"((\x.x) (\y.y))"), Ok(expected_output));
    }

    // Applications are binary; nesting must be spelled out with parentheses.
    #[test]
    fn test_nested_application() {
        let expected_output = ExprNode::fn_app(
            ExprNode::fn_app(ExprNode::var("n"), ExprNode::var("f")),
            ExprNode::var("x"),
        );

        assert_eq!(parse_str("((n f) x)"), Ok(expected_output));
    }

    #[test]
    fn test_whitespace_is_insignificant() {
        let compact = parse_str(r"(\n.(\f.(\x.(f ((n f) x)))))");
        let spread = parse_str("(\n  \\ n .\n (\\f. (\\x .(f\t((n f) x)))))\n");

        assert!(compact.is_ok());
        assert_eq!(compact, spread);
    }

    #[rstest]
    #[case(r"(\x x)", "expected '.', got 'x'")]
    #[case("(a b", "expected ')', got end-of-input")]
    #[case("(a b c)", "expected ')', got 'c'")]
    #[case(r"(\(.x)", "expected identifier, got '('")]
    #[case(r"(\", "expected identifier, got end-of-input")]
    #[case(r"\x.x", r"expected identifier or '(', got '\'")]
    #[case(")", "expected identifier or '(', got ')'")]
    #[case(".", "expected identifier or '(', got '.'")]
    #[case("", "expected identifier or '(', got end-of-input")]
    #[case("(f)", "expected identifier or '(', got ')'")]
    #[case("a b", "expected end-of-input, got 'b'")]
    #[case(r"(\x.x))", "expected end-of-input, got ')'")]
    fn test_parse_errors(#[case] program_str: &str, #[case] expected_message: &str) {
        let parse_error = parse_str(program_str).expect_err("Parsing succeeded unexpectedly.");

        assert_eq!(parse_error.to_string(), expected_message);
    }

    #[test]
    fn test_error_variants() {
        assert_eq!(
            parse_str("(a b"),
            Err(ParseError::UnexpectedEndOfInput {
                expected: String::from("')'"),
            })
        );
        assert_eq!(
            parse_str(r"(\x x)"),
            Err(ParseError::UnexpectedToken {
                expected: String::from("'.'"),
                found: String::from("x"),
            })
        );
    }
}
