//! Splits lambda calculus source text into a flat stream of tokens.

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;
use tracing::debug;

// The different classes of tokens that compose the language.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum TokenClass {
    LeftParen,
    RightParen,
    Lambda,
    Dot,
    Identifier,
    Whitespace,
}

/// Represents a single token of the language.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Token {
    pub token_class: TokenClass,
    pub token_text: String,
}

/// Raised when no token rule matches the remaining input. The identifier rule
/// accepts every character the other rules reject, so this indicates a broken
/// rule table rather than bad user input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LexError {
    #[error("no token rule matches the input at byte offset {0}")]
    NoMatchingRule(usize),
}

// Represents how to recognize a token class.
#[derive(Debug)]
struct TokenRule {
    token_class: TokenClass,
    regex: Regex,
}

// Token rules in priority order. Every pattern is anchored to the start of
// the remaining input and matches at least one character.
lazy_static! {
    static ref TOKEN_RULES: Vec<TokenRule> = vec![
        TokenRule {
            token_class: TokenClass::Whitespace,
            regex: Regex::new(r"^\s+").expect("Unable to compile Whitespace rule regex."),
        },
        TokenRule {
            token_class: TokenClass::LeftParen,
            regex: Regex::new(r"^\(").expect("Unable to compile LeftParen rule regex."),
        },
        TokenRule {
            token_class: TokenClass::RightParen,
            regex: Regex::new(r"^\)").expect("Unable to compile RightParen rule regex."),
        },
        TokenRule {
            token_class: TokenClass::Lambda,
            regex: Regex::new(r"^\\").expect("Unable to compile Lambda rule regex."),
        },
        TokenRule {
            token_class: TokenClass::Dot,
            regex: Regex::new(r"^\.").expect("Unable to compile Dot rule regex."),
        },
        TokenRule {
            token_class: TokenClass::Identifier,
            regex: Regex::new(r"^[^.()\\\s]+").expect("Unable to compile Identifier rule regex."),
        },
    ];
}

// Finds the first rule (in priority order) that matches at the start of the
// input string, along with the length of the match.
fn get_first_matching_rule(input_str: &str) -> Option<(&'static TokenRule, usize)> {
    TOKEN_RULES.iter().find_map(|token_rule| {
        token_rule
            .regex
            .find(input_str)
            .map(|match_obj| (token_rule, match_obj.end()))
    })
}

/// Given a string, returns the vector of tokens that comprise that string, in
/// input order. Whitespace tokens are dropped when `discard_whitespace` is set.
pub fn run_lexical_analysis(
    program_str: &str,
    discard_whitespace: bool,
) -> Result<Vec<Token>, LexError> {
    let mut curr_idx: usize = 0;
    let mut out = Vec::new();

    while curr_idx < program_str.len() {
        let (token_rule, match_len) = get_first_matching_rule(&program_str[curr_idx..])
            .ok_or(LexError::NoMatchingRule(curr_idx))?;

        if !(discard_whitespace && token_rule.token_class == TokenClass::Whitespace) {
            out.push(Token {
                token_class: token_rule.token_class,
                token_text: String::from(&program_str[curr_idx..curr_idx + match_len]),
            });
        }

        curr_idx += match_len;
    }

    debug!(token_count = out.len(), "lexical analysis complete");

    Ok(out)
}
