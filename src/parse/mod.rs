mod error;
mod grammar;
mod parser;

pub use error::ParseError;
pub use parser::parse_rule;

/// Split a rule definition line into tokens.
///
/// A token is either a single-quoted string, in which a backslash escapes the
/// following character, or a run of non-whitespace characters. Quoted tokens
/// are returned with their quotes and backslashes intact.
///
/// # Errors
///
/// Returns [`ParseError::Malformed`] if the line cannot be tokenized.
pub fn tokenize(line: &str) -> Result<Vec<&str>, ParseError> {
    use winnow::Parser;
    grammar::tokens
        .parse(line)
        .map_err(|e| ParseError::malformed(e.to_string()))
}
