//! Command-line tokenizer.
//!
//! Splits on spaces. A `'` or `"` opens a quoted span and the next quote of
//! either kind closes it; the span (plus anything already accumulated in the
//! current token) becomes one token, even when empty.

use crate::error::ShellError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub name: String,
    pub args: Vec<String>,
}

fn is_quote(c: char) -> bool {
    c == '\'' || c == '"'
}

/// Tokenize `input`. Returns `Ok(None)` for blank input.
pub fn parse(input: &str) -> Result<Option<ParsedCommand>, ShellError> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }

    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in input.chars() {
        if is_quote(c) {
            if in_quotes {
                tokens.push(std::mem::take(&mut current));
            }
            in_quotes = !in_quotes;
        } else if in_quotes {
            current.push(c);
        } else if c == ' ' {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
        } else {
            current.push(c);
        }
    }

    if in_quotes {
        return Err(ShellError::UnclosedQuotes);
    }
    if !current.is_empty() {
        tokens.push(current);
    }

    let mut tokens = tokens.into_iter();
    Ok(tokens.next().map(|name| ParsedCommand {
        name,
        args: tokens.collect(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts(input: &str) -> (String, Vec<String>) {
        let cmd = parse(input).unwrap().unwrap();
        (cmd.name, cmd.args)
    }

    #[test]
    fn splits_on_runs_of_spaces() {
        let (name, args) = parts("ls    -l   -a  .");
        assert_eq!(name, "ls");
        assert_eq!(args, vec!["-l", "-a", "."]);
    }

    #[test]
    fn quoted_span_is_one_token() {
        let (name, args) = parts(r#"cd "My Documents""#);
        assert_eq!(name, "cd");
        assert_eq!(args, vec!["My Documents"]);
    }

    #[test]
    fn either_quote_closes_span() {
        let (_, args) = parts(r#"echo 'Hello World""#);
        assert_eq!(args, vec!["Hello World"]);
    }

    #[test]
    fn empty_quotes_yield_empty_token() {
        let (_, args) = parts(r#"touch """#);
        assert_eq!(args, vec![""]);
    }

    #[test]
    fn unclosed_quote_fails() {
        assert!(matches!(
            parse(r#"echo "unclosed quote"#),
            Err(ShellError::UnclosedQuotes)
        ));
    }

    #[test]
    fn blank_input_is_none() {
        assert_eq!(parse("   ").unwrap(), None);
        assert_eq!(parse("").unwrap(), None);
    }
}
