//! Splits a raw input line into whitespace-separated lexemes (§4.1).
//!
//! Deliberately dumber than a real shell's tokenizer: no quoting, no
//! escaping, no operator recognition. It only knows how to find lexeme
//! boundaries and enforce the two per-lexeme size caps; classifying a
//! lexeme into a [`crate::parser::TokenKind`] is the parser's job. The
//! overall line-length cap (2000 bytes) is enforced by the REPL driver when
//! it reads the line, not here — by the time a `&str` reaches this module
//! it is already within that bound.

/// Maximum number of lexemes accepted from a single line.
pub const MAX_TOKENS: usize = 2000;
/// Maximum length of a single lexeme, in bytes.
pub const MAX_TOKEN_LEN: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexError {
    /// A lexeme exceeded [`MAX_TOKEN_LEN`].
    TokenTooLong,
    /// More than [`MAX_TOKENS`] lexemes were found.
    TooManyTokens,
}

/// Split `line` into lexemes on runs of spaces/tabs, discarding leading and
/// trailing separators. Newlines are not treated as separators — the REPL
/// strips the line's trailing newline before calling this.
pub fn lex(line: &str) -> Result<Vec<String>, LexError> {
    let mut tokens = Vec::new();
    for piece in line.split(|c: char| c == ' ' || c == '\t') {
        if piece.is_empty() {
            continue;
        }
        if piece.len() > MAX_TOKEN_LEN {
            return Err(LexError::TokenTooLong);
        }
        if tokens.len() >= MAX_TOKENS {
            return Err(LexError::TooManyTokens);
        }
        tokens.push(piece.to_string());
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_spaces_and_tabs() {
        assert_eq!(lex("ls\t-la  /tmp").unwrap(), vec!["ls", "-la", "/tmp"]);
    }

    #[test]
    fn collapses_separator_runs_and_trims_edges() {
        assert_eq!(lex("   ls   -la   ").unwrap(), vec!["ls", "-la"]);
    }

    #[test]
    fn empty_line_yields_no_tokens() {
        assert_eq!(lex("").unwrap(), Vec::<String>::new());
        assert_eq!(lex("   ").unwrap(), Vec::<String>::new());
    }

    #[test]
    fn operators_pass_through_as_raw_lexemes() {
        assert_eq!(
            lex("cat < in.txt | grep x > out.txt &").unwrap(),
            vec!["cat", "<", "in.txt", "|", "grep", "x", ">", "out.txt", "&"]
        );
    }

    #[test]
    fn token_at_cap_is_accepted() {
        let token = "a".repeat(MAX_TOKEN_LEN);
        assert_eq!(lex(&token).unwrap(), vec![token]);
    }

    #[test]
    fn token_over_cap_is_rejected() {
        let token = "a".repeat(MAX_TOKEN_LEN + 1);
        assert_eq!(lex(&token), Err(LexError::TokenTooLong));
    }

    #[test]
    fn too_many_tokens_is_rejected() {
        let line = vec!["a"; MAX_TOKENS + 1].join(" ");
        assert_eq!(lex(&line), Err(LexError::TooManyTokens));
    }

    #[test]
    fn max_tokens_is_accepted() {
        let line = vec!["a"; MAX_TOKENS].join(" ");
        assert_eq!(lex(&line).unwrap().len(), MAX_TOKENS);
    }
}
