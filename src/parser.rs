//! Token classification and grammar validation (§4.2).
//!
//! Builds an immutable [`Line`] out of the lexeme vector [`crate::lexer`]
//! produces. There is exactly one failure mode exposed to callers —
//! [`ParseError`] — because the shell does not distinguish error reasons to
//! the interactive user (§4.2, §7): any grammar violation just re-prompts.

use crate::lexer::{self, LexError};

/// Maximum number of *user* arguments in a command's argv (63), not
/// counting the terminator slot a C-style `execvp` argv would need.
pub const MAX_ARGV: usize = 63;

/// A single program invocation: argv plus optional redirections and the
/// background flag (§3 "Command").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub argv: Vec<String>,
    pub in_file: Option<String>,
    pub out_file: Option<String>,
    pub err_file: Option<String>,
    pub background: bool,
}

impl Command {
    pub fn program(&self) -> &str {
        &self.argv[0]
    }

    pub fn args(&self) -> &[String] {
        &self.argv[1..]
    }
}

/// A whole parsed input line: either a single command or a two-stage
/// pipeline, plus the raw text it was parsed from (§3 "Line").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub is_pipeline: bool,
    pub left: Command,
    pub right: Option<Command>,
    pub original: String,
}

impl Line {
    /// True if this line should run detached from the prompt's wait loop.
    /// Only the single-command case can be backgrounded (§3: always false
    /// inside a pipeline).
    pub fn background(&self) -> bool {
        self.left.background
    }
}

/// The single opaque "this line doesn't parse" error (§4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Word,
    InRedir,
    OutRedir,
    ErrRedir,
    Pipe,
    Amp,
}

fn classify(lexeme: &str) -> TokenKind {
    match lexeme {
        "<" => TokenKind::InRedir,
        ">" => TokenKind::OutRedir,
        "2>" => TokenKind::ErrRedir,
        "|" => TokenKind::Pipe,
        "&" => TokenKind::Amp,
        _ => TokenKind::Word,
    }
}

/// Parse a full input line into a [`Line`], or fail with [`ParseError`].
pub fn parse(original: &str) -> Result<Line, ParseError> {
    let lexemes = lexer::lex(original).map_err(|_: LexError| ParseError)?;

    if lexemes.is_empty() || classify(&lexemes[0]) != TokenKind::Word {
        return Err(ParseError);
    }

    let mut pipe_idx: Option<usize> = None;
    let mut seen_amp = false;
    let last = lexemes.len() - 1;

    for (i, lexeme) in lexemes.iter().enumerate() {
        match classify(lexeme) {
            TokenKind::Pipe => {
                if pipe_idx.is_some() {
                    return Err(ParseError);
                }
                pipe_idx = Some(i);
            }
            TokenKind::Amp => {
                if seen_amp || i != last {
                    return Err(ParseError);
                }
                seen_amp = true;
            }
            _ => {}
        }
    }

    if seen_amp && pipe_idx.is_some() {
        // `|` and `&` are mutually exclusive (§4.2 step 2).
        return Err(ParseError);
    }

    let line = if let Some(pipe_idx) = pipe_idx {
        let mut left = fill_command(&lexemes[..pipe_idx])?;
        let mut right = fill_command(&lexemes[pipe_idx + 1..])?;
        left.background = false;
        right.background = false;
        Line {
            is_pipeline: true,
            left,
            right: Some(right),
            original: original.to_string(),
        }
    } else if seen_amp {
        let mut left = fill_command(&lexemes[..last])?;
        left.background = true;
        Line {
            is_pipeline: false,
            left,
            right: None,
            original: original.to_string(),
        }
    } else {
        let left = fill_command(&lexemes)?;
        Line {
            is_pipeline: false,
            left,
            right: None,
            original: original.to_string(),
        }
    };

    Ok(line)
}

/// Build a `Command` from a half-open range of lexemes (§4.2 "fill_command").
/// Argv is closed as soon as the first redirection operator is consumed —
/// redirections must trail arguments.
fn fill_command(lexemes: &[String]) -> Result<Command, ParseError> {
    let mut argv = Vec::new();
    let mut in_file = None;
    let mut out_file = None;
    let mut err_file = None;
    let mut redirected = false;

    let mut i = 0;
    while i < lexemes.len() {
        match classify(&lexemes[i]) {
            TokenKind::Word => {
                if redirected || argv.len() >= MAX_ARGV {
                    return Err(ParseError);
                }
                argv.push(lexemes[i].clone());
            }
            TokenKind::InRedir => {
                redirected = true;
                in_file = Some(take_filename(lexemes, &mut i, in_file.is_some())?);
            }
            TokenKind::OutRedir => {
                redirected = true;
                out_file = Some(take_filename(lexemes, &mut i, out_file.is_some())?);
            }
            TokenKind::ErrRedir => {
                redirected = true;
                err_file = Some(take_filename(lexemes, &mut i, err_file.is_some())?);
            }
            TokenKind::Pipe | TokenKind::Amp => return Err(ParseError),
        }
        i += 1;
    }

    if argv.is_empty() {
        return Err(ParseError);
    }

    Ok(Command {
        argv,
        in_file,
        out_file,
        err_file,
        background: false,
    })
}

/// Consume the lexeme immediately after a redirection operator as its
/// filename, advancing `i` to point at it. Fails if the slot was already
/// used, the range ran out, or the next lexeme is itself an operator.
fn take_filename(lexemes: &[String], i: &mut usize, slot_already_used: bool) -> Result<String, ParseError> {
    if slot_already_used {
        return Err(ParseError);
    }
    *i += 1;
    let filename = lexemes.get(*i).ok_or(ParseError)?;
    if classify(filename) != TokenKind::Word {
        return Err(ParseError);
    }
    Ok(filename.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_foreground_command() {
        let line = parse("ls -la").unwrap();
        assert!(!line.is_pipeline);
        assert!(line.right.is_none());
        assert_eq!(line.left.argv, vec!["ls", "-la"]);
        assert!(!line.left.background);
    }

    #[test]
    fn pipeline_with_redirections_on_both_sides() {
        let line = parse("cat < input.txt | grep test > output.txt").unwrap();
        assert!(line.is_pipeline);
        assert_eq!(line.left.argv, vec!["cat"]);
        assert_eq!(line.left.in_file.as_deref(), Some("input.txt"));
        let right = line.right.unwrap();
        assert_eq!(right.argv, vec!["grep", "test"]);
        assert_eq!(right.out_file.as_deref(), Some("output.txt"));
        assert!(!line.left.background);
        assert!(!right.background);
    }

    #[test]
    fn background_simple_command() {
        let line = parse("sleep 5 &").unwrap();
        assert!(line.background());
        assert_eq!(line.left.argv, vec!["sleep", "5"]);
        assert_eq!(line.original, "sleep 5 &");
    }

    #[test]
    fn word_after_redirection_is_invalid() {
        assert_eq!(parse("ls > output.txt output_extra"), Err(ParseError));
    }

    #[test]
    fn pipe_alone_is_invalid() {
        assert_eq!(parse("ls |"), Err(ParseError));
        assert_eq!(parse("| ls"), Err(ParseError));
    }

    #[test]
    fn amp_and_pipe_are_mutually_exclusive() {
        assert_eq!(parse("ls & &"), Err(ParseError));
        assert_eq!(parse("ls & grep"), Err(ParseError));
        assert_eq!(parse("ls | grep &"), Err(ParseError));
    }

    #[test]
    fn redirection_operator_with_no_filename_is_invalid() {
        assert_eq!(parse("< ls"), Err(ParseError));
        assert_eq!(parse("ls > > x"), Err(ParseError));
    }

    #[test]
    fn duplicate_redirection_slot_is_invalid() {
        assert_eq!(parse("ls > a > b"), Err(ParseError));
        assert_eq!(parse("ls < a < b"), Err(ParseError));
        assert_eq!(parse("ls 2> a 2> b"), Err(ParseError));
    }

    #[test]
    fn second_pipe_is_invalid() {
        assert_eq!(parse("a | b | c"), Err(ParseError));
    }

    #[test]
    fn error_redirection_is_recognized() {
        let line = parse("make 2> errors.log").unwrap();
        assert_eq!(line.left.err_file.as_deref(), Some("errors.log"));
    }

    #[test]
    fn argv_over_cap_is_invalid() {
        let many = (0..MAX_ARGV + 1).map(|n| n.to_string()).collect::<Vec<_>>().join(" ");
        assert_eq!(parse(&format!("echo {many}")), Err(ParseError));
    }

    #[test]
    fn argv_at_cap_is_valid() {
        let many = (0..MAX_ARGV - 1).map(|n| n.to_string()).collect::<Vec<_>>().join(" ");
        let line = parse(&format!("echo {many}")).unwrap();
        assert_eq!(line.left.argv.len(), MAX_ARGV);
    }
}
