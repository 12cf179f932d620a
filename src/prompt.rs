//! Confirmation Prompt
//!
//! Yes/no question asked before any label is written

use std::io::{BufRead, IsTerminal, Write};

use console::Term;
use dialoguer::Input;

use crate::error::{Error, Result};

/// Source of a yes/no answer
pub trait Confirmation {
    /// Ask `question` and block until a yes or no answer is given
    fn confirm(&mut self, question: &str) -> Result<bool>;
}

/// Interpret an answer (case-insensitive `y` or `n`)
///
/// # Returns
/// `None` for anything else, in which case the question is asked again
pub fn parse_answer(input: &str) -> Option<bool> {
    match input.trim().to_lowercase().as_str() {
        "y" => Some(true),
        "n" => Some(false),
        _ => None,
    }
}

/// Ask `question` on `out` and read answers line by line from `reader`
///
/// # Errors
/// Returns `Prompt` if the input ends before a valid answer is given
pub fn confirm_from<R: BufRead, W: Write>(
    reader: &mut R,
    out: &mut W,
    question: &str,
) -> Result<bool> {
    let mut line = String::new();

    loop {
        write!(out, "{question} [Y/N]? ")?;
        out.flush()?;

        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Err(Error::Prompt(
                "input closed before a yes/no answer was given".to_string(),
            ));
        }

        if let Some(answer) = parse_answer(&line) {
            return Ok(answer);
        }
    }
}

/// Interactive prompt on the terminal
///
/// Falls back to plain line reads from stdin when it is not attached to a
/// terminal, so answers can be piped in.
#[derive(Debug, Default)]
pub struct TerminalPrompt;

impl Confirmation for TerminalPrompt {
    fn confirm(&mut self, question: &str) -> Result<bool> {
        if !std::io::stdin().is_terminal() || !Term::stderr().is_term() {
            let stdin = std::io::stdin();
            return confirm_from(&mut stdin.lock(), &mut std::io::stdout(), question);
        }

        loop {
            let input: String = Input::new()
                .with_prompt(format!("{question} [Y/N]?"))
                .allow_empty(true)
                .interact_text()
                .map_err(|e| Error::Prompt(e.to_string()))?;

            if let Some(answer) = parse_answer(&input) {
                return Ok(answer);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_answer() {
        assert_eq!(parse_answer("y"), Some(true));
        assert_eq!(parse_answer("Y"), Some(true));
        assert_eq!(parse_answer("n"), Some(false));
        assert_eq!(parse_answer("N\n"), Some(false));
    }

    #[test]
    fn test_parse_answer_rejects_other_input() {
        assert_eq!(parse_answer(""), None);
        assert_eq!(parse_answer("yes"), None);
        assert_eq!(parse_answer("maybe"), None);
    }

    #[test]
    fn test_confirm_from_piped_no() {
        let mut input = "n\n".as_bytes();
        let mut out: Vec<u8> = Vec::new();

        assert!(!confirm_from(&mut input, &mut out, "Continue?").unwrap());
        assert_eq!(String::from_utf8(out).unwrap(), "Continue? [Y/N]? ");
    }

    #[test]
    fn test_confirm_from_reprompts_until_valid() {
        let mut input = "maybe\n\nY\n".as_bytes();
        let mut out: Vec<u8> = Vec::new();

        assert!(confirm_from(&mut input, &mut out, "Continue?").unwrap());
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("Continue? [Y/N]? ").count(), 3);
    }

    #[test]
    fn test_confirm_from_end_of_input() {
        let mut input = "what\n".as_bytes();
        let mut out: Vec<u8> = Vec::new();

        let err = confirm_from(&mut input, &mut out, "Continue?").unwrap_err();
        assert!(matches!(err, Error::Prompt(_)));
    }
}
