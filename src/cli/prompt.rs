//! Line-based prompting over any reader/writer pair.
//!
//! The console runs on stdin/stdout; tests drive it with a byte buffer.
//! End of input is reported as `None` so callers can wind down cleanly.

use anyhow::Result;
use colored::Colorize;
use std::io::{BufRead, Write};

pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Writer for rendering results.
    pub fn out(&mut self) -> &mut W {
        &mut self.output
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Ask a question and read one line, without the trailing newline.
    /// Returns `None` once input is exhausted.
    pub fn ask(&mut self, question: &str) -> Result<Option<String>> {
        write!(self.output, "  {} {} ", "→".blue(), question)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }
        let answer = line.trim_end_matches(['\n', '\r']).to_string();
        Ok(Some(answer))
    }

    /// Ask a yes/no question. Only "yes" (any case) counts as yes;
    /// end of input counts as no.
    pub fn confirm(&mut self, question: &str) -> Result<bool> {
        let answer = self.ask(&format!("{} (yes/no):", question))?;
        Ok(answer.is_some_and(|a| a.trim().eq_ignore_ascii_case("yes")))
    }

    /// Read a 1-based menu choice, re-asking until it is in range.
    /// Returns the 0-based index, or `None` at end of input.
    pub fn choose(&mut self, max: usize) -> Result<Option<usize>> {
        loop {
            let Some(answer) = self.ask("Choose")? else {
                return Ok(None);
            };
            if let Ok(n) = answer.trim().parse::<usize>() {
                if (1..=max).contains(&n) {
                    return Ok(Some(n - 1));
                }
            }
            writeln!(self.output, "    {} Pick a number 1-{}", "?".yellow(), max)?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn prompter(input: &str) -> Prompter<Cursor<Vec<u8>>, Vec<u8>> {
        Prompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn test_ask_strips_newline_and_reports_eof() {
        let mut p = prompter("alice\r\n");
        assert_eq!(p.ask("Name?").unwrap().as_deref(), Some("alice"));
        assert_eq!(p.ask("Name?").unwrap(), None);
    }

    #[test]
    fn test_ask_keeps_inner_whitespace() {
        let mut p = prompter(" 42 \n");
        assert_eq!(p.ask("Pin?").unwrap().as_deref(), Some(" 42 "));
    }

    #[test]
    fn test_confirm_only_yes() {
        let mut p = prompter("YES\ny\nno\n");
        assert!(p.confirm("Sure?").unwrap());
        assert!(!p.confirm("Sure?").unwrap());
        assert!(!p.confirm("Sure?").unwrap());
        assert!(!p.confirm("Sure?").unwrap());
    }

    #[test]
    fn test_choose_reasks_until_valid() {
        let mut p = prompter("0\nabc\n3\n");
        assert_eq!(p.choose(5).unwrap(), Some(2));
        let output = String::from_utf8(p.into_output()).unwrap();
        assert_eq!(output.matches("Pick a number 1-5").count(), 2);
    }
}
