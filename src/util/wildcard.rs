//! `FindFirstFile`-style file name wildcards.
//!
//! - `*` matches any run of characters, including none
//! - `?` matches exactly one character
//! - everything else matches itself, compared case-insensitively
//! - `*` and `*.*` match every name (the latter is a DOS leftover: names
//!   without a dot still match)
//!
//! Patterns are translated into an anchored [`regex::Regex`] once and then
//! reused for every name in the directory.

use crate::DirError;
use regex::{Regex, RegexBuilder};

/// The current state of the wildcard translator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Copying literal characters.
    Literal,
    /// Just emitted a `*`; further stars collapse into it.
    Star,
}

/// A compiled file name wildcard.
#[derive(Debug, Clone)]
pub enum Wildcard {
    /// Matches every name, no regex needed.
    Any,
    /// Anything else.
    Pattern(Regex),
}

impl Wildcard {
    /**
     Compiles a wildcard pattern.

     ```
     use dirscan::util::Wildcard;

     let dlls = Wildcard::new("*.DLL").unwrap();
     assert!(dlls.is_match("kernel32.dll"));
     assert!(!dlls.is_match("kernel32.dll.bak"));
     assert!(Wildcard::new("*.*").unwrap().is_match("Makefile"));
     ```

     # Errors
     [`DirError::InvalidPattern`] if the generated expression fails to compile.
    */
    pub fn new(pattern: &str) -> Result<Self, DirError> {
        if pattern.is_empty() || pattern == "*" || pattern == "*.*" {
            return Ok(Self::Any);
        }
        let expr = translate(pattern);
        RegexBuilder::new(&expr)
            .case_insensitive(true)
            .dot_matches_new_line(true)
            .build()
            .map(Self::Pattern)
            .map_err(|e| DirError::InvalidPattern(format!("{pattern}: {e}")))
    }

    #[inline]
    #[must_use]
    pub fn is_match(&self, name: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Pattern(re) => re.is_match(name),
        }
    }

    #[inline]
    #[must_use]
    pub const fn matches_everything(&self) -> bool {
        matches!(self, Self::Any)
    }
}

/// Turns a wildcard into an anchored regular expression.
fn translate(pattern: &str) -> String {
    let mut expr = String::with_capacity(pattern.len() * 2 + 2);
    let mut state = State::Literal;
    expr.push('^');
    for chr in pattern.chars() {
        state = match (chr, state) {
            ('*', State::Star) => State::Star,
            ('*', State::Literal) => {
                expr.push_str(".*");
                State::Star
            }
            ('?', _) => {
                expr.push('.');
                State::Literal
            }
            (other, _) => {
                let mut buf = [0u8; 4];
                expr.push_str(&regex::escape(other.encode_utf8(&mut buf)));
                State::Literal
            }
        };
    }
    expr.push('$');
    expr
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stars_collapse() {
        assert_eq!(translate("a**b"), "^a.*b$");
    }

    #[test]
    fn regex_metacharacters_are_literal() {
        let w = Wildcard::new("file(1)+.txt").unwrap();
        assert!(w.is_match("file(1)+.txt"));
        assert!(!w.is_match("file1.txt"));
    }

    #[test]
    fn question_mark_is_exactly_one_char() {
        let w = Wildcard::new("log?.txt").unwrap();
        assert!(w.is_match("log1.txt"));
        assert!(w.is_match("LOGa.TXT"));
        assert!(!w.is_match("log.txt"));
        assert!(!w.is_match("log12.txt"));
    }

    #[test]
    fn match_all_forms() {
        for p in ["", "*", "*.*"] {
            let w = Wildcard::new(p).unwrap();
            assert!(w.matches_everything());
            assert!(w.is_match("no_dot"));
        }
    }

    #[test]
    fn wildcards_match_newlines_in_names() {
        assert!(Wildcard::new("a*").unwrap().is_match("a\nb"));
        assert!(Wildcard::new("a?b").unwrap().is_match("a\nb"));
        assert!(Wildcard::new("*.log").unwrap().is_match("two\nlines.log"));
        assert!(!Wildcard::new("a?b").unwrap().is_match("a\n\nb"));
    }

    #[test]
    fn unicode_literals_survive() {
        let w = Wildcard::new("réSumé*").unwrap();
        assert!(w.is_match("résumé-2024.pdf"));
    }
}
