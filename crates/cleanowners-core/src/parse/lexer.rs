//! Token parsers for CODEOWNERS lines.
//!
//! Only the pieces needed to pull owner handles out of a line live here:
//! comment/blank detection, the handle token itself, and handle
//! classification.

use nom::{
    IResult, Parser,
    bytes::complete::take_till1,
    character::complete::{char, multispace0, space0},
    combinator::rest,
    sequence::preceded,
};

/// Parses a complete comment line (optional whitespace + # + content).
pub fn parse_comment_line(input: &str) -> IResult<&str, &str> {
    (space0, char('#'), rest)
        .map(|(_, _, content)| content)
        .parse(input)
}

/// Returns true if the line is a comment.
pub fn is_comment_line(input: &str) -> bool {
    parse_comment_line(input.trim_start()).is_ok()
}

/// Checks if a line is blank (empty or only whitespace).
pub fn is_blank_line(input: &str) -> bool {
    input.trim().is_empty()
}

/// Parses the handle text that follows an `@`.
///
/// Leading whitespace is skipped and the handle runs to the next
/// whitespace character. Fails when nothing but whitespace remains.
pub fn parse_handle_text(input: &str) -> IResult<&str, &str> {
    preceded(multispace0, take_till1(|c: char| c.is_whitespace())).parse(input)
}

/// The shape of a handle, borrowed from the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleKind<'a> {
    /// An individual account (`@name`).
    Individual(&'a str),
    /// A team (`@org/team`). Anything containing `/` lands here.
    Team { org: &'a str, team: &'a str },
}

/// Classifies handle text (without the leading `@`).
pub fn classify_handle(text: &str) -> HandleKind<'_> {
    match text.split_once('/') {
        Some((org, team)) => HandleKind::Team { org, team },
        None => HandleKind::Individual(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_comment_line_with_leading_whitespace() {
        let (_rest, content) = parse_comment_line("   # comment").unwrap();
        assert_eq!(content, " comment");
    }

    #[test]
    fn is_comment_line_detects_comments() {
        assert!(is_comment_line("# owners"));
        assert!(is_comment_line("\t  # owners @someone"));
        assert!(!is_comment_line("*.rs @owner # trailing"));
    }

    #[test]
    fn is_blank_line_empty() {
        assert!(is_blank_line(""));
        assert!(is_blank_line("   "));
        assert!(is_blank_line("\t  \t"));
        assert!(!is_blank_line("*.rs @owner"));
    }

    #[test]
    fn parse_handle_text_stops_at_whitespace() {
        let (rest, handle) = parse_handle_text("octocat docs/").unwrap();
        assert_eq!(handle, "octocat");
        assert_eq!(rest, " docs/");
    }

    #[test]
    fn parse_handle_text_skips_leading_whitespace() {
        let (_rest, handle) = parse_handle_text("  octocat").unwrap();
        assert_eq!(handle, "octocat");
    }

    #[test]
    fn parse_handle_text_rejects_empty() {
        assert!(parse_handle_text("").is_err());
        assert!(parse_handle_text("   ").is_err());
    }

    #[test]
    fn classify_individual_and_team() {
        assert_eq!(classify_handle("octocat"), HandleKind::Individual("octocat"));
        assert_eq!(
            classify_handle("github/core"),
            HandleKind::Team {
                org: "github",
                team: "core"
            }
        );
    }

    #[test]
    fn classify_slash_is_always_team() {
        assert_eq!(
            classify_handle("/core"),
            HandleKind::Team { org: "", team: "core" }
        );
    }
}
