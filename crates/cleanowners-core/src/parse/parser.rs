//! Extracts owner handles from CODEOWNERS text.

use super::ast::OwnerHandle;
use super::lexer::{HandleKind, classify_handle, is_blank_line, is_comment_line, parse_handle_text};
use log::trace;

/// Configuration for handle extraction.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParserConfig {
    /// Keep `@org/team` handles in the output. Off by default.
    pub include_teams: bool,
}

impl ParserConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether team handles are returned.
    pub fn with_include_teams(mut self, value: bool) -> Self {
        self.include_teams = value;
        self
    }
}

/// Extracts individual handles from CODEOWNERS text, dropping teams.
///
/// # Example
///
/// ```rust
/// use cleanowners_core::parse::{parse_handles, OwnerHandle};
///
/// let handles = parse_handles("*.rs @rustacean @github/core\n");
/// assert_eq!(handles, vec![OwnerHandle::individual("rustacean")]);
/// ```
pub fn parse_handles(input: &str) -> Vec<OwnerHandle> {
    parse_handles_with_config(input, ParserConfig::new())
}

/// Extracts handles from CODEOWNERS text.
///
/// Handles come back in first-seen order and duplicates are kept. Blank
/// lines and lines whose first non-whitespace character is `#` contribute
/// nothing. On any other line every `@` starts a handle which runs to the
/// next whitespace.
pub fn parse_handles_with_config(input: &str, config: ParserConfig) -> Vec<OwnerHandle> {
    let mut handles = Vec::new();

    for (index, line) in input.lines().enumerate() {
        if is_blank_line(line) || is_comment_line(line) {
            continue;
        }

        for segment in line.split('@').skip(1) {
            let Ok((_, text)) = parse_handle_text(segment) else {
                trace!("line {}: empty handle after '@'", index + 1);
                continue;
            };

            match classify_handle(text) {
                HandleKind::Individual(name) => handles.push(OwnerHandle::individual(name)),
                HandleKind::Team { org, team } if config.include_teams => {
                    handles.push(OwnerHandle::team(org, team));
                }
                HandleKind::Team { .. } => {
                    trace!("line {}: dropping team handle @{}", index + 1, text);
                }
            }
        }
    }

    handles
}

/// Extracts the individual logins from raw CODEOWNERS bytes.
///
/// Invalid UTF-8 sequences are replaced rather than rejected, the same way
/// the provider would present a non-UTF-8 file.
pub fn individual_handles(content: &[u8]) -> Vec<String> {
    let text = String::from_utf8_lossy(content);
    parse_handles(&text)
        .into_iter()
        .filter_map(|handle| handle.individual_name().map(str::to_owned))
        .collect()
}
