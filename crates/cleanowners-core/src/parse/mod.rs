//! Handle extraction for CODEOWNERS files.
//!
//! # Example
//!
//! ```rust
//! use cleanowners_core::parse::{parse_handles_with_config, ParserConfig};
//!
//! let input = r#"
//! # CODEOWNERS file
//! *.rs @rustacean
//! /docs/ @github/docs-team
//! "#;
//!
//! let config = ParserConfig::new().with_include_teams(true);
//! for handle in parse_handles_with_config(input, config) {
//!     println!("{}", handle);
//! }
//! ```

mod ast;
mod lexer;
mod parser;

pub use ast::OwnerHandle;
pub use lexer::{HandleKind, classify_handle, is_blank_line, is_comment_line};
pub use parser::{ParserConfig, individual_handles, parse_handles, parse_handles_with_config};
