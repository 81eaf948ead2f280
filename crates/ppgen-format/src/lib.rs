//! Heuristic reformatter for generated C-like code.
//!
//! The formatter knows nothing about grammar. It strips line breaks and tabs
//! outside literals, then re-breaks the text on a small alphabet of
//! delimiters:
//!
//! - `{` opens a level; `= {` additionally enters initializer mode
//! - `}` closes a level on its own line
//! - `;` always ends a line
//! - `,` ends a line only inside an initializer list
//!
//! Blank lines and trailing whitespace outside literals are removed from the
//! result. Input is assumed to be well formed; anything else is formatted on
//! a best-effort basis.

mod layout;
mod literal;

pub use literal::{split_literals, Piece};

use layout::Layout;

/// Default indent unit.
pub const DEFAULT_INDENT_UNIT: &str = "    ";

/// Reformatter with a configurable indent unit.
#[derive(Debug, Clone)]
pub struct Formatter {
    indent_unit: String,
}

impl Default for Formatter {
    fn default() -> Self {
        Self {
            indent_unit: DEFAULT_INDENT_UNIT.to_string(),
        }
    }
}

impl Formatter {
    /// Create a formatter that indents each level with `indent_unit`.
    pub fn new(indent_unit: impl Into<String>) -> Self {
        Self {
            indent_unit: indent_unit.into(),
        }
    }

    /// Reformat `code`.
    ///
    /// Every line after the first is prefixed with `initial_indent` plus one
    /// indent unit per open brace. The first line is left unprefixed so the
    /// result can be spliced in after existing indentation.
    pub fn format(&self, code: &str, initial_indent: &str) -> String {
        let pieces = split_literals(code);
        Layout::new(&self.indent_unit, initial_indent).run(&pieces)
    }
}

/// Reformat `code` with the default indent unit.
pub fn format(code: &str, initial_indent: &str) -> String {
    Formatter::default().format(code, initial_indent)
}
