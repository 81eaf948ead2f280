//! Brace-driven layout state machine.
//!
//! Known limitations: braces inside conditional expressions and commas inside
//! nested non-initializer braces are laid out by the same rules as everything
//! else. The output is cosmetic only.
//!
//! Blank lines and trailing whitespace are only removed around the line
//! breaks the layout emits itself, so literal contents stay verbatim.

use crate::literal::Piece;

/// Transient state for a single format call.
pub(crate) struct Layout<'a> {
    indent_unit: &'a str,
    initial_indent: &'a str,
    /// Brace nesting depth.
    depth: usize,
    /// Initializer-list nesting; positive while inside `= { ... }`.
    initializer: usize,
    /// Swallow spaces that directly follow an emitted line break.
    skip_spaces: bool,
    /// Nothing but indentation has been written since the last break.
    line_blank: bool,
    /// Offset in `out` where the current line's indentation starts.
    line_start: usize,
    out: String,
}

impl<'a> Layout<'a> {
    pub(crate) fn new(indent_unit: &'a str, initial_indent: &'a str) -> Self {
        Self {
            indent_unit,
            initial_indent,
            depth: 0,
            initializer: 0,
            skip_spaces: false,
            line_blank: true,
            line_start: 0,
            out: String::new(),
        }
    }

    /// Feed all pieces through the scanner.
    pub(crate) fn run(mut self, pieces: &[Piece]) -> String {
        for piece in pieces {
            match piece {
                Piece::Literal(text) => {
                    self.skip_spaces = false;
                    self.line_blank = false;
                    self.out.push_str(text);
                }
                Piece::Code(text) => {
                    for c in text.chars() {
                        self.push_code(c);
                    }
                }
            }
        }
        self.finish()
    }

    fn push_code(&mut self, c: char) {
        if self.skip_spaces && c == ' ' {
            return;
        }
        self.skip_spaces = false;

        match c {
            '{' => {
                // `= {` always opens an initializer; a bare brace only nests
                // one when already inside an initializer.
                if self.out.ends_with("= ") || self.initializer > 0 {
                    self.initializer += 1;
                }
                self.depth += 1;
                self.push('{');
                self.break_line();
            }
            '}' => {
                self.depth = self.depth.saturating_sub(1);
                self.initializer = self.initializer.saturating_sub(1);
                self.break_line();
                self.skip_spaces = false;
                self.push('}');
            }
            ';' => {
                self.push(';');
                self.break_line();
            }
            ',' if self.initializer > 0 => {
                self.push(',');
                self.break_line();
            }
            _ => self.push(c),
        }
    }

    fn push(&mut self, c: char) {
        if c != ' ' {
            self.line_blank = false;
        }
        self.out.push(c);
    }

    /// End the current line and indent the next one. A line holding only
    /// indentation is reused instead of leaving a blank line behind.
    fn break_line(&mut self) {
        if self.line_blank {
            self.out.truncate(self.line_start);
        } else {
            let end = self.out.trim_end_matches([' ', '\t']).len();
            self.out.truncate(end);
            self.out.push('\n');
            self.line_start = self.out.len();
        }

        // The first line is never indented.
        if !self.out.is_empty() {
            self.out.push_str(self.initial_indent);
            for _ in 0..self.depth {
                self.out.push_str(self.indent_unit);
            }
        }
        self.line_blank = true;
        self.skip_spaces = true;
    }

    fn finish(mut self) -> String {
        if self.line_blank {
            self.out.truncate(self.line_start);
        }
        let end = self.out.trim_end().len();
        self.out.truncate(end);
        self.out
    }
}
