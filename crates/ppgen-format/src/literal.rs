//! Literal-aware preprocessing.
//!
//! Splits code into literal and non-literal pieces so the layout pass never
//! touches the contents of string or character literals.

/// One piece of the input after literal detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Piece {
    /// Code outside any literal, with tab and line-break runs removed.
    Code(String),
    /// A double-quoted string or character literal, copied verbatim.
    Literal(String),
}

/// Split `code` into literal and code pieces.
///
/// Recognized literals:
/// - double-quoted strings with backslash escapes (an unterminated string
///   runs to the end of the input)
/// - `'x'` single-character literals
/// - `'\x'` escaped character literals
///
/// Any other single quote is ordinary code.
pub fn split_literals(code: &str) -> Vec<Piece> {
    let chars: Vec<char> = code.chars().collect();
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut i = 0;

    while i < chars.len() {
        let literal_len = match chars[i] {
            '"' => Some(string_literal_len(&chars[i..])),
            '\'' => char_literal_len(&chars[i..]),
            _ => None,
        };

        if let Some(len) = literal_len {
            if !current.is_empty() {
                pieces.push(Piece::Code(std::mem::take(&mut current)));
            }
            pieces.push(Piece::Literal(chars[i..i + len].iter().collect()));
            i += len;
            continue;
        }

        if !matches!(chars[i], '\t' | '\n' | '\r') {
            current.push(chars[i]);
        }
        i += 1;
    }

    if !current.is_empty() {
        pieces.push(Piece::Code(current));
    }

    pieces
}

/// Length of the string literal starting at `chars[0] == '"'`.
fn string_literal_len(chars: &[char]) -> usize {
    let mut i = 1;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            '"' => return i + 1,
            _ => i += 1,
        }
    }
    chars.len()
}

/// Length of the character literal starting at `chars[0] == '\''`, if any.
fn char_literal_len(chars: &[char]) -> Option<usize> {
    match chars {
        ['\'', '\\', _, '\'', ..] => Some(4),
        ['\'', c, '\'', ..] if *c != '\\' && *c != '\'' => Some(3),
        _ => None,
    }
}
