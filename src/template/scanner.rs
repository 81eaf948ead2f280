//! Script block scanner.
//!
//! Markers:
//! - `<?` opens a block; `<??` also consumes the line break right before it
//! - `?>` closes a block; `??>` also consumes the line break right after it
//!
//! The two trimming choices are independent per block. Block code may span
//! lines but cannot contain `?>`.

use regex_lite::Regex;
use std::ops::Range;
use std::sync::OnceLock;

const BLOCK_PATTERN: &str = r"(?s)(\r?\n<\?\?|<\?\?|<\?)(.*?)(\?\?>\r?\n|\?\?>|\?>)";

fn block_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(BLOCK_PATTERN).expect("block pattern is a valid regex"))
}

/// One script block found in a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptBlock<'t> {
    /// Everything replaced by the block result, trimmed line breaks included.
    pub span: Range<usize>,
    /// Code between the markers.
    pub code: &'t str,
    /// 1-based line of the opening marker.
    pub line: usize,
    /// The line break before the opening marker was consumed.
    pub trim_before: bool,
    /// The line break after the closing marker was consumed.
    pub trim_after: bool,
}

/// Find every block in `text`, in textual order.
pub fn scan(text: &str) -> Vec<ScriptBlock<'_>> {
    block_regex()
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let open = caps.get(1)?;
            let code = caps.get(2)?;
            let close = caps.get(3)?;

            let trim_before = open.as_str().starts_with(['\r', '\n']);
            let trim_after = close.as_str().ends_with('\n');
            let marker_len = if open.as_str().ends_with("<??") { 3 } else { 2 };
            let marker_start = open.end() - marker_len;

            Some(ScriptBlock {
                span: whole.range(),
                code: code.as_str(),
                line: text[..marker_start].matches('\n').count() + 1,
                trim_before,
                trim_after,
            })
        })
        .collect()
}
