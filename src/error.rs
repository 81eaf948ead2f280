//! Error classification shared by every stage of a run.

use std::fmt;

/// The kind of a fatal error, independent of the stage that raised it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A config, schema or template path does not exist.
    PathInvalid,
    /// A source is malformed or a script source did not produce an object.
    Parse,
    /// Two values at the same key cannot be merged.
    MergeConflict,
    /// A schema document rejected the merged configuration.
    SchemaViolation,
    /// A template block raised while being evaluated.
    Evaluation,
    /// The destination of an input file is missing or ambiguous.
    OutputResolution,
    /// Reading or writing a file failed.
    Io,
}

impl ErrorKind {
    /// Process exit code for this kind. Never zero.
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorKind::PathInvalid => 1,
            ErrorKind::Parse => 2,
            ErrorKind::MergeConflict => 3,
            ErrorKind::SchemaViolation => 4,
            ErrorKind::Evaluation => 5,
            ErrorKind::OutputResolution => 6,
            ErrorKind::Io => 7,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::PathInvalid => "path_invalid",
            ErrorKind::Parse => "parse_error",
            ErrorKind::MergeConflict => "merge_conflict",
            ErrorKind::SchemaViolation => "schema_violation",
            ErrorKind::Evaluation => "evaluation_error",
            ErrorKind::OutputResolution => "output_resolution_error",
            ErrorKind::Io => "io_error",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct_and_nonzero() {
        let kinds = [
            ErrorKind::PathInvalid,
            ErrorKind::Parse,
            ErrorKind::MergeConflict,
            ErrorKind::SchemaViolation,
            ErrorKind::Evaluation,
            ErrorKind::OutputResolution,
            ErrorKind::Io,
        ];
        let mut codes: Vec<i32> = kinds.iter().map(|k| k.exit_code()).collect();
        assert!(codes.iter().all(|c| *c != 0));
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), kinds.len());
    }
}
