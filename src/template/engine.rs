//! Template rendering: scan, evaluate, substitute.

use std::fs;
use std::io;
use std::path::Path;

use super::scanner::scan;
use super::scope::{BaseScope, ExecutionScope};
use super::TemplateError;
use crate::config::{ConfigTree, EffectiveConfig};

/// Renders templates against one frozen configuration.
pub struct TemplateEngine<'c> {
    config: &'c ConfigTree,
    base: BaseScope,
    preamble: Option<String>,
}

impl<'c> TemplateEngine<'c> {
    pub fn new(config: &'c EffectiveConfig) -> Self {
        let settings = config.settings();
        Self {
            config: config.tree(),
            base: BaseScope::new(settings),
            preamble: settings.preamble.clone(),
        }
    }

    /// Render `text`, the contents of `input`, which will be written to `output`.
    ///
    /// A fresh execution scope is built for this call and dropped at its end.
    pub fn render(&self, text: &str, input: &Path, output: &Path) -> Result<String, TemplateError> {
        let blocks = scan(text);

        let mut out = String::with_capacity(text.len());
        if let Some(preamble) = &self.preamble {
            out.push_str(preamble);
        }

        if blocks.is_empty() {
            out.push_str(text);
            return Ok(out);
        }

        let scope = ExecutionScope::new(&self.base, self.config, input, output).map_err(|source| {
            TemplateError::Scope {
                file: input.to_path_buf(),
                source,
            }
        })?;

        let mut cursor = 0;
        for block in &blocks {
            out.push_str(&text[cursor..block.span.start]);
            let result = scope
                .evaluate(block)
                .map_err(|e| TemplateError::Evaluation {
                    file: input.to_path_buf(),
                    line: block.line,
                    message: e.to_string(),
                })?;
            if let Some(result) = result {
                out.push_str(&result);
            }
            cursor = block.span.end;
        }
        out.push_str(&text[cursor..]);

        tracing::debug!(file = %input.display(), blocks = blocks.len(), "rendered template");
        Ok(out)
    }

    /// Read `input`, render it and write the result to `output`.
    pub fn process(&self, input: &Path, output: &Path) -> Result<(), TemplateError> {
        if !input.is_file() {
            return Err(TemplateError::PathInvalid(input.to_path_buf()));
        }

        let text = fs::read_to_string(input).map_err(|source| TemplateError::Read {
            path: input.to_path_buf(),
            source,
        })?;

        let rendered = self.render(&text, input, output)?;

        write_output(output, &rendered).map_err(|source| TemplateError::Write {
            path: output.to_path_buf(),
            source,
        })?;

        tracing::info!(input = %input.display(), output = %output.display(), "wrote output");
        Ok(())
    }
}

fn write_output(path: &Path, contents: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, contents)
}
