//! Line-oriented record reader shared by the line and region parsers.
//!
//! Reads one record per physical line, trims structural whitespace and keeps
//! a forward-only line cursor used in error messages. Blank separator lines
//! are never skipped implicitly; callers consume them where the format puts
//! them.

use crate::constants::HEADER_TOKEN_COUNT;
use crate::error::{EchoregionsError, Result};
use crate::models::FileMetadata;
use std::io::BufRead;

/// A record as returned by [`RecordReader::next_record`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    /// Whitespace-separated tokens (date and time stay separate tokens)
    Tokens(Vec<String>),
    /// The trimmed line
    Raw(String),
}

pub struct RecordReader<R> {
    inner: R,
    source_name: String,
    line: usize,
    buffer: String,
}

impl<R: BufRead> RecordReader<R> {
    pub fn new(inner: R, source_name: impl Into<String>) -> Self {
        Self {
            inner,
            source_name: source_name.into(),
            line: 0,
            buffer: String::new(),
        }
    }

    /// Name used in error messages (usually the file path)
    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// Number of lines consumed so far
    pub fn line_number(&self) -> usize {
        self.line
    }

    /// Read the next record.
    ///
    /// With `split` the line is tokenized on whitespace; with `is_header`
    /// it must hold at least three tokens and only the first three are kept.
    /// `expected` names the record in a `TruncatedFile` error at end of
    /// stream. The typed helpers below all read through here.
    pub fn next_record(&mut self, split: bool, is_header: bool, expected: &str) -> Result<Record> {
        let line = self.read_trimmed(expected)?;

        if is_header {
            return self.header_tokens(&line).map(Record::Tokens);
        }
        if !split {
            return Ok(Record::Raw(line));
        }
        Ok(Record::Tokens(
            line.split_whitespace().map(str::to_string).collect(),
        ))
    }

    /// Trimmed line, kept verbatim otherwise
    pub fn next_line(&mut self, expected: &str) -> Result<String> {
        match self.next_record(false, false, expected)? {
            Record::Raw(line) => Ok(line),
            Record::Tokens(tokens) => Ok(tokens.join(" ")),
        }
    }

    /// Whitespace-separated tokens of the next line
    pub fn next_tokens(&mut self, expected: &str) -> Result<Vec<String>> {
        match self.next_record(true, false, expected)? {
            Record::Tokens(tokens) => Ok(tokens),
            Record::Raw(line) => Ok(line.split_whitespace().map(str::to_string).collect()),
        }
    }

    /// Header record as file metadata
    pub fn next_header(&mut self) -> Result<FileMetadata> {
        let tokens = match self.next_record(true, true, "header record")? {
            Record::Tokens(tokens) => tokens,
            Record::Raw(line) => self.header_tokens(&line)?,
        };
        let mut tokens = tokens.into_iter();
        // BOM written by some Windows exports
        let filetype = tokens
            .next()
            .unwrap_or_default()
            .trim_start_matches('\u{feff}')
            .to_string();
        let version_token = tokens.next().unwrap_or_default();
        let format_version = version_token.parse::<u32>().map_err(|_| {
            self.error(format!("format version '{}' is not an integer", version_token))
        })?;
        let tool_version = tokens.next().unwrap_or_default();

        Ok(FileMetadata {
            filetype,
            format_version,
            tool_version,
        })
    }

    /// A line holding a single non-negative integer count
    pub fn next_count(&mut self, expected: &str) -> Result<usize> {
        let line = self.next_line(expected)?;
        line.parse::<usize>()
            .map_err(|_| self.error(format!("{} '{}' is not a count", expected, line)))
    }

    /// Consume a separator line, which must be blank
    pub fn expect_blank(&mut self) -> Result<()> {
        let line = self.next_line("blank separator line")?;
        if line.is_empty() {
            Ok(())
        } else {
            Err(self.error(format!("expected blank separator line, found '{}'", line)))
        }
    }

    /// Parse error positioned at the current line
    pub fn error(&self, reason: impl Into<String>) -> EchoregionsError {
        EchoregionsError::parse(&self.source_name, self.line, reason)
    }

    fn header_tokens(&self, line: &str) -> Result<Vec<String>> {
        let tokens: Vec<String> = line
            .split_whitespace()
            .take(HEADER_TOKEN_COUNT)
            .map(str::to_string)
            .collect();
        if tokens.len() < HEADER_TOKEN_COUNT {
            return Err(self.error(format!(
                "header needs {} tokens, found {}",
                HEADER_TOKEN_COUNT,
                tokens.len()
            )));
        }
        Ok(tokens)
    }

    fn read_trimmed(&mut self, expected: &str) -> Result<String> {
        self.buffer.clear();
        let bytes = self.inner.read_line(&mut self.buffer)?;
        if bytes == 0 {
            return Err(EchoregionsError::truncated(
                &self.source_name,
                self.line + 1,
                expected,
            ));
        }
        self.line += 1;
        Ok(self.buffer.trim().to_string())
    }
}
