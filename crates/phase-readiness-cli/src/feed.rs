// crates/phase-readiness-cli/src/feed.rs
// ============================================================================
// Module: Sample Feed
// Description: JSON-lines reader producing engine samples.
// Purpose: Turn untrusted line-oriented input into typed samples.
// Dependencies: phase-readiness-core, serde_json, thiserror
// ============================================================================

//! ## Overview
//! [`SampleFeed`] reads one JSON [`Sample`] per line. Blank lines are skipped.
//! A line that cannot be decoded is still yielded, carrying a [`FeedError`],
//! so the caller can evaluate it fail-safe instead of silently dropping it.
//! Lines longer than [`MAX_LINE_BYTES`] are rejected without buffering the
//! remainder.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io;
use std::io::BufRead;
use std::io::Read;

use phase_readiness_core::Sample;
use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum accepted bytes per input line, newline included.
pub const MAX_LINE_BYTES: usize = 64 * 1024;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Reasons a feed line was rejected.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Line exceeded [`MAX_LINE_BYTES`].
    #[error("line exceeds {MAX_LINE_BYTES} bytes")]
    TooLong,
    /// Line is not valid UTF-8.
    #[error("line is not valid UTF-8")]
    NotUtf8,
    /// Line is not a valid sample object.
    #[error("invalid sample: {0}")]
    Parse(#[from] serde_json::Error),
}

// ============================================================================
// SECTION: Feed
// ============================================================================

/// One non-blank input line.
#[derive(Debug)]
pub struct FeedLine {
    /// 1-based line number in the input.
    pub line: usize,
    /// Decoded sample or the reason it was rejected.
    pub sample: Result<Sample, FeedError>,
}

/// Iterator over JSON-lines samples.
pub struct SampleFeed<R> {
    /// Underlying buffered reader.
    reader: R,
    /// Lines consumed so far.
    line: usize,
    /// Reusable line buffer.
    buffer: Vec<u8>,
}

impl<R: BufRead> SampleFeed<R> {
    /// Wraps a buffered reader.
    #[must_use]
    pub const fn new(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            buffer: Vec::new(),
        }
    }

    /// Reads one raw line into the buffer, returning false at end of input.
    fn read_line(&mut self) -> io::Result<bool> {
        self.buffer.clear();
        let limit = u64::try_from(MAX_LINE_BYTES).unwrap_or(u64::MAX);
        let read = self.reader.by_ref().take(limit).read_until(b'\n', &mut self.buffer)?;
        Ok(read > 0)
    }

    /// Discards input up to and including the next newline.
    fn skip_rest_of_line(&mut self) -> io::Result<()> {
        loop {
            let available = self.reader.fill_buf()?;
            if available.is_empty() {
                return Ok(());
            }
            if let Some(position) = available.iter().position(|byte| *byte == b'\n') {
                self.reader.consume(position + 1);
                return Ok(());
            }
            let len = available.len();
            self.reader.consume(len);
        }
    }
}

impl<R: BufRead> Iterator for SampleFeed<R> {
    type Item = io::Result<FeedLine>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.read_line() {
                Ok(true) => {}
                Ok(false) => return None,
                Err(err) => return Some(Err(err)),
            }
            self.line += 1;
            if self.buffer.len() >= MAX_LINE_BYTES && !self.buffer.ends_with(b"\n") {
                if let Err(err) = self.skip_rest_of_line() {
                    return Some(Err(err));
                }
                return Some(Ok(FeedLine {
                    line: self.line,
                    sample: Err(FeedError::TooLong),
                }));
            }
            let Ok(text) = std::str::from_utf8(&self.buffer) else {
                return Some(Ok(FeedLine {
                    line: self.line,
                    sample: Err(FeedError::NotUtf8),
                }));
            };
            let text = text.trim();
            if text.is_empty() {
                continue;
            }
            return Some(Ok(FeedLine {
                line: self.line,
                sample: parse_sample(text),
            }));
        }
    }
}

/// Decodes one sample object.
///
/// # Errors
///
/// Returns [`FeedError::Parse`] when the text is not a sample object.
pub fn parse_sample(text: &str) -> Result<Sample, FeedError> {
    Ok(serde_json::from_str(text)?)
}
