//! Removes the decorative frame around a rendered table
//!
//! Box-drawn tables repeat the same rule line at the top, below the header and at the bottom,
//! and wrap every row in the delimiter:
//! ```text
//! +-----+-----+
//! | one | two |
//! +-----+-----+
//! |   1 |   4 |
//! +-----+-----+
//! ```
//! The first line is taken as the border. Any later copy of it is dropped, and the outer
//! delimiters are cut from the remaining lines.

use std::io::{self, BufRead, Read};

use log::{debug, trace};

use super::{Transform, lines::LineSplitter};

/// Strips the frame from a table, one line at a time
pub struct BorderStripper {
    /// First line seen, captured once
    border: Option<Vec<u8>>,
    delimiter: Vec<u8>,
}

impl BorderStripper {
    pub fn new(delimiter: impl Into<Vec<u8>>) -> Self {
        Self {
            border: None,
            delimiter: delimiter.into(),
        }
    }
}

impl Transform for BorderStripper {
    type Input = Vec<u8>;
    type Output = Vec<u8>;

    /// Returns the cleaned line with a trailing `\n`, or `None` if the line is part of the border
    fn step(&mut self, line: Vec<u8>) -> Option<Vec<u8>> {
        if self.border.is_none() {
            debug!("Border: {:?}", String::from_utf8_lossy(&line));
            self.border = Some(line);
            return None;
        }
        if self.border.as_ref() == Some(&line) {
            trace!("Skipping repeated border line");
            return None;
        }
        let mut cleaned = line.as_slice();
        if let Some(rest) = cleaned.strip_prefix(self.delimiter.as_slice()) {
            cleaned = rest;
        }
        if let Some(rest) = cleaned.strip_suffix(self.delimiter.as_slice()) {
            cleaned = rest;
        }
        let mut cleaned = cleaned.to_vec();
        cleaned.push(b'\n');
        Some(cleaned)
    }
}

/// Reader over the border-stripped lines of another reader, so the result can be tokenized
/// like any other input
pub struct BorderStrippedReader<R> {
    lines: LineSplitter<R>,
    stripper: BorderStripper,
    pending: Vec<u8>,
    pos: usize,
}

impl<R: BufRead> BorderStrippedReader<R> {
    pub fn new(reader: R, delimiter: impl Into<Vec<u8>>) -> Self {
        Self {
            lines: LineSplitter::new(reader),
            stripper: BorderStripper::new(delimiter),
            pending: Vec::new(),
            pos: 0,
        }
    }
}

impl<R: BufRead> Read for BorderStrippedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        while self.pos >= self.pending.len() {
            let Some(line) = self.lines.next() else {
                return Ok(0);
            };
            if let Some(cleaned) = self.stripper.step(line?) {
                self.pending = cleaned;
                self.pos = 0;
            }
        }
        let n = buf.len().min(self.pending.len() - self.pos);
        buf[..n].copy_from_slice(&self.pending[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}
