//! Splits a byte stream into lines

use std::io::{self, BufRead};

/// Yields each line of the reader without its terminator (`\n` or `\r\n`).
///
/// Works on raw bytes so lines can be compared before the input encoding is applied. The last
/// line does not need a terminator.
pub struct LineSplitter<R> {
    reader: R,
}

impl<R: BufRead> LineSplitter<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> Iterator for LineSplitter<R> {
    type Item = io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut line = Vec::new();
        match self.reader.read_until(b'\n', &mut line) {
            Ok(0) => None,
            Ok(_) => {
                if line.last() == Some(&b'\n') {
                    line.pop();
                    if line.last() == Some(&b'\r') {
                        line.pop();
                    }
                }
                Some(Ok(line))
            }
            Err(e) => Some(Err(e)),
        }
    }
}
