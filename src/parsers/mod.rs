//! Parsers for the different input formats
//!
//! Every parser turns a byte stream into a stream of [`Record`]s. The text table formats are
//! built from small stages (line splitting, border stripping, tokenizing, row materializing)
//! chained together with [`Transformed`].

use std::io::{self, BufRead};

use thiserror::Error;

use crate::config::{Encoding, InputConfig};
use crate::record::Record;

pub mod border;
pub mod delimited;
pub mod json;
pub mod lines;
pub mod rows;
pub mod tokenizer;

/// Stream of parsed records, ending at the first error
pub type RecordStream<'a> = Box<dyn Iterator<Item = Result<Record, ParseError>> + 'a>;

/// Errors when parsing the input into records
#[derive(Debug, Error)]
pub enum ParseError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("Malformed row: {0}")]
    Csv(#[from] csv::Error),
    #[error("Row at line {line} is not valid {encoding:?} text")]
    Encoding { line: u64, encoding: Encoding },
    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Provided JSON data is not an array")]
    NotAnArray,
    #[error("Element {index} of the JSON array is not an object")]
    NotAnObject { index: usize },
    #[error("Malformed JSON on line {line}: {source}")]
    JsonLine {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("JSON on line {line} is not an object")]
    JsonLineNotAnObject { line: usize },
}

/// One stage of a streaming pipeline.
///
/// A stage holds whatever it captured from earlier input (a border line, a header) and turns
/// each input into zero or one outputs.
pub trait Transform {
    type Input;
    type Output;

    fn step(&mut self, input: Self::Input) -> Option<Self::Output>;
}

/// Drives a [`Transform`] over a fallible upstream iterator.
///
/// The first upstream error is passed through and ends the stream.
pub struct Transformed<I, T> {
    upstream: I,
    transform: T,
    failed: bool,
}

impl<I, T> Transformed<I, T> {
    pub fn new(upstream: I, transform: T) -> Self {
        Self {
            upstream,
            transform,
            failed: false,
        }
    }
}

impl<I, T, E> Iterator for Transformed<I, T>
where
    I: Iterator<Item = Result<T::Input, E>>,
    T: Transform,
{
    type Item = Result<T::Output, E>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            match self.upstream.next()? {
                Ok(input) => {
                    if let Some(output) = self.transform.step(input) {
                        return Some(Ok(output));
                    }
                }
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

/// Builds the record stream for the configured input format
pub fn record_stream<'a, R: BufRead + 'a>(input: &InputConfig, reader: R) -> RecordStream<'a> {
    match input {
        InputConfig::Csv(config) | InputConfig::Ascii(config) => {
            delimited::records(config, reader)
        }
        InputConfig::Json => Box::new(json::JsonArrayParser::new(reader)),
        InputConfig::Jsonl => Box::new(json::JsonLinesParser::new(reader)),
    }
}
