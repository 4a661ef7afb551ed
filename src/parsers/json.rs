//! Parses JSON arrays and JSON lines into records

use std::{
    io::{BufRead, Lines, Read},
    vec,
};

use log::debug;
use serde_json::Value;

use super::ParseError;
use crate::record::Record;

fn into_record(value: Value) -> Option<Record> {
    match value {
        Value::Object(map) => Some(map.into_iter().collect()),
        _ => None,
    }
}

/// Parses a single JSON array of objects.
///
/// The whole input has to be read before it is known to be an array, so nothing is yielded
/// until the reader is exhausted.
pub struct JsonArrayParser<R> {
    reader: Option<R>,
    elements: vec::IntoIter<Value>,
    index: usize,
}

impl<R: Read> JsonArrayParser<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: Some(reader),
            elements: Vec::new().into_iter(),
            index: 0,
        }
    }

    fn decode(mut reader: R) -> Result<Vec<Value>, ParseError> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        debug!("Read {} bytes of JSON", buf.len());
        match serde_json::from_slice::<Value>(&buf)? {
            Value::Array(elements) => Ok(elements),
            _ => Err(ParseError::NotAnArray),
        }
    }
}

impl<R: Read> Iterator for JsonArrayParser<R> {
    type Item = Result<Record, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(reader) = self.reader.take() {
            match Self::decode(reader) {
                Ok(elements) => self.elements = elements.into_iter(),
                Err(e) => return Some(Err(e)),
            }
        }
        let element = self.elements.next()?;
        let index = self.index;
        self.index += 1;
        Some(into_record(element).ok_or(ParseError::NotAnObject { index }))
    }
}

/// Parses one JSON object per line, skipping blank lines
pub struct JsonLinesParser<R> {
    lines: Lines<R>,
    line: usize,
}

impl<R: BufRead> JsonLinesParser<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line: 0,
        }
    }
}

impl<R: BufRead> Iterator for JsonLinesParser<R> {
    type Item = Result<Record, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            self.line += 1;
            if line.trim().is_empty() {
                continue;
            }
            let line_number = self.line;
            let record = serde_json::from_str::<Value>(&line)
                .map_err(|source| ParseError::JsonLine {
                    line: line_number,
                    source,
                })
                .and_then(|value| {
                    into_record(value).ok_or(ParseError::JsonLineNotAnObject { line: line_number })
                });
            return Some(record);
        }
    }
}
