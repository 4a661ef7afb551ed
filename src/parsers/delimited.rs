//! Parses delimited text (CSV, TSV and rendered ASCII tables) into records

use std::io::{BufRead, Read};

use log::debug;

use crate::config::TableConfig;

use super::{
    RecordStream, Transformed, border::BorderStrippedReader, rows::RowMaterializer,
    tokenizer::FieldTokenizer,
};

/// Chains border stripping (if enabled), tokenizing and row materializing over the reader
pub fn records<'a, R: BufRead + 'a>(config: &TableConfig, reader: R) -> RecordStream<'a> {
    let reader: Box<dyn Read + 'a> = if config.borders {
        debug!("Stripping table borders");
        Box::new(BorderStrippedReader::new(reader, [config.tokenizer.delimiter]))
    } else {
        Box::new(reader)
    };
    Box::new(Transformed::new(
        FieldTokenizer::new(reader, &config.tokenizer),
        RowMaterializer::new(config.headers, config.horizontal_separator),
    ))
}
