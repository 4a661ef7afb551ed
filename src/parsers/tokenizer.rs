//! Splits delimited text into trimmed fields
//!
//! Tokenizing (quotes, escapes, comments) is left to the `csv` crate. This wrapper decodes and
//! trims the fields and decides what happens to rows that do not tokenize cleanly.

use std::io::Read;

use csv::{ByteRecord, ErrorKind, ReaderBuilder};
use log::{debug, warn};

use crate::config::{Encoding, TokenizerConfig};

use super::ParseError;

/// Yields one field sequence per input row
pub struct FieldTokenizer<R> {
    reader: csv::Reader<R>,
    config: TokenizerConfig,
    record: ByteRecord,
}

impl<R: Read> FieldTokenizer<R> {
    pub fn new(reader: R, config: &TokenizerConfig) -> Self {
        if !config.skip_empty_lines {
            warn!("Empty lines never produce rows, they are always skipped");
        }
        // a custom escape character replaces the RFC 4180 doubled quote
        let double_quote = config.escape.is_none_or(|escape| escape == config.quote);
        let reader = ReaderBuilder::new()
            .delimiter(config.delimiter)
            .quote(config.quote)
            .escape(config.escape.filter(|_| !double_quote))
            .double_quote(double_quote)
            .comment(config.comment)
            .has_headers(false)
            // rows must match the column count of the first row
            .flexible(false)
            .trim(csv::Trim::None)
            .from_reader(reader);
        Self {
            reader,
            config: config.clone(),
            record: ByteRecord::new(),
        }
    }

    fn decode_field(&self, bytes: &[u8]) -> Option<String> {
        let field = match self.config.encoding {
            Encoding::Utf8 => std::str::from_utf8(bytes).ok()?.to_string(),
            Encoding::Ascii if bytes.is_ascii() => String::from_utf8_lossy(bytes).into_owned(),
            Encoding::Ascii => return None,
            Encoding::Latin1 => bytes.iter().map(|&b| char::from(b)).collect(),
        };
        let field = match (self.config.trim_start, self.config.trim_end) {
            (true, true) => field.trim(),
            (true, false) => field.trim_start(),
            (false, true) => field.trim_end(),
            (false, false) => return Some(field),
        };
        Some(field.to_string())
    }

    fn decode_record(&self) -> Option<Vec<String>> {
        self.record
            .iter()
            .map(|bytes| self.decode_field(bytes))
            .collect()
    }

    fn line(&self) -> u64 {
        self.record.position().map_or(0, |pos| pos.line())
    }
}

/// Errors that only concern the row being read, after which reading can continue
fn is_row_error(e: &csv::Error) -> bool {
    matches!(
        e.kind(),
        ErrorKind::UnequalLengths { .. } | ErrorKind::Utf8 { .. }
    )
}

impl<R: Read> Iterator for FieldTokenizer<R> {
    type Item = Result<Vec<String>, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.reader.read_byte_record(&mut self.record) {
                Ok(false) => return None,
                Ok(true) => match self.decode_record() {
                    Some(fields) => return Some(Ok(fields)),
                    None if self.config.skip_lines_with_error => {
                        debug!("Skipping line {} with invalid encoding", self.line());
                    }
                    None => {
                        return Some(Err(ParseError::Encoding {
                            line: self.line(),
                            encoding: self.config.encoding,
                        }));
                    }
                },
                Err(e) if self.config.skip_lines_with_error && is_row_error(&e) => {
                    debug!("Skipping malformed row: {}", e);
                }
                Err(e) => return Some(Err(e.into())),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(input: &[u8], config: &TokenizerConfig) -> Vec<Result<Vec<String>, ParseError>> {
        FieldTokenizer::new(input, config).collect()
    }

    fn fields(input: &[u8], config: &TokenizerConfig) -> Vec<Vec<String>> {
        tokenize(input, config)
            .into_iter()
            .map(|row| row.unwrap())
            .collect()
    }

    fn ascii_config() -> TokenizerConfig {
        TokenizerConfig {
            delimiter: b'|',
            trim_start: true,
            trim_end: true,
            skip_lines_with_error: true,
            ..TokenizerConfig::default()
        }
    }

    #[test]
    fn test_trimmed_fields() {
        let rows = fields(b"  one | two \n   1 | foo\n", &ascii_config());
        assert_eq!(rows, vec![vec!["one", "two"], vec!["1", "foo"]]);
    }

    #[test]
    fn test_partial_trim() {
        let config = TokenizerConfig {
            trim_start: true,
            ..TokenizerConfig::default()
        };
        assert_eq!(fields(b" a , b \n", &config), vec![vec!["a ", "b "]]);

        let config = TokenizerConfig {
            trim_end: true,
            ..TokenizerConfig::default()
        };
        assert_eq!(fields(b" a , b \n", &config), vec![vec![" a", " b"]]);
    }

    #[test]
    fn test_skip_rows_with_wrong_field_count() {
        let rows = fields(b"one | two\n-----+-----\n1 | foo\n(1 row)\n   \n", &ascii_config());
        assert_eq!(rows, vec![vec!["one", "two"], vec!["1", "foo"]]);
    }

    #[test]
    fn test_wrong_field_count_is_fatal_without_skipping() {
        let rows = tokenize(b"a,b\n1\n2,3\n", &TokenizerConfig::default());
        assert_eq!(rows.len(), 3);
        assert!(matches!(rows[1], Err(ParseError::Csv(_))));
    }

    #[test]
    fn test_quotes_comments_and_escapes() {
        let config = TokenizerConfig {
            comment: Some(b'#'),
            ..TokenizerConfig::default()
        };
        let rows = fields(b"# comment\n\"a,b\",\"say \"\"hi\"\"\"\n", &config);
        assert_eq!(rows, vec![vec!["a,b", "say \"hi\""]]);

        let config = TokenizerConfig {
            escape: Some(b'\\'),
            ..TokenizerConfig::default()
        };
        let rows = fields(b"\"say \\\"hi\\\"\",x\n", &config);
        assert_eq!(rows, vec![vec!["say \"hi\"", "x"]]);
    }

    #[test]
    fn test_encodings() {
        let config = TokenizerConfig {
            encoding: Encoding::Latin1,
            ..TokenizerConfig::default()
        };
        assert_eq!(fields(b"caf\xe9,1\n", &config), vec![vec!["café", "1"]]);

        let rows = tokenize(b"caf\xe9,1\n", &TokenizerConfig::default());
        assert!(matches!(rows[0], Err(ParseError::Encoding { line: 1, .. })));

        let config = TokenizerConfig {
            encoding: Encoding::Ascii,
            skip_lines_with_error: true,
            ..TokenizerConfig::default()
        };
        assert_eq!(fields("a,b\né,c\nd,e\n".as_bytes(), &config), vec![vec!["a", "b"], vec!["d", "e"]]);
    }
}
