//! Resolves the raw command line options into the configuration used to build the pipeline
//!
//! Format aliases (`tsv`, `md`, `psql`) are expanded here, once, so the parsers only ever see
//! one of the base formats (CSV, ASCII table, JSON array, JSON lines).

use std::str::FromStr;

use log::debug;
use thiserror::Error;

use crate::chart::color::{Color, ColorError};

/// Default number of rows used to draw a chart
pub const DEFAULT_CHART_HEIGHT: usize = 15;

/// Errors in the combination or values of the provided options
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Option `{option}` must be a single byte character, got {value:?}")]
    NotSingleByte { option: &'static str, value: String },
    #[error("Option `{option}` must be a single character, got {value:?}")]
    NotSingleChar { option: &'static str, value: String },
    #[error("Unsupported encoding {0:?}. Supported encodings are utf8, ascii and latin1")]
    UnsupportedEncoding(String),
    #[error("Sorting requires an x-axis column (`--x-axis`)")]
    SortWithoutXAxis,
    #[error("Chart height must be at least 1")]
    ZeroHeight,
    #[error("Chart width must be at least 1")]
    ZeroWidth,
    #[error(transparent)]
    Color(#[from] ColorError),
}

/// Input formats accepted on the command line, including aliases
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    Csv,
    /// Alias for csv with a tab delimiter
    Tsv,
    Json,
    Jsonl,
    Ascii,
    /// Alias for ascii with a `|` delimiter and `-` horizontal separator
    Md,
    /// Alias for ascii with a `|` delimiter
    Psql,
}

/// What to do with the parsed records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputMode {
    /// Plot numeric columns as a line chart
    #[default]
    Chart,
    /// Print one JSON object per record
    Records,
}

/// Text encoding of the input bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    #[default]
    Utf8,
    Ascii,
    Latin1,
}

impl FromStr for Encoding {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "utf8" | "utf-8" => Ok(Encoding::Utf8),
            "ascii" | "us-ascii" => Ok(Encoding::Ascii),
            "latin1" | "latin-1" | "binary" | "iso-8859-1" => Ok(Encoding::Latin1),
            _ => Err(ConfigError::UnsupportedEncoding(s.to_string())),
        }
    }
}

/// Options as provided by the user, before alias expansion and validation
#[derive(Debug, Clone)]
pub struct RawConfig {
    pub format: Format,
    pub delimiter: Option<String>,
    pub quote: Option<String>,
    pub escape: Option<String>,
    pub comment: Option<String>,
    pub encoding: Option<String>,
    pub trim: bool,
    pub ltrim: bool,
    pub rtrim: bool,
    pub skip_empty_lines: bool,
    pub skip_lines_with_error: bool,
    pub borders: bool,
    pub headers: bool,
    pub horizontal_separator: Option<String>,
    pub output: OutputMode,
    pub x_axis: Option<String>,
    pub series: Vec<String>,
    pub sort: bool,
    pub width: Option<usize>,
    pub height: Option<usize>,
    pub colors: Vec<String>,
    pub limit: Option<usize>,
}

impl RawConfig {
    /// Options with every setting at its default for the given format
    pub fn new(format: Format) -> Self {
        Self {
            format,
            delimiter: None,
            quote: None,
            escape: None,
            comment: None,
            encoding: None,
            trim: false,
            ltrim: false,
            rtrim: false,
            skip_empty_lines: true,
            skip_lines_with_error: false,
            borders: false,
            headers: true,
            horizontal_separator: None,
            output: OutputMode::default(),
            x_axis: None,
            series: Vec::new(),
            sort: false,
            width: None,
            height: None,
            colors: Vec::new(),
            limit: None,
        }
    }
}

/// Settings handed to the field tokenizer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizerConfig {
    pub delimiter: u8,
    pub quote: u8,
    pub escape: Option<u8>,
    pub comment: Option<u8>,
    pub encoding: Encoding,
    pub trim_start: bool,
    pub trim_end: bool,
    pub skip_empty_lines: bool,
    pub skip_lines_with_error: bool,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
            escape: None,
            comment: None,
            encoding: Encoding::Utf8,
            trim_start: false,
            trim_end: false,
            skip_empty_lines: true,
            skip_lines_with_error: false,
        }
    }
}

/// Settings for the delimited-text based formats (CSV and ASCII tables)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableConfig {
    pub tokenizer: TokenizerConfig,
    /// Strip the outer frame of the table before tokenizing
    pub borders: bool,
    /// Take the first row as the header instead of synthesizing `col_N` names
    pub headers: bool,
    /// Character making up rows that only separate the header from the data
    pub horizontal_separator: Option<char>,
}

/// The base input format with its settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputConfig {
    Csv(TableConfig),
    Ascii(TableConfig),
    Json,
    Jsonl,
}

/// Settings for rendering a chart
#[derive(Debug, Clone, PartialEq)]
pub struct ChartConfig {
    pub x_axis: Option<String>,
    pub series: Vec<String>,
    pub sort: bool,
    pub width: Option<usize>,
    pub height: usize,
    pub colors: Vec<Color>,
}

/// Where the records go
#[derive(Debug, Clone, PartialEq)]
pub enum OutputConfig {
    Records,
    Chart(ChartConfig),
}

/// Fully resolved configuration, ready to build the pipeline from
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub input: InputConfig,
    pub output: OutputConfig,
    /// Maximum number of records to pass to the output
    pub limit: Option<usize>,
}

/// Parses a character option which must fit in a single byte.
///
/// Accepts the escaped forms `\t` and `\\t` for a tab since shells make a literal tab awkward.
fn single_byte(option: &'static str, value: &str) -> Result<u8, ConfigError> {
    let unescaped = match value {
        "\\t" | "\\\\t" => "\t",
        other => other,
    };
    match unescaped.as_bytes() {
        [byte] => Ok(*byte),
        _ => Err(ConfigError::NotSingleByte {
            option,
            value: value.to_string(),
        }),
    }
}

fn single_char(option: &'static str, value: &str) -> Result<char, ConfigError> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(ConfigError::NotSingleChar {
            option,
            value: value.to_string(),
        }),
    }
}

fn optional_byte(option: &'static str, value: Option<&str>) -> Result<Option<u8>, ConfigError> {
    value.map(|v| single_byte(option, v)).transpose()
}

/// Builds the tokenizer settings shared by CSV and ASCII tables
fn tokenizer_config(
    raw: &RawConfig,
    default_delimiter: u8,
) -> Result<TokenizerConfig, ConfigError> {
    let delimiter =
        optional_byte("delimiter", raw.delimiter.as_deref())?.unwrap_or(default_delimiter);
    let quote = optional_byte("quote", raw.quote.as_deref())?.unwrap_or(b'"');
    let encoding = match raw.encoding.as_deref() {
        Some(encoding) => encoding.parse()?,
        None => Encoding::default(),
    };
    Ok(TokenizerConfig {
        delimiter,
        quote,
        escape: optional_byte("escape", raw.escape.as_deref())?,
        comment: optional_byte("comment", raw.comment.as_deref())?,
        encoding,
        trim_start: raw.trim || raw.ltrim,
        trim_end: raw.trim || raw.rtrim,
        skip_empty_lines: raw.skip_empty_lines,
        skip_lines_with_error: raw.skip_lines_with_error,
    })
}

fn table_config(
    raw: &RawConfig,
    tokenizer: TokenizerConfig,
    default_separator: Option<char>,
) -> Result<TableConfig, ConfigError> {
    let horizontal_separator = match raw.horizontal_separator.as_deref() {
        Some(separator) => Some(single_char("horizontal-separator", separator)?),
        None => default_separator,
    };
    Ok(TableConfig {
        tokenizer,
        borders: raw.borders,
        headers: raw.headers,
        horizontal_separator,
    })
}

/// ASCII tables are always trimmed and skip rows that fail to tokenize, which is how rule lines
/// and trailers such as psql's `(3 rows)` drop out
fn ascii_config(
    raw: &RawConfig,
    default_separator: Option<char>,
) -> Result<InputConfig, ConfigError> {
    let mut tokenizer = tokenizer_config(raw, b'|')?;
    tokenizer.trim_start = true;
    tokenizer.trim_end = true;
    tokenizer.skip_lines_with_error = true;
    Ok(InputConfig::Ascii(table_config(raw, tokenizer, default_separator)?))
}

fn input_config(raw: &RawConfig) -> Result<InputConfig, ConfigError> {
    match raw.format {
        Format::Csv => {
            let tokenizer = tokenizer_config(raw, b',')?;
            Ok(InputConfig::Csv(table_config(raw, tokenizer, None)?))
        }
        Format::Tsv => {
            let tokenizer = tokenizer_config(raw, b'\t')?;
            Ok(InputConfig::Csv(table_config(raw, tokenizer, None)?))
        }
        Format::Ascii | Format::Psql => ascii_config(raw, None),
        Format::Md => ascii_config(raw, Some('-')),
        Format::Json => Ok(InputConfig::Json),
        Format::Jsonl => Ok(InputConfig::Jsonl),
    }
}

fn output_config(raw: &RawConfig) -> Result<OutputConfig, ConfigError> {
    match raw.output {
        OutputMode::Records => Ok(OutputConfig::Records),
        OutputMode::Chart => {
            if raw.sort && raw.x_axis.is_none() {
                return Err(ConfigError::SortWithoutXAxis);
            }
            let height = raw.height.unwrap_or(DEFAULT_CHART_HEIGHT);
            if height == 0 {
                return Err(ConfigError::ZeroHeight);
            }
            if raw.width == Some(0) {
                return Err(ConfigError::ZeroWidth);
            }
            let colors = raw
                .colors
                .iter()
                .map(|name| name.parse::<Color>())
                .collect::<Result<Vec<_>, _>>()?;
            Ok(OutputConfig::Chart(ChartConfig {
                x_axis: raw.x_axis.clone(),
                series: raw.series.clone(),
                sort: raw.sort,
                width: raw.width,
                height,
                colors,
            }))
        }
    }
}

/// Expands aliases and validates the raw options
pub fn resolve(raw: &RawConfig) -> Result<ResolvedConfig, ConfigError> {
    let input = input_config(raw)?;
    let output = output_config(raw)?;
    // a chart draws one record per column, so a width bounds the records needed
    let limit = match &output {
        OutputConfig::Chart(chart) => match (raw.limit, chart.width) {
            (Some(limit), Some(width)) => Some(limit.min(width)),
            (limit, width) => limit.or(width),
        },
        OutputConfig::Records => raw.limit,
    };
    let resolved = ResolvedConfig {
        input,
        output,
        limit,
    };
    debug!("Resolved configuration: {:?}", resolved);
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(config: &ResolvedConfig) -> &TableConfig {
        match &config.input {
            InputConfig::Csv(table) | InputConfig::Ascii(table) => table,
            other => panic!("Expected a table format, got {:?}", other),
        }
    }

    #[test]
    fn test_tsv_expands_to_csv_with_tab() {
        let config = resolve(&RawConfig::new(Format::Tsv)).unwrap();
        assert!(matches!(config.input, InputConfig::Csv(_)));
        assert_eq!(table(&config).tokenizer.delimiter, b'\t');
    }

    #[test]
    fn test_md_expands_to_ascii_with_separator() {
        let config = resolve(&RawConfig::new(Format::Md)).unwrap();
        assert!(matches!(config.input, InputConfig::Ascii(_)));
        let table = table(&config);
        assert_eq!(table.tokenizer.delimiter, b'|');
        assert_eq!(table.horizontal_separator, Some('-'));
        assert!(table.tokenizer.trim_start && table.tokenizer.trim_end);
        assert!(table.tokenizer.skip_lines_with_error);
    }

    #[test]
    fn test_psql_expands_to_ascii_without_separator() {
        let config = resolve(&RawConfig::new(Format::Psql)).unwrap();
        let table = table(&config);
        assert_eq!(table.tokenizer.delimiter, b'|');
        assert_eq!(table.horizontal_separator, None);
    }

    #[test]
    fn test_explicit_options_override_alias_defaults() {
        let raw = RawConfig {
            delimiter: Some(":".to_string()),
            horizontal_separator: Some("=".to_string()),
            ..RawConfig::new(Format::Md)
        };
        let config = resolve(&raw).unwrap();
        assert_eq!(table(&config).tokenizer.delimiter, b':');
        assert_eq!(table(&config).horizontal_separator, Some('='));
    }

    #[test]
    fn test_escaped_tab_delimiter() {
        let raw = RawConfig {
            delimiter: Some("\\t".to_string()),
            ..RawConfig::new(Format::Csv)
        };
        assert_eq!(table(&resolve(&raw).unwrap()).tokenizer.delimiter, b'\t');
    }

    #[test]
    fn test_invalid_options() {
        let raw = RawConfig {
            delimiter: Some("||".to_string()),
            ..RawConfig::new(Format::Csv)
        };
        assert!(matches!(resolve(&raw), Err(ConfigError::NotSingleByte { .. })));

        let raw = RawConfig {
            encoding: Some("utf16".to_string()),
            ..RawConfig::new(Format::Csv)
        };
        assert!(matches!(resolve(&raw), Err(ConfigError::UnsupportedEncoding(_))));

        let raw = RawConfig {
            sort: true,
            ..RawConfig::new(Format::Json)
        };
        assert!(matches!(resolve(&raw), Err(ConfigError::SortWithoutXAxis)));

        let raw = RawConfig {
            colors: vec!["ultraviolet".to_string()],
            ..RawConfig::new(Format::Json)
        };
        assert!(matches!(resolve(&raw), Err(ConfigError::Color(_))));

        let raw = RawConfig {
            width: Some(0),
            ..RawConfig::new(Format::Csv)
        };
        assert!(matches!(resolve(&raw), Err(ConfigError::ZeroWidth)));

        let raw = RawConfig {
            height: Some(0),
            ..RawConfig::new(Format::Csv)
        };
        assert!(matches!(resolve(&raw), Err(ConfigError::ZeroHeight)));
    }

    #[test]
    fn test_chart_width_limits_records() {
        let raw = RawConfig {
            width: Some(40),
            ..RawConfig::new(Format::Jsonl)
        };
        assert_eq!(resolve(&raw).unwrap().limit, Some(40));

        let raw = RawConfig {
            width: Some(40),
            limit: Some(10),
            ..RawConfig::new(Format::Jsonl)
        };
        assert_eq!(resolve(&raw).unwrap().limit, Some(10));

        let raw = RawConfig {
            width: Some(40),
            output: OutputMode::Records,
            ..RawConfig::new(Format::Jsonl)
        };
        assert_eq!(resolve(&raw).unwrap().limit, None);
    }
}
