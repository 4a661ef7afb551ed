//! `tabchart` is a CLI tool that reads tabular text from stdin and either prints it as records or plots
//! its numeric columns as a line chart in the terminal.
//!
//! `tabchart` reads CSV/TSV, a JSON array of objects, JSON lines, or tables rendered as text (markdown,
//! `psql` output, or box-drawn tables with borders).
//!
//! # Example usage:
//!
//! ## Charting
//! ```sh
//! # Plot every numeric column of a CSV
//! cat prices.csv | tabchart -f csv
//! # Plot one column against a date column, sorted by date
//! cat prices.csv | tabchart -f csv -x date -s close --sort
//! # Plot two columns of newline-delimited JSON, in red and blue, 60 points wide
//! cat metrics.jsonl | tabchart -f jsonl -s rx,tx -c red,blue -w 60
//! ```
//!
//! ## Rendered tables
//! ```sh
//! # `psql` output, the `(N rows)` trailer is skipped
//! psql -c 'select day, count(*) from visits group by day' | tabchart -f psql -x day
//! # Markdown tables, the `---|---` row below the header is skipped
//! cat README.md | tabchart -f md -o records
//! # Tables with an ASCII frame, e.g. the output of `mysql`
//! mysql -e 'select * from t' | tabchart -f ascii --borders --horizontal-separator -
//! ```
//!
//! ## Records
//! `-o records` prints each row as a JSON object keyed by the header, which is handy to check what
//! `tabchart` made of the input before charting it.
//! ```sh
//! # The first row is data, columns are named `col_0`, `col_1`, ...
//! cat /etc/passwd | tabchart -f csv -d ':' --no-headers -o records
//! ```
//!
//! # Design
//! Input is parsed in a single streaming pass. For text tables the stages are:
//! 1. Split the input into lines.
//! 2. With `--borders`, take the first line as the table border, drop every repeat of it and cut the
//!    outer delimiter off the remaining lines.
//! 3. Tokenize the lines on the delimiter with the `csv` crate, trimming the fields. Rendered tables skip
//!    rows that do not have as many fields as the first row, which removes rule lines such as
//!    `-----+-----` and trailers such as `(3 rows)`.
//! 4. Take the first row as the header (or name the columns `col_N`), drop rows made only of the
//!    horizontal separator character, and pair the remaining rows with the header.
//!
//! Records are printed as they are parsed. Charts need every record first, so the records are
//! collected, optionally sorted by the x-axis column, and each plotted column is converted to numbers.
//! Any value that is not a number ends the run with an error naming the row and column.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use runner::run;

use crate::config::{Format, OutputMode, RawConfig, resolve};

mod chart;
mod config;
mod limit;
mod parsers;
mod record;
mod runner;

/// `tabchart` reads tabular text from stdin and prints it as records or plots it as a line chart
#[derive(Debug, Parser)]
struct Args {
    /// The format of the incoming data
    #[arg(short, long, value_enum)]
    format: Format,
    /// Field delimiter (a single character, `\t` for tab). Defaults to `,` for csv and `|` for tables.
    #[arg(short, long, help_heading = "Parser")]
    delimiter: Option<String>,
    /// Quote character
    #[arg(long, help_heading = "Parser")]
    quote: Option<String>,
    /// Escape character inside quoted fields. Defaults to doubling the quote.
    #[arg(long, help_heading = "Parser")]
    escape: Option<String>,
    /// Lines starting with this character are ignored
    #[arg(long, help_heading = "Parser")]
    comment: Option<String>,
    /// Input encoding: utf8, ascii or latin1
    #[arg(long, help_heading = "Parser")]
    encoding: Option<String>,
    /// Trim whitespace around fields
    #[arg(long, help_heading = "Parser")]
    trim: bool,
    /// Trim whitespace before fields
    #[arg(long, help_heading = "Parser")]
    ltrim: bool,
    /// Trim whitespace after fields
    #[arg(long, help_heading = "Parser")]
    rtrim: bool,
    /// Skip empty lines
    #[arg(long, default_value_t = true, action = ArgAction::Set, help_heading = "Parser")]
    skip_empty_lines: bool,
    /// Skip rows that fail to parse instead of stopping with an error
    #[arg(long, help_heading = "Parser")]
    skip_lines_with_error: bool,
    /// The table has a border: the first line is repeated around it and rows start and end with the delimiter
    #[arg(long, help_heading = "Tables")]
    borders: bool,
    /// The first row is data. Columns are named `col_0`, `col_1`, ...
    #[arg(long, help_heading = "Tables")]
    no_headers: bool,
    /// Rows made only of this character are skipped (e.g. `-` for markdown)
    #[arg(long, help_heading = "Tables")]
    horizontal_separator: Option<String>,
    /// What to print
    #[arg(short, long, value_enum, default_value_t = OutputMode::Chart)]
    output: OutputMode,
    /// Column (name or zero-based index) holding the x-axis values
    #[arg(short, long, help_heading = "Chart")]
    x_axis: Option<String>,
    /// Columns (names or zero-based indices) to plot. Defaults to every numeric column.
    #[arg(short, long, value_delimiter = ',', help_heading = "Chart")]
    series: Vec<String>,
    /// Sort rows by the x-axis column
    #[arg(long, help_heading = "Chart")]
    sort: bool,
    /// Number of points to plot. Defaults to the terminal width.
    #[arg(short, long, help_heading = "Chart")]
    width: Option<usize>,
    /// Number of rows of the chart
    #[arg(short = 'H', long, help_heading = "Chart")]
    height: Option<usize>,
    /// Colors of the series, e.g. `red,lightblue`
    #[arg(short, long, value_delimiter = ',', help_heading = "Chart")]
    colors: Vec<String>,
    /// Maximum number of records to read
    #[arg(short = 'n', long)]
    limit: Option<usize>,
}

impl From<Args> for RawConfig {
    fn from(args: Args) -> Self {
        Self {
            format: args.format,
            delimiter: args.delimiter,
            quote: args.quote,
            escape: args.escape,
            comment: args.comment,
            encoding: args.encoding,
            trim: args.trim,
            ltrim: args.ltrim,
            rtrim: args.rtrim,
            skip_empty_lines: args.skip_empty_lines,
            skip_lines_with_error: args.skip_lines_with_error,
            borders: args.borders,
            headers: !args.no_headers,
            horizontal_separator: args.horizontal_separator,
            output: args.output,
            x_axis: args.x_axis,
            series: args.series,
            sort: args.sort,
            width: args.width,
            height: args.height,
            colors: args.colors,
            limit: args.limit,
        }
    }
}

/// Primary entrypoint for `tabchart`
fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let config = resolve(&args.into()).context("Invalid options")?;
    run(&config)
}
