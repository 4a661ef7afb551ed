//! Runs the parsing pipeline over stdin and writes the records or chart to stdout

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use log::debug;
use terminal_size::{Width, terminal_size};

use crate::{
    chart::{
        render::render_chart,
        select::{SelectionOptions, select_series},
    },
    config::{ChartConfig, OutputConfig, ResolvedConfig},
    limit::RecordLimiter,
    parsers::{RecordStream, record_stream},
    record::Record,
};

/// Columns taken by the y-axis labels and axis of a chart
const CHART_MARGIN: usize = 13;

/// Number of points that fit in a terminal of the given width, at least one
fn terminal_points(width: u16) -> usize {
    (width as usize).saturating_sub(CHART_MARGIN).max(1)
}

/// Prints each record as a JSON object on its own line
fn print_records<W: Write>(records: RecordStream, out: &mut W) -> Result<()> {
    let mut count = 0;
    for record in records {
        let record = record.context("Failed to parse input")?;
        serde_json::to_writer(&mut *out, &record).context("Failed to write record")?;
        writeln!(out)?;
        count += 1;
    }
    debug!("Printed {} records", count);
    Ok(())
}

/// Collects every record, then selects and renders the series
fn print_chart<W: Write>(records: RecordStream, config: &ChartConfig, out: &mut W) -> Result<()> {
    let records: Vec<Record> = records
        .collect::<Result<_, _>>()
        .context("Failed to parse input")?;
    debug!("Charting {} records", records.len());
    let options = SelectionOptions {
        x_axis: config.x_axis.as_deref(),
        series: &config.series,
        sort: config.sort,
    };
    let selection = select_series(records, &options).context("Failed to select chart series")?;
    let chart = render_chart(&selection, config.height, &config.colors);
    writeln!(out, "{}", chart)?;
    Ok(())
}

/// Parses `reader` according to `config` and writes the result to `out`
pub fn run_with<R: BufRead, W: Write>(
    config: &ResolvedConfig,
    reader: R,
    out: &mut W,
) -> Result<()> {
    let mut records = record_stream(&config.input, reader);
    if let Some(limit) = config.limit {
        debug!("Limiting input to {} records", limit);
        records = Box::new(RecordLimiter::new(records, limit));
    }
    match &config.output {
        OutputConfig::Records => print_records(records, out),
        OutputConfig::Chart(chart) => print_chart(records, chart, out),
    }
}

/// Runs the pipeline over stdin and stdout.
///
/// A chart without an explicit width is fitted to the terminal, if there is one.
pub fn run(config: &ResolvedConfig) -> Result<()> {
    let mut config = config.clone();
    if let OutputConfig::Chart(chart) = &config.output {
        if chart.width.is_none() && config.limit.is_none() {
            if let Some((Width(width), _)) = terminal_size() {
                let points = terminal_points(width);
                debug!("Fitting chart to terminal width, {} points", points);
                config.limit = Some(points);
            }
        }
    }
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_with(&config, stdin.lock(), &mut out)?;
    out.flush().context("Failed to flush stdout")
}
