use std::io::{self, Write};

use serde::Serialize;
use tickrange_core::{Outcome, StatisticsRecord};

use crate::cli::OutputFormat;
use crate::commands::{CommandOutput, FetchReport, SourcesReport};
use crate::error::CliError;

const FETCH_HEADERS: [&str; 9] = [
    "Symbol",
    "Current Price",
    "52W Low",
    "52W High",
    "From Low",
    "From High",
    "% to Low",
    "Low Date",
    "High Date",
];

const SOURCES_HEADERS: [&str; 6] = [
    "Source",
    "Base URL",
    "Credential",
    "Budget",
    "Window",
    "Spacing",
];

const NOT_AVAILABLE: &str = "N/A";

pub fn render(output: &CommandOutput, format: OutputFormat, pretty: bool) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut writer = stdout.lock();
    render_to(&mut writer, output, format, pretty)?;
    writer.flush()?;
    Ok(())
}

fn render_to<W: Write>(
    writer: &mut W,
    output: &CommandOutput,
    format: OutputFormat,
    pretty: bool,
) -> Result<(), CliError> {
    let text = match (format, output) {
        (OutputFormat::Json, CommandOutput::Fetch(report)) => to_json(report, pretty)?,
        (OutputFormat::Json, CommandOutput::Sources(report)) => to_json(report, pretty)?,
        (OutputFormat::Table, CommandOutput::Fetch(report)) => fetch_table(report),
        (OutputFormat::Table, CommandOutput::Sources(report)) => sources_table(report),
    };
    writeln!(writer, "{text}")?;
    Ok(())
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String, CliError> {
    let payload = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(payload)
}

fn fetch_table(report: &FetchReport) -> String {
    let rows: Vec<Vec<String>> = report.result.outcomes.iter().map(outcome_row).collect();

    let mut text = layout(&FETCH_HEADERS, &rows);
    if let Some(note) = &report.coverage_note {
        text.push_str(&format!("\nNote: {note}"));
    }
    text.push('\n');
    text.push_str(&report.result.summary());
    text.push('\n');
    text.push_str(&format!("Last updated: {}", report.generated_at));
    text
}

fn outcome_row(outcome: &Outcome) -> Vec<String> {
    match outcome {
        Outcome::Success(record) => record_row(record),
        Outcome::Failure { symbol, reason, .. } => {
            let mut row = vec![symbol.to_string()];
            row.extend(std::iter::repeat(reason.label().to_owned()).take(FETCH_HEADERS.len() - 1));
            row
        }
    }
}

fn record_row(record: &StatisticsRecord) -> Vec<String> {
    vec![
        record.symbol.to_string(),
        format_currency(record.current_price),
        format_currency(record.period_low),
        format_currency(record.period_high),
        format_ratio(record.distance_from_low),
        format_ratio(record.distance_from_high),
        format_percent(record.percent_to_low),
        record.low_date.format_iso(),
        record.high_date.format_iso(),
    ]
}

fn sources_table(report: &SourcesReport) -> String {
    let rows: Vec<Vec<String>> = report
        .sources
        .iter()
        .map(|source| {
            let credential = match (source.credential_env, source.credential_configured) {
                (None, _) => String::from("none"),
                (Some(env), true) => format!("{env} (set)"),
                (Some(env), false) => format!("{env} (missing)"),
            };
            vec![
                source.id.to_string(),
                source.base_url.to_owned(),
                credential,
                source
                    .rate_budget
                    .map_or_else(|| String::from("unbounded"), |budget| budget.to_string()),
                format!("{}ms", source.window_ms),
                source
                    .request_spacing_ms
                    .map_or_else(|| String::from("-"), |spacing| format!("{spacing}ms")),
            ]
        })
        .collect();

    layout(&SOURCES_HEADERS, &rows)
}

/// Left-aligned columns separated by two spaces, with a dashed rule under
/// the header.
fn layout(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|header| header.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let render_line = |cells: Vec<&str>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_owned()
    };

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(render_line(headers.to_vec()));
    lines.push(
        widths
            .iter()
            .map(|width| "-".repeat(*width))
            .collect::<Vec<_>>()
            .join("  "),
    );
    for row in rows {
        lines.push(render_line(row.iter().map(String::as_str).collect()));
    }
    lines.join("\n")
}

fn format_currency(value: f64) -> String {
    format!("${value:.2}")
}

fn format_ratio(value: Option<f64>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_owned(), |ratio| format!("{ratio:.4}"))
}

fn format_percent(value: Option<f64>) -> String {
    value.map_or_else(
        || NOT_AVAILABLE.to_owned(),
        |ratio| format!("{:.2}%", ratio * 100.0),
    )
}
