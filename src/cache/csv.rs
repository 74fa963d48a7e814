//! Tabular export of the refactoring cache.
//!
//! One row per cached interval. The dump carries every metric field, so
//! reading it back reproduces the exact `interval -> metrics` mapping of the
//! session it came from.

use std::io::{BufRead, BufReader, Read, Write};

use crate::core::{Error, Result, Span};

use super::{CacheRow, ExtractionMetrics, RefactoringCache};

/// Column header of a cache dump.
pub const CSV_HEADER: &str = "from,to,feasible,reason,parameters,extracted_loc,reduction,\
new_method_cc,inherent,nesting_component,nesting_contributors,nesting";

const COLUMNS: usize = 12;

impl RefactoringCache<'_> {
    /// Write every cache entry as CSV, sorted by interval.
    pub fn write_csv<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(out, "{CSV_HEADER}")?;
        for row in self.rows() {
            writeln!(out, "{}", format_row(&row))?;
        }
        Ok(())
    }
}

fn format_row(row: &CacheRow) -> String {
    let m = &row.metrics;
    format!(
        "{},{},{},{},{},{},{},{},{},{},{},{}",
        row.span.start,
        row.span.end,
        u8::from(m.feasible),
        quote(&m.reason),
        m.parameter_count,
        m.extracted_line_count,
        m.reduction_of_complexity,
        m.complexity_of_new_method,
        m.inherent_component,
        m.nesting_component,
        m.nesting_contributors,
        m.nesting_depth,
    )
}

fn quote(reason: &str) -> String {
    format!("\"{}\"", reason.replace('"', "\"\""))
}

/// Re-read a dump produced by [`RefactoringCache::write_csv`].
pub fn read_csv<R: Read>(input: R) -> Result<Vec<CacheRow>> {
    let reader = BufReader::new(input);
    let mut rows = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if index == 0 {
            if line != CSV_HEADER {
                return Err(Error::import(1, "unrecognized cache dump header"));
            }
            continue;
        }
        if line.is_empty() {
            continue;
        }
        rows.push(parse_row(index + 1, &line)?);
    }
    Ok(rows)
}

fn parse_row(line_number: usize, line: &str) -> Result<CacheRow> {
    let fields = split_fields(line);
    if fields.len() != COLUMNS {
        return Err(Error::import(
            line_number,
            format!("expected {COLUMNS} columns, found {}", fields.len()),
        ));
    }
    let number = |index: usize| -> Result<u32> {
        fields[index].parse().map_err(|_| {
            Error::import(
                line_number,
                format!("column {} is not a number: {:?}", index + 1, fields[index]),
            )
        })
    };
    let offset = |index: usize| -> Result<usize> {
        fields[index].parse().map_err(|_| {
            Error::import(
                line_number,
                format!("column {} is not an offset: {:?}", index + 1, fields[index]),
            )
        })
    };

    let start = offset(0)?;
    let end = offset(1)?;
    if start >= end {
        return Err(Error::import(line_number, "interval is empty or inverted"));
    }
    let feasible = match fields[2].as_str() {
        "1" => true,
        "0" => false,
        other => {
            return Err(Error::import(
                line_number,
                format!("feasibility flag must be 0 or 1, found {other:?}"),
            ))
        }
    };

    Ok(CacheRow {
        span: Span::new(start, end),
        metrics: ExtractionMetrics {
            feasible,
            reason: fields[3].clone(),
            parameter_count: number(4)?,
            extracted_line_count: number(5)?,
            reduction_of_complexity: number(6)?,
            complexity_of_new_method: number(7)?,
            inherent_component: number(8)?,
            nesting_component: number(9)?,
            nesting_contributors: number(10)?,
            nesting_depth: number(11)?,
        },
    })
}

/// Split a CSV line on commas, honoring double-quoted fields with doubled
/// quotes as escapes.
fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }
    fields.push(field);
    fields
}
