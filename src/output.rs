//! Output formatting and persistence for fetch results.
//!
//! Supports pretty JSON on stdout and CSV append of route statistics.

use anyhow::Result;
use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use tracing::debug;

use crate::stats::RouteStats;

/// Writes `value` to stdout as pretty-printed JSON.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}

/// One CSV row: a route's counts at a snapshot instant.
#[derive(Debug, Serialize)]
struct StatsRow<'a> {
    snapshot: DateTime<Utc>,
    route_number: &'a str,
    route_name: &'a str,
    north_eastbound: usize,
    south_westbound: usize,
    total_active: usize,
}

/// Appends every record in `stats` as a row stamped with `snapshot`.
///
/// Creates the file with headers if it does not already exist.
pub fn append_stats(path: &str, stats: &[RouteStats], snapshot: DateTime<Utc>) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, rows = stats.len(), "Appending CSV records");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    for s in stats {
        writer.serialize(StatsRow {
            snapshot,
            route_number: &s.route_number,
            route_name: &s.route_name,
            north_eastbound: s.north_eastbound,
            south_westbound: s.south_westbound,
            total_active: s.total_active,
        })?;
    }
    writer.flush()?;

    Ok(())
}
