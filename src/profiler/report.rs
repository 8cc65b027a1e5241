//! Plain-text timing report

use crate::profiler::OperationKey;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::time::Duration;

/// Writes one report block
///
/// ```text
/// Run at Mon, 01 Jan 2024 00:00:00 +0000
/// wordcrawl::crawler::CrawlEngine#crawl took 0m 2s 45ms
/// ```
pub fn write_report<W: Write>(
    writer: &mut W,
    started_at: DateTime<Utc>,
    totals: &BTreeMap<OperationKey, Duration>,
) -> io::Result<()> {
    writeln!(writer, "Run at {}", started_at.to_rfc2822())?;
    for (key, elapsed) in totals {
        writeln!(writer, "{} took {}", key, format_duration(*elapsed))?;
    }
    writeln!(writer)?;
    Ok(())
}

fn format_duration(elapsed: Duration) -> String {
    let total_secs = elapsed.as_secs();
    format!(
        "{}m {}s {}ms",
        total_secs / 60,
        total_secs % 60,
        elapsed.subsec_millis()
    )
}
