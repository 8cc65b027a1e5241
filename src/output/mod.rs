//! Output module for crawl results
//!
//! This module handles:
//! - Writing a [`CrawlResult`] as pretty-printed JSON
//! - Choosing between a result file and stdout

use crate::crawler::CrawlResult;
use crate::Result;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Writes a crawl result to `path`, or to stdout when no path is given
///
/// An existing file at `path` is replaced.
///
/// # Arguments
///
/// * `result` - The crawl result to write
/// * `path` - Destination file, if any
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the result
/// * `Err(CrawlError)` - Failed to create or write the destination
pub fn write_result(result: &CrawlResult, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            write_result_to(result, &mut writer)?;
            writer.flush()?;
            tracing::info!("Crawl result written to {}", path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            write_result_to(result, &mut handle)?;
        }
    }
    Ok(())
}

/// Serializes a crawl result as pretty JSON followed by a newline
pub fn write_result_to<W: Write>(result: &CrawlResult, writer: &mut W) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, result)?;
    writeln!(writer)?;
    Ok(())
}
