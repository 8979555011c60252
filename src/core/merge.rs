//! Merge engine.
//!
//! Ingests every input file through its format adapter, accumulates
//! document metadata, establishes one global chronological order over all
//! points, optionally repairs heart-rate gaps, and hands the combined
//! document to the composer. Any fatal adapter failure aborts the whole
//! merge before the output file is touched.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use owo_colors::OwoColorize;
use tracing::debug;

use crate::adapters::error::AdapterError;
use crate::adapters::gpx::TrackFile;
use crate::adapters::{gpx, tcx};
use crate::cli::{AppContext, Cli};
use crate::core::compose;
use crate::core::interp::interpolate_zero_hr;
use crate::core::model::{MergedDocument, TrackMetadata, UNKNOWN_CREATOR};
use crate::infra::scan::{self, InputKind};

/// CLI entry point: scan the input directory, merge, write the output.
pub fn run(args: Cli, ctx: &AppContext) -> Result<()> {
    let files = scan::find_activity_files(&args.input_dir)?;
    if files.is_empty() {
        bail!(
            "no .gpx or .tcx files found in {}",
            args.input_dir.display()
        );
    }

    let document = merge_files(&files, args.filter_zeros, ctx)?;
    let xml = compose::render(&document)?;

    // All-or-nothing: the document is fully rendered before the
    // destination is created or overwritten
    fs::write(&args.output_file, xml)
        .with_context(|| format!("writing {}", args.output_file.display()))?;

    if !ctx.quiet {
        println!(
            "Wrote {} points to {}",
            document.points.len(),
            args.output_file.display().magenta()
        );
    }
    Ok(())
}

/// Merge the given files into one combined document. File order determines
/// the relative order of points with equal timestamps.
pub fn merge_files(
    files: &[PathBuf],
    filter_zeros: bool,
    ctx: &AppContext,
) -> Result<MergedDocument> {
    let mut parsed = Vec::with_capacity(files.len());
    for path in files {
        if !ctx.quiet {
            println!("Reading file: {}", path.display().magenta());
        }

        let file = read_one(path)?;
        report_file(&file, ctx);
        parsed.push(file);
    }

    Ok(merge_tracks(parsed, filter_zeros))
}

/// Dispatch one file to the adapter matching its extension. Each file is
/// opened, fully read, and closed before the next is processed.
fn read_one(path: &Path) -> Result<TrackFile, AdapterError> {
    match InputKind::from_path(path) {
        Some(InputKind::Gpx) => gpx::read(path),
        Some(InputKind::Tcx) => tcx::read(path),
        None => Err(AdapterError::UnsupportedExtension {
            path: path.to_path_buf(),
        }),
    }
}

/// Pure merge over already-parsed files: accumulate metadata, concatenate,
/// stable-sort by timestamp, optionally interpolate.
fn merge_tracks(files: Vec<TrackFile>, filter_zeros: bool) -> MergedDocument {
    let mut metadata = TrackMetadata::default();
    let mut points = Vec::new();

    for file in files {
        // Root attributes merge last-wins, like the inputs were layered
        metadata.attributes.extend(file.attributes);

        // Creator and track name: first non-empty wins
        if metadata.creator == UNKNOWN_CREATOR && file.creator != UNKNOWN_CREATOR {
            metadata.creator = file.creator;
        }
        if metadata.track_name.is_empty() {
            metadata.track_name = file.track_name;
        }

        metadata.extensions.extend(file.extensions);
        points.extend(file.points);
    }

    // Stable sort: devices recording at identical second-resolution
    // timestamps keep their relative input order
    points.sort_by_key(|p| p.timestamp);

    if filter_zeros {
        points = interpolate_zero_hr(points);
    }

    MergedDocument { metadata, points }
}

fn report_file(file: &TrackFile, ctx: &AppContext) {
    if !ctx.quiet {
        println!("Creator: {}", file.creator.magenta());
        println!("Track Name: {}", file.track_name.magenta());
        println!("Found {} track points", file.points.len());
    }

    // Timing statistics only cover points that yielded a sort key
    if let (Some(first), Some(last)) = (file.points.first(), file.points.last()) {
        debug!("From: {} to {}", first.timestamp, last.timestamp);
    }
}
