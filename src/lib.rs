//! **gpxmerge** - Merge multi-device GPX/TCX activity recordings into one
//! time-ordered GPX track.
//!
//! Reads every supported activity file in a directory, establishes a global
//! chronological order across devices, optionally repairs zero heart-rate
//! samples by linear interpolation, and writes a single combined GPX file.

/// Command-line interface with clap integration
pub mod cli;

/// Core pipeline - point model, merge engine, interpolation, composition
pub mod core {
    /// Shared track-point and document model
    pub mod model;
    pub use model::{MergedDocument, Point, TrackMetadata, XmlFragment};

    /// Heart-rate gap interpolation (zero-sentinel repair)
    pub mod interp;
    pub use interp::interpolate_zero_hr;

    /// Merge engine - aggregate, sort, interpolate
    pub mod merge;
    pub use merge::run as merge_run;

    /// Output document composition and serialization
    pub mod compose;
    pub use compose::MERGE_CREATOR;
}

/// Format adapters - file path in, ordered points + metadata out
pub mod adapters {
    /// Typed fatal-tier adapter errors
    pub mod error;
    pub use error::AdapterError;

    /// Namespace-repair layer for a known-defective GPX firmware
    pub mod repair;

    /// GPX 1.1 reader (track, extensions, vendor heart-rate)
    pub mod gpx;
    pub use gpx::TrackFile;

    /// TCX reader - parallel value streams zipped into points
    pub mod tcx;
}

/// Infrastructure - logging and input discovery
pub mod infra {
    /// tracing-subscriber setup with env filter
    pub mod logging;

    /// Input directory scan for supported activity files
    pub mod scan;
    pub use scan::{InputKind, find_activity_files};
}

// Strategic re-exports for clean CLI interface
pub use crate::adapters::AdapterError;
pub use crate::cli::{AppContext, Cli};
pub use crate::core::{MergedDocument, Point, TrackMetadata, merge_run};
