//! Shared track-point and document model.
//!
//! `Point` is the common currency between the format adapters and the merge
//! engine: adapters create points, the merge engine orders them, and the
//! composer embeds them into the output document. Points are never mutated
//! in place, with one exception: the heart-rate interpolator replaces zero
//! samples in points it owns during its rewrite pass.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;

/// Sentinel creator used when a source document carries none.
pub const UNKNOWN_CREATOR: &str = "UNK";

/// One recorded track point. The timestamp is the sole required field and
/// the sole sort key for merging.
#[derive(Clone, Debug, PartialEq)]
pub struct Point {
    /// (latitude, longitude) in decimal degrees
    pub position: Option<(f64, f64)>,
    /// Elevation in meters
    pub elevation: Option<f64>,
    /// Recording time (UTC)
    pub timestamp: DateTime<Utc>,
    /// Heart rate in bpm; `Some(0)` is the missing-sample sentinel
    pub heart_rate: Option<u32>,
}

/// An opaque structural XML fragment carried from an input `<extensions>`
/// block into the output document. Attribute and child order is preserved.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct XmlFragment {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: Option<String>,
    pub children: Vec<XmlFragment>,
}

/// Document-level metadata accumulated across all input files.
#[derive(Clone, Debug)]
pub struct TrackMetadata {
    /// Root-element attributes, including xmlns declarations. Merged across
    /// files last-wins; the composer forces the creator afterwards.
    pub attributes: IndexMap<String, String>,
    /// Creator of the first file that declared one
    pub creator: String,
    /// First non-empty track name across merged files
    pub track_name: String,
    /// Per-file track extension fragments, in input order
    pub extensions: Vec<XmlFragment>,
}

impl Default for TrackMetadata {
    fn default() -> Self {
        Self {
            attributes: IndexMap::new(),
            creator: UNKNOWN_CREATOR.to_string(),
            track_name: String::new(),
            extensions: Vec::new(),
        }
    }
}

/// The combined in-memory document: created once by the merge engine,
/// consumed exactly once by the composer.
#[derive(Clone, Debug)]
pub struct MergedDocument {
    pub metadata: TrackMetadata,
    /// Sorted non-decreasing by timestamp
    pub points: Vec<Point>,
}
