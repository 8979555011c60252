//! TCX format adapter.
//!
//! TCX trackpoints are read as four parallel value streams (position,
//! altitude, time, heart rate), the way Garmin's own tooling exposes them:
//! each stream is compacted to the trackpoints that carry the field, so the
//! streams may have unequal lengths. They are zipped positionally with
//! longest-stream semantics - shorter streams pad with missing values,
//! never truncate - and the result converts into the shared GPX-flavored
//! track model (one track, one segment).

use std::fs;
use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};
use itertools::Itertools;
use roxmltree::{Document, Node};
use tracing::{debug, error};

use crate::adapters::error::AdapterError;
use crate::adapters::gpx::TrackFile;
use crate::core::model::{Point, UNKNOWN_CREATOR};

/// TCX timestamps use a fixed fractional-seconds UTC format; anything else
/// is a fatal parse error for the file.
const TCX_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Read a TCX file and convert it into the shared track model.
pub fn read(path: &Path) -> Result<TrackFile, AdapterError> {
    let content = fs::read_to_string(path).map_err(|source| AdapterError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&content, path)
}

pub(crate) fn parse(content: &str, path: &Path) -> Result<TrackFile, AdapterError> {
    let doc = Document::parse(content).map_err(|source| AdapterError::Xml {
        path: path.to_path_buf(),
        source,
    })?;

    if let Some(sport) = doc
        .descendants()
        .find(|n| is_elem(*n, "Activity"))
        .and_then(|n| n.attribute("Sport"))
    {
        debug!("TCX activity sport: {sport}");
    }

    let trackpoints: Vec<Node> = doc
        .descendants()
        .filter(|n| is_elem(*n, "Trackpoint"))
        .collect();

    // Parallel value streams, each compacted to the points that carry it
    let positions: Vec<(f64, f64)> = trackpoints
        .iter()
        .filter_map(|tp| parse_position(*tp))
        .collect();

    let altitudes: Vec<f64> = trackpoints
        .iter()
        .filter_map(|tp| child_text(*tp, "AltitudeMeters"))
        .filter_map(|t| match t.trim().parse::<f64>() {
            Ok(v) => Some(v),
            Err(e) => {
                error!("bad AltitudeMeters {t:?} in {}: {e}", path.display());
                None
            }
        })
        .collect();

    let mut times = Vec::new();
    for text in trackpoints.iter().filter_map(|tp| child_text(*tp, "Time")) {
        let naive = NaiveDateTime::parse_from_str(text, TCX_TIME_FORMAT).map_err(|source| {
            AdapterError::Timestamp {
                path: path.to_path_buf(),
                value: text.to_string(),
                source,
            }
        })?;
        times.push(naive.and_utc());
    }

    let heart_rates: Vec<u32> = trackpoints
        .iter()
        .filter_map(|tp| {
            tp.children()
                .find(|n| is_elem(*n, "HeartRateBpm"))
                .and_then(|bpm| child_text(bpm, "Value"))
        })
        .filter_map(|t| match t.trim().parse::<u32>() {
            Ok(v) => Some(v),
            Err(e) => {
                error!("bad HeartRateBpm value {t:?} in {}: {e}", path.display());
                None
            }
        })
        .collect();

    let points = zip_streams(positions, altitudes, times, heart_rates);
    debug!("extracted {} TCX points from {}", points.len(), path.display());

    // One track, one segment, no TCX-side document metadata: creator falls
    // back to the sentinel and the merge engine resolves the rest.
    Ok(TrackFile {
        creator: UNKNOWN_CREATOR.to_string(),
        points,
        ..TrackFile::default()
    })
}

/// Zip the four streams with longest-stream semantics. A point without a
/// time cannot be ordered and is dropped with an error log.
fn zip_streams(
    positions: Vec<(f64, f64)>,
    altitudes: Vec<f64>,
    times: Vec<DateTime<Utc>>,
    heart_rates: Vec<u32>,
) -> Vec<Point> {
    let coords = positions
        .into_iter()
        .map(Some)
        .zip_longest(altitudes.into_iter().map(Some))
        .map(|pair| pair.or_default());

    let vitals = times
        .into_iter()
        .map(Some)
        .zip_longest(heart_rates.into_iter().map(Some))
        .map(|pair| pair.or_default());

    let mut points = Vec::new();
    for ((position, elevation), (time, heart_rate)) in
        coords.zip_longest(vitals).map(|pair| pair.or_default())
    {
        let Some(timestamp) = time else {
            error!("TCX trackpoint without <Time>, dropping point");
            continue;
        };
        points.push(Point {
            position,
            elevation,
            timestamp,
            heart_rate,
        });
    }
    points
}

fn parse_position(tp: Node) -> Option<(f64, f64)> {
    let pos = tp.children().find(|n| is_elem(*n, "Position"))?;
    let lat = child_text(pos, "LatitudeDegrees")?.trim().parse::<f64>();
    let lon = child_text(pos, "LongitudeDegrees")?.trim().parse::<f64>();
    match (lat, lon) {
        (Ok(lat), Ok(lon)) => Some((lat, lon)),
        _ => {
            error!("bad Position coordinates in TCX trackpoint");
            None
        }
    }
}

fn child_text<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<&'a str> {
    node.children()
        .find(|n| is_elem(*n, name))
        .and_then(|n| n.text())
}

fn is_elem(n: Node, name: &str) -> bool {
    n.is_element() && n.tag_name().name() == name
}
