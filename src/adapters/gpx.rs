//! GPX 1.1 format adapter.
//!
//! Reads one GPX document into the shared track model: root attributes
//! (including xmlns declarations), creator, first track's name and
//! extensions, and the ordered track points with the vendor heart-rate
//! extension when present.
//!
//! Error tiers follow the merge contract: a file-open or parse failure is
//! fatal and propagates; a missing track, name, or extensions block is
//! recoverable - logged at error level, substituted with a typed default.

use std::path::Path;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use roxmltree::{Document, Node};
use tracing::{debug, error};

use crate::adapters::error::AdapterError;
use crate::adapters::repair;
use crate::core::model::{Point, UNKNOWN_CREATOR, XmlFragment};

/// One parsed input file in the shared GPX-flavored model. Both adapters
/// produce this; the merge engine consumes it.
#[derive(Clone, Debug, Default)]
pub struct TrackFile {
    /// Root-element attributes, xmlns declarations included
    pub attributes: IndexMap<String, String>,
    /// Document creator, or the unknown sentinel
    pub creator: String,
    /// Track name, empty when absent
    pub track_name: String,
    /// Structural children of the track's `<extensions>` block
    pub extensions: Vec<XmlFragment>,
    /// Track points in document order
    pub points: Vec<Point>,
}

/// Read a GPX file, repairing the known namespace defect if necessary.
pub fn read(path: &Path) -> Result<TrackFile, AdapterError> {
    let content = repair::load(path)?;
    parse(&content, path)
}

/// Parse GPX text that already passed the repair layer.
pub(crate) fn parse(content: &str, path: &Path) -> Result<TrackFile, AdapterError> {
    let doc = Document::parse(content).map_err(|source| AdapterError::Xml {
        path: path.to_path_buf(),
        source,
    })?;
    let root = doc.root_element();

    let mut attributes = IndexMap::new();
    for ns in root.namespaces() {
        let key = match ns.name() {
            Some(prefix) => format!("xmlns:{prefix}"),
            None => "xmlns".to_string(),
        };
        attributes.insert(key, ns.uri().to_string());
    }
    for attr in root.attributes() {
        attributes.insert(qualified_attr_name(root, &attr), attr.value().to_string());
    }

    let creator = root
        .attribute("creator")
        .unwrap_or(UNKNOWN_CREATOR)
        .to_string();

    let Some(track) = root.children().find(|n| is_elem(*n, "trk")) else {
        error!("no <trk> element in {}", path.display());
        return Ok(TrackFile {
            attributes,
            creator,
            ..TrackFile::default()
        });
    };

    let track_name = track
        .children()
        .find(|n| is_elem(*n, "name"))
        .and_then(|n| n.text())
        .map(str::to_string)
        .unwrap_or_else(|| {
            error!("no track <name> in {}", path.display());
            String::new()
        });

    // Only the track-level extensions block; structural children carry over,
    // text-only child nodes are dropped.
    let extensions = track
        .children()
        .find(|n| is_elem(*n, "extensions"))
        .map(|ext| {
            ext.children()
                .filter(|c| c.is_element())
                .map(fragment_from_node)
                .collect()
        })
        .unwrap_or_else(|| {
            error!("no track <extensions> in {}", path.display());
            Vec::new()
        });

    let points = track
        .descendants()
        .filter(|n| is_elem(*n, "trkpt"))
        .filter_map(|n| parse_point(n, path))
        .collect();

    Ok(TrackFile {
        attributes,
        creator,
        track_name,
        extensions,
        points,
    })
}

/// Extract one track point. Field failures other than the timestamp are
/// recoverable: the point is retained with the field absent. A point with
/// no usable timestamp has no sort key and is dropped with an error log.
fn parse_point(trkpt: Node, path: &Path) -> Option<Point> {
    let Some(time_text) = trkpt
        .children()
        .find(|n| is_elem(*n, "time"))
        .and_then(|n| n.text())
    else {
        error!("track point without <time> in {}, dropping point", path.display());
        return None;
    };
    let timestamp = match DateTime::parse_from_rfc3339(time_text) {
        Ok(dt) => dt.with_timezone(&Utc),
        Err(e) => {
            error!(
                "unparseable <time> {time_text:?} in {}: {e}, dropping point",
                path.display()
            );
            return None;
        }
    };

    let position = match (parse_coord(trkpt, "lat"), parse_coord(trkpt, "lon")) {
        (Some(lat), Some(lon)) => Some((lat, lon)),
        _ => None,
    };

    let elevation = trkpt
        .children()
        .find(|n| is_elem(*n, "ele"))
        .and_then(|n| n.text())
        .and_then(|t| match t.trim().parse::<f64>() {
            Ok(v) => Some(v),
            Err(e) => {
                error!("bad <ele> {t:?} in {}: {e}", path.display());
                None
            }
        });

    // Vendor heart-rate extension anywhere below the point
    let heart_rate = trkpt
        .descendants()
        .find(|n| is_elem(*n, "hr"))
        .and_then(|n| n.text())
        .and_then(|t| match t.trim().parse::<u32>() {
            Ok(v) => Some(v),
            Err(e) => {
                error!("bad heart-rate value {t:?} in {}: {e}", path.display());
                None
            }
        });

    Some(Point {
        position,
        elevation,
        timestamp,
        heart_rate,
    })
}

fn parse_coord(trkpt: Node, attr: &str) -> Option<f64> {
    let raw = trkpt.attribute(attr)?;
    match raw.parse::<f64>() {
        Ok(v) => Some(v),
        Err(e) => {
            debug!("bad {attr} attribute {raw:?}: {e}");
            None
        }
    }
}

/// Local-name element match; GPX documents may or may not carry the default
/// namespace, so prefix-free comparison keeps both shapes working.
fn is_elem(n: Node, name: &str) -> bool {
    n.is_element() && n.tag_name().name() == name
}

/// Rebuild the qualified (prefixed) element name so fragments serialize
/// back out exactly as they came in.
fn qualified_name(node: Node) -> String {
    let local = node.tag_name().name();
    match node
        .tag_name()
        .namespace()
        .and_then(|uri| node.lookup_prefix(uri))
    {
        Some(prefix) if !prefix.is_empty() => format!("{prefix}:{local}"),
        _ => local.to_string(),
    }
}

fn qualified_attr_name(node: Node, attr: &roxmltree::Attribute) -> String {
    match attr.namespace().and_then(|uri| node.lookup_prefix(uri)) {
        Some(prefix) if !prefix.is_empty() => format!("{prefix}:{}", attr.name()),
        _ => attr.name().to_string(),
    }
}

/// Deep-copy an element into an owned fragment. Element children keep
/// document order; surrounding whitespace text nodes are not carried.
fn fragment_from_node(node: Node) -> XmlFragment {
    XmlFragment {
        name: qualified_name(node),
        attributes: node
            .attributes()
            .map(|a| (qualified_attr_name(node, &a), a.value().to_string()))
            .collect(),
        text: node
            .text()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string),
        children: node
            .children()
            .filter(|c| c.is_element())
            .map(fragment_from_node)
            .collect(),
    }
}
