//! Namespace-repair layer for GPX input.
//!
//! Heart-rate data from the MATRIX PowerWatch 2 misses the namespace
//! definition for its proprietary `gpxtpx:*` elements, which a strict XML
//! parser rightly rejects. When the strict parse fails we apply exactly one
//! heuristic rewrite to an in-memory scratch copy - declare the missing
//! prefix on the first track-opening tag - and retry the parse once. A
//! second failure propagates as fatal. No other byte of the document is
//! altered.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::adapters::error::AdapterError;

/// Namespace URI injected for the undeclared `gpxtpx` prefix.
const TRACKPOINT_NS: &str = "http://www.example.org/trackpoint/";

/// Read `path` and return content that is known to parse as well-formed
/// XML, repairing the missing trackpoint namespace declaration if needed.
pub fn load(path: &Path) -> Result<String, AdapterError> {
    let content = fs::read_to_string(path).map_err(|source| AdapterError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    if let Err(first) = roxmltree::Document::parse(&content) {
        debug!(
            "strict parse of {} failed ({first}), retrying with gpxtpx namespace declared",
            path.display()
        );

        let patched = declare_trackpoint_namespace(&content);
        return match roxmltree::Document::parse(&patched) {
            Ok(_) => Ok(patched),
            // The defect was something else entirely; propagate the retry error
            Err(source) => Err(AdapterError::Xml {
                path: path.to_path_buf(),
                source,
            }),
        };
    }

    Ok(content)
}

/// Declare the `gpxtpx` namespace on the first bare `<trk>` opening tag.
/// The defective firmware emits the tag without attributes, so a plain
/// token replacement is exact.
fn declare_trackpoint_namespace(content: &str) -> String {
    content.replacen(
        "<trk>",
        &format!("<trk xmlns:gpxtpx=\"{TRACKPOINT_NS}\">"),
        1,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const BROKEN: &str = "<?xml version=\"1.0\"?>\n\
        <gpx version=\"1.1\" creator=\"MATRIX PowerWatch 2\">\n\
        <trk>\n\
        <trkseg>\n\
        <trkpt lat=\"1.0\" lon=\"2.0\"><time>2021-06-12T08:00:00Z</time>\n\
        <extensions><gpxtpx:hr>120</gpxtpx:hr></extensions></trkpt>\n\
        </trkseg>\n\
        </trk>\n\
        </gpx>\n";

    fn write_temp(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().expect("tempfile");
        f.write_all(content.as_bytes()).expect("write");
        f
    }

    #[test]
    fn missing_namespace_parses_after_one_repair() {
        let f = write_temp(BROKEN);
        let repaired = load(f.path()).expect("repair should succeed");

        // The repaired content is well-formed and the hr element resolved
        let doc = roxmltree::Document::parse(&repaired).unwrap();
        assert!(
            doc.descendants()
                .any(|n| n.is_element() && n.tag_name().name() == "hr")
        );
    }

    #[test]
    fn repair_touches_only_the_track_tag() {
        let f = write_temp(BROKEN);
        let repaired = load(f.path()).unwrap();

        let expected = BROKEN.replacen(
            "<trk>",
            &format!("<trk xmlns:gpxtpx=\"{TRACKPOINT_NS}\">"),
            1,
        );
        assert_eq!(repaired, expected);
    }

    #[test]
    fn well_formed_input_passes_through_unchanged() {
        let ok = "<?xml version=\"1.0\"?><gpx version=\"1.1\"><trk/></gpx>";
        let f = write_temp(ok);
        assert_eq!(load(f.path()).unwrap(), ok);
    }

    #[test]
    fn unrelated_structural_defect_still_fails() {
        // Unclosed element; the namespace repair cannot help here
        let bad = "<?xml version=\"1.0\"?><gpx><trk><trkseg></trk></gpx>";
        let f = write_temp(bad);
        let err = load(f.path()).unwrap_err();
        assert!(matches!(err, AdapterError::Xml { .. }));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load(Path::new("definitely/not/here.gpx")).unwrap_err();
        assert!(matches!(err, AdapterError::Io { .. }));
    }
}
