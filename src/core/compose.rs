//! Output document composition and serialization.
//!
//! Builds the combined GPX document as a fresh tree from the immutable
//! merged records - input documents are never aliased into the output -
//! and renders it as indented XML. The caller writes the rendered string
//! in one shot, so a failed merge never leaves a partial output file.

use anyhow::Result;
use chrono::SecondsFormat;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::core::model::{MergedDocument, Point, XmlFragment};

/// Creator attribute forced onto every merged document, regardless of the
/// source devices' creators.
pub const MERGE_CREATOR: &str = "gpxmerge";

const GPX_NS: &str = "http://www.topografix.com/GPX/1/1";
const GPXTPX_NS: &str = "http://www.garmin.com/xmlschemas/TrackPointExtension/v1";

type XmlWriter = Writer<Vec<u8>>;

/// Render the merged document as indented GPX text.
pub fn render(doc: &MergedDocument) -> Result<String> {
    let mut w = Writer::new_with_indent(Vec::new(), b' ', 2);
    w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    // Merged root attributes; defaults fill in whatever the sources did not
    // declare so the output re-parses under a strict reader.
    let mut attributes = doc.metadata.attributes.clone();
    attributes
        .entry("version".to_string())
        .or_insert_with(|| "1.1".to_string());
    attributes
        .entry("xmlns".to_string())
        .or_insert_with(|| GPX_NS.to_string());
    attributes
        .entry("xmlns:gpxtpx".to_string())
        .or_insert_with(|| GPXTPX_NS.to_string());
    attributes.insert("creator".to_string(), MERGE_CREATOR.to_string());

    let mut gpx = BytesStart::new("gpx");
    for (k, v) in &attributes {
        gpx.push_attribute((k.as_str(), v.as_str()));
    }
    w.write_event(Event::Start(gpx))?;

    w.write_event(Event::Start(BytesStart::new("trk")))?;
    if !doc.metadata.track_name.is_empty() {
        write_text_elem(&mut w, "name", &doc.metadata.track_name)?;
    }

    // One extensions block concatenating all per-file fragments
    if doc.metadata.extensions.is_empty() {
        w.write_event(Event::Empty(BytesStart::new("extensions")))?;
    } else {
        w.write_event(Event::Start(BytesStart::new("extensions")))?;
        for fragment in &doc.metadata.extensions {
            write_fragment(&mut w, fragment)?;
        }
        w.write_event(Event::End(BytesEnd::new("extensions")))?;
    }

    w.write_event(Event::Start(BytesStart::new("trkseg")))?;
    for point in &doc.points {
        write_point(&mut w, point)?;
    }
    w.write_event(Event::End(BytesEnd::new("trkseg")))?;

    w.write_event(Event::End(BytesEnd::new("trk")))?;
    w.write_event(Event::End(BytesEnd::new("gpx")))?;

    let mut xml = String::from_utf8(w.into_inner())?;
    xml.push('\n');
    Ok(xml)
}

fn write_point(w: &mut XmlWriter, point: &Point) -> Result<()> {
    let mut trkpt = BytesStart::new("trkpt");
    if let Some((lat, lon)) = point.position {
        let (lat, lon) = (lat.to_string(), lon.to_string());
        trkpt.push_attribute(("lat", lat.as_str()));
        trkpt.push_attribute(("lon", lon.as_str()));
    }
    w.write_event(Event::Start(trkpt))?;

    if let Some(ele) = point.elevation {
        write_text_elem(w, "ele", &ele.to_string())?;
    }

    let time = point
        .timestamp
        .to_rfc3339_opts(SecondsFormat::AutoSi, true);
    write_text_elem(w, "time", &time)?;

    if let Some(hr) = point.heart_rate {
        w.write_event(Event::Start(BytesStart::new("extensions")))?;
        w.write_event(Event::Start(BytesStart::new("gpxtpx:TrackPointExtension")))?;
        write_text_elem(w, "gpxtpx:hr", &hr.to_string())?;
        w.write_event(Event::End(BytesEnd::new("gpxtpx:TrackPointExtension")))?;
        w.write_event(Event::End(BytesEnd::new("extensions")))?;
    }

    w.write_event(Event::End(BytesEnd::new("trkpt")))?;
    Ok(())
}

fn write_fragment(w: &mut XmlWriter, fragment: &XmlFragment) -> Result<()> {
    let mut start = BytesStart::new(fragment.name.as_str());
    for (k, v) in &fragment.attributes {
        start.push_attribute((k.as_str(), v.as_str()));
    }

    if fragment.children.is_empty() && fragment.text.is_none() {
        w.write_event(Event::Empty(start))?;
        return Ok(());
    }

    w.write_event(Event::Start(start))?;
    if let Some(text) = &fragment.text {
        w.write_event(Event::Text(BytesText::new(text)))?;
    }
    for child in &fragment.children {
        write_fragment(w, child)?;
    }
    w.write_event(Event::End(BytesEnd::new(fragment.name.as_str())))?;
    Ok(())
}

fn write_text_elem(w: &mut XmlWriter, name: &str, text: &str) -> Result<()> {
    w.write_event(Event::Start(BytesStart::new(name)))?;
    w.write_event(Event::Text(BytesText::new(text)))?;
    w.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::gpx;
    use crate::core::model::{TrackMetadata, XmlFragment};
    use chrono::{Duration, TimeZone, Utc};
    use std::path::Path;

    fn sample_points(n: usize) -> Vec<Point> {
        let t0 = Utc.with_ymd_and_hms(2021, 6, 12, 8, 0, 0).unwrap();
        (0..n)
            .map(|i| Point {
                position: Some((42.0 + i as f64 * 0.01, -3.7)),
                elevation: Some(900.0 + i as f64),
                timestamp: t0 + Duration::seconds(5 * i as i64),
                heart_rate: if i % 2 == 0 { Some(120 + i as u32) } else { None },
            })
            .collect()
    }

    fn document(points: Vec<Point>) -> MergedDocument {
        MergedDocument {
            metadata: TrackMetadata {
                track_name: "Combined Ride".to_string(),
                ..TrackMetadata::default()
            },
            points,
        }
    }

    #[test]
    fn output_reparses_strictly() {
        let xml = render(&document(sample_points(3))).unwrap();
        roxmltree::Document::parse(&xml).expect("output must be well-formed");
    }

    #[test]
    fn round_trip_preserves_points() {
        let points = sample_points(5);
        let xml = render(&document(points.clone())).unwrap();

        let reread = gpx::parse(&xml, Path::new("out.gpx")).unwrap();
        assert_eq!(reread.points, points);
        assert_eq!(reread.track_name, "Combined Ride");
    }

    #[test]
    fn creator_is_forced_to_merge_identifier() {
        let mut doc = document(sample_points(1));
        doc.metadata
            .attributes
            .insert("creator".to_string(), "Garmin Edge 530".to_string());

        let xml = render(&doc).unwrap();
        let reread = gpx::parse(&xml, Path::new("out.gpx")).unwrap();
        assert_eq!(reread.creator, MERGE_CREATOR);
    }

    #[test]
    fn extension_fragments_carry_over() {
        let mut doc = document(sample_points(1));
        doc.metadata.extensions.push(XmlFragment {
            name: "gpxtpx:line".to_string(),
            attributes: vec![("color".to_string(), "c0c0c0".to_string())],
            text: None,
            children: Vec::new(),
        });

        let xml = render(&doc).unwrap();
        let reread = gpx::parse(&xml, Path::new("out.gpx")).unwrap();
        assert_eq!(reread.extensions, doc.metadata.extensions);
    }

    #[test]
    fn no_line_carries_trailing_whitespace() {
        let xml = render(&document(sample_points(2))).unwrap();
        assert!(xml.lines().all(|l| l == l.trim_end()));
    }

    #[test]
    fn escapes_reserved_characters_in_names() {
        let mut doc = document(sample_points(1));
        doc.metadata.track_name = "Hill & Dale <loop>".to_string();

        let xml = render(&doc).unwrap();
        let reread = gpx::parse(&xml, Path::new("out.gpx")).unwrap();
        assert_eq!(reread.track_name, "Hill & Dale <loop>");
    }
}
