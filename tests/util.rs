//! Shared test utilities for integration tests
//!
//! Fixture builders for small GPX and TCX documents used across
//! multiple test files.

#![allow(dead_code)]

/// Render a minimal valid GPX document. `points` are (RFC 3339 time,
/// optional heart rate) pairs; coordinates and elevation are synthesized.
pub fn gpx_fixture(creator: &str, name: &str, points: &[(&str, Option<u32>)]) -> String {
    let mut body = String::new();
    for (i, (time, hr)) in points.iter().enumerate() {
        let hr_block = match hr {
            Some(v) => format!(
                "<extensions><gpxtpx:TrackPointExtension>\
                 <gpxtpx:hr>{v}</gpxtpx:hr>\
                 </gpxtpx:TrackPointExtension></extensions>"
            ),
            None => String::new(),
        };
        body.push_str(&format!(
            "<trkpt lat=\"42.{i}\" lon=\"-3.7\"><ele>90{i}</ele>\
             <time>{time}</time>{hr_block}</trkpt>\n"
        ));
    }

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <gpx version=\"1.1\" creator=\"{creator}\" \
         xmlns=\"http://www.topografix.com/GPX/1/1\" \
         xmlns:gpxtpx=\"http://www.garmin.com/xmlschemas/TrackPointExtension/v1\">\n\
         <trk><name>{name}</name><extensions/><trkseg>\n{body}</trkseg></trk></gpx>\n"
    )
}

/// GPX document with the PowerWatch defect: `gpxtpx:hr` elements but no
/// namespace declaration for the prefix.
pub fn broken_namespace_gpx(points: &[(&str, u32)]) -> String {
    let mut body = String::new();
    for (time, hr) in points {
        body.push_str(&format!(
            "<trkpt lat=\"42.1\" lon=\"-3.7\"><time>{time}</time>\
             <extensions><gpxtpx:hr>{hr}</gpxtpx:hr></extensions></trkpt>\n"
        ));
    }

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <gpx version=\"1.1\" creator=\"MATRIX PowerWatch 2\">\n\
         <trk>\n<trkseg>\n{body}</trkseg></trk></gpx>\n"
    )
}

/// Render a minimal TCX document. `points` are (fractional-seconds UTC
/// time, heart rate) pairs.
pub fn tcx_fixture(points: &[(&str, u32)]) -> String {
    let mut body = String::new();
    for (i, (time, hr)) in points.iter().enumerate() {
        body.push_str(&format!(
            "<Trackpoint><Time>{time}</Time>\
             <Position><LatitudeDegrees>43.{i}</LatitudeDegrees>\
             <LongitudeDegrees>-2.9</LongitudeDegrees></Position>\
             <AltitudeMeters>80{i}</AltitudeMeters>\
             <HeartRateBpm><Value>{hr}</Value></HeartRateBpm></Trackpoint>\n"
        ));
    }

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <TrainingCenterDatabase \
         xmlns=\"http://www.garmin.com/xmlschemas/TrainingCenterDatabase/v2\">\n\
         <Activities><Activity Sport=\"Biking\">\
         <Id>2021-06-12T08:00:00.000Z</Id>\
         <Lap StartTime=\"2021-06-12T08:00:00.000Z\"><Track>\n{body}\
         </Track></Lap></Activity></Activities></TrainingCenterDatabase>\n"
    )
}
