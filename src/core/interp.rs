//! Heart-rate gap interpolation.
//!
//! Some devices record a heart-rate sample of zero when the sensor loses
//! contact. Within the subsequence of points that carry a heart-rate
//! sample, zero is treated as missing and repaired by linear interpolation
//! between the two nearest non-missing neighbors; gaps at the sequence
//! edges fill with the nearest available value. Interpolation is
//! best-effort: when no usable sample exists the input is returned
//! unchanged, logged, and the merge continues.

use tracing::{debug, error};

use crate::core::model::Point;

/// The missing-sample sentinel.
const MISSING_HR: u32 = 0;

/// Replace zero heart-rate samples in `points` with interpolated values.
/// Points without a heart-rate field are left untouched and do not
/// participate in the interpolation. Idempotent.
pub fn interpolate_zero_hr(mut points: Vec<Point>) -> Vec<Point> {
    let mut indices = Vec::new();
    let mut rates = Vec::new();
    for (i, point) in points.iter().enumerate() {
        if let Some(hr) = point.heart_rate {
            indices.push(i);
            rates.push(hr);
        }
    }

    if rates.is_empty() {
        debug!("no heart-rate samples present, skipping interpolation");
        return points;
    }

    let Some(filled) = interpolate_zeros(&rates) else {
        error!("all heart-rate samples are zero, returning untouched sequence");
        return points;
    };

    for (&i, &hr) in indices.iter().zip(&filled) {
        points[i].heart_rate = Some(hr);
    }

    debug!("interpolated heart rates over {} samples", filled.len());
    points
}

/// Linear interpolation over the zero sentinel with edge fill. Returns
/// `None` when the series holds no non-missing value to anchor on.
fn interpolate_zeros(values: &[u32]) -> Option<Vec<u32>> {
    let known: Vec<usize> = (0..values.len())
        .filter(|&i| values[i] != MISSING_HR)
        .collect();
    if known.is_empty() {
        return None;
    }

    let mut out = Vec::with_capacity(values.len());
    for i in 0..values.len() {
        if values[i] != MISSING_HR {
            out.push(values[i]);
            continue;
        }

        let prev = known.iter().rev().find(|&&k| k < i).copied();
        let next = known.iter().find(|&&k| k > i).copied();

        let filled = match (prev, next) {
            (Some(p), Some(n)) => {
                let lo = values[p] as f64;
                let hi = values[n] as f64;
                let t = (i - p) as f64 / (n - p) as f64;
                (lo + (hi - lo) * t).round() as u32
            }
            // Edge gaps take the nearest available sample
            (Some(p), None) => values[p],
            (None, Some(n)) => values[n],
            (None, None) => unreachable!("known is non-empty"),
        };
        out.push(filled);
    }

    Some(out)
}
