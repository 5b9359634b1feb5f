//! Stateless joint geometry on already-filtered landmarks.
//!
//! Angles and valgus deviation are computed in metric world space. Any
//! missing or unreliable input yields `None` (or `0.0` for valgus, which is
//! never asserted from bad tracking) instead of NaN.

use crate::constants::{EPSILON, LEFT_HIP, RIGHT_HIP};
use crate::landmark::{Landmark, PoseLandmarks, Side};
use nalgebra::Vector3;

/// Angle at vertex `b` between rays `b→a` and `b→c`, in degrees `[0, 180]`.
///
/// Returns `None` if either ray has zero length.
#[must_use]
pub fn angle_between(a: &Vector3<f64>, b: &Vector3<f64>, c: &Vector3<f64>) -> Option<f64> {
    let ba = a - b;
    let bc = c - b;
    if ba.norm() < EPSILON || bc.norm() < EPSILON {
        return None;
    }
    // atan2 of (|cross|, dot) is already folded into [0, π]
    let radians = ba.cross(&bc).norm().atan2(ba.dot(&bc));
    Some(radians.to_degrees().clamp(0.0, 180.0))
}

/// Joint angle for three optional landmarks; `None` if any is missing
#[must_use]
pub fn angle(a: Option<&Landmark>, b: Option<&Landmark>, c: Option<&Landmark>) -> Option<f64> {
    angle_between(&a?.position(), &b?.position(), &c?.position())
}

/// Hip–knee–ankle angle of one leg, requiring confident landmarks
#[must_use]
pub fn knee_angle(pose: &PoseLandmarks, side: Side, min_confidence: f64) -> Option<f64> {
    angle(
        pose.confident(side.hip(), min_confidence),
        pose.confident(side.knee(), min_confidence),
        pose.confident(side.ankle(), min_confidence),
    )
}

/// Medial deviation of the knee from the hip–ankle line, normalized by hip
/// width.
///
/// `inward` points from this leg's hip toward the opposite hip; its length
/// is the hip width. Only deviation toward the midline counts, so the
/// result is never negative. Degenerate geometry returns `0.0`.
#[must_use]
pub fn knee_valgus_deviation(
    hip: &Vector3<f64>,
    knee: &Vector3<f64>,
    ankle: &Vector3<f64>,
    inward: &Vector3<f64>,
) -> f64 {
    let line = ankle - hip;
    let line_len_sq = line.norm_squared();
    let hip_width = inward.norm();
    if line_len_sq < EPSILON || hip_width < EPSILON {
        return 0.0;
    }

    let t = (knee - hip).dot(&line) / line_len_sq;
    let on_line = hip + line * t;
    let deviation = knee - on_line;

    let medial = deviation.dot(&(inward / hip_width)).max(0.0);
    medial / hip_width
}

/// Valgus deviation for one leg of a pose; `0.0` unless all six hip, knee
/// and ankle landmarks meet `min_confidence`
#[must_use]
pub fn knee_valgus(pose: &PoseLandmarks, side: Side, min_confidence: f64) -> f64 {
    if !pose.legs_confident(min_confidence) {
        return 0.0;
    }
    let (Some(hip), Some(knee), Some(ankle), Some(other_hip)) = (
        pose.get(side.hip()),
        pose.get(side.knee()),
        pose.get(side.ankle()),
        pose.get(side.opposite().hip()),
    ) else {
        return 0.0;
    };
    let inward = other_hip.position() - hip.position();
    knee_valgus_deviation(&hip.position(), &knee.position(), &ankle.position(), &inward)
}

/// Valgus for both legs, or `None` if the legs are not reliably tracked
#[must_use]
pub fn valgus_pair(pose: &PoseLandmarks, min_confidence: f64) -> Option<(f64, f64)> {
    pose.legs_confident(min_confidence).then(|| {
        (
            knee_valgus(pose, Side::Left, min_confidence),
            knee_valgus(pose, Side::Right, min_confidence),
        )
    })
}

/// Absolute left/right angle difference in degrees
#[must_use]
pub fn symmetry_difference(left_angle: f64, right_angle: f64) -> f64 {
    (left_angle - right_angle).abs()
}

/// Map an angle difference to a percentage: `100·e^(-decay·diff)`.
/// Zero difference is 100%; larger differences decay toward 0%.
#[must_use]
pub fn symmetry_percent(difference: f64, decay: f64) -> f64 {
    100.0 * (-decay * difference.abs()).exp()
}

/// Mean screen-space vertical position of the two hips
#[must_use]
pub fn hip_height(screen: &PoseLandmarks, min_confidence: f64) -> Option<f64> {
    let left = screen.confident(LEFT_HIP, min_confidence)?;
    let right = screen.confident(RIGHT_HIP, min_confidence)?;
    Some((left.y + right.y) / 2.0)
}
