//! Visual separation of points sharing a coordinate, and urgent-priority highlighting.
//!
//! Points whose coordinates round to the same 5-decimal position (about 1.1 m) are drawn as
//! concentric circles: the first one as a filled dot, every following one as a ring with a larger
//! radius. Ring indices follow the order of the features, so inserting a feature can shift the
//! rings of all later features at the same position.
//!
//! Urgent features pulse for [`URGENCY_WINDOW`] after they were marked. The resolver owns no
//! timers: the caller must resolve the appearance again after the delay returned by
//! [`next_refresh`].

use ahash::{HashMap, HashMapExt};
use geojson::Feature;
use log::trace;
use web_time::{Duration, SystemTime};

use crate::color::Color;
use crate::feature::point_lonlat;
use crate::layer::LayerStyle;
use crate::properties::{is_urgent, urgent_since};

/// Number of decimal places coordinates are rounded to before grouping.
pub const GROUPING_DECIMALS: i32 = 5;
/// Radius of the innermost point, in pixels.
pub const BASE_RADIUS: f64 = 6.0;
/// Radius increase of every following ring, in pixels.
pub const RING_STEP: f64 = 4.0;
/// Stroke width of points and rings, in pixels.
pub const STROKE_WIDTH: f64 = 2.0;
/// How long an urgent feature pulses after it was marked.
pub const URGENCY_WINDOW: Duration = Duration::from_secs(60);

/// Grouping key of a coordinate: longitude and latitude rounded to [`GROUPING_DECIMALS`].
pub fn grouping_key(lon: f64, lat: f64) -> (i64, i64) {
    let scale = 10f64.powi(GROUPING_DECIMALS);
    ((lon * scale).round() as i64, (lat * scale).round() as i64)
}

/// Assigns a ring index to every point feature. The map is keyed by the feature index in the
/// slice; non-point features have no entry.
///
/// The first feature at a position gets ring `0`, the second ring `1` and so on.
pub fn resolve_rings(features: &[Feature]) -> HashMap<usize, usize> {
    let mut counters: HashMap<(i64, i64), usize> = HashMap::new();
    let mut rings = HashMap::with_capacity(features.len());

    for (index, feature) in features.iter().enumerate() {
        let Some((lon, lat)) = point_lonlat(feature) else {
            continue;
        };

        let counter = counters.entry(grouping_key(lon, lat)).or_insert(0);
        rings.insert(index, *counter);
        *counter += 1;
    }

    rings
}

/// Radius of the given ring.
pub fn ring_radius(ring: usize) -> f64 {
    BASE_RADIUS + ring as f64 * RING_STEP
}

/// Priority highlight state of a feature.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Highlight {
    /// Regular feature.
    None,
    /// Urgent feature, drawn in the alert color.
    Urgent,
    /// Urgent feature marked less than [`URGENCY_WINDOW`] ago, drawn in the alert color and
    /// pulsing.
    UrgentPulsing,
}

/// Highlight state of the feature at the time `now`.
///
/// The result changes from [`Highlight::UrgentPulsing`] to [`Highlight::Urgent`] once the
/// window elapses, so the caller must check again after [`pulse_expires_at`].
pub fn highlight(feature: &Feature, now: SystemTime) -> Highlight {
    if !is_urgent(feature) {
        return Highlight::None;
    }

    match urgent_since(feature) {
        Some(since) if is_within_window(since, now) => Highlight::UrgentPulsing,
        _ => Highlight::Urgent,
    }
}

/// Returns true if the feature is pulsing at the time `now`.
pub fn is_highlighted(feature: &Feature, now: SystemTime) -> bool {
    highlight(feature, now) == Highlight::UrgentPulsing
}

fn is_within_window(since: SystemTime, now: SystemTime) -> bool {
    match now.duration_since(since) {
        Ok(age) => age < URGENCY_WINDOW,
        // marked in the future relative to `now`
        Err(_) => true,
    }
}

/// Time the pulse of an urgent feature ends. `None` for features that are not urgent or have no
/// urgency timestamp.
pub fn pulse_expires_at(feature: &Feature) -> Option<SystemTime> {
    if !is_urgent(feature) {
        return None;
    }

    urgent_since(feature)?.checked_add(URGENCY_WINDOW)
}

/// Delay after which the appearance of the features must be resolved again because a pulse ends.
/// `None` if no feature is pulsing at the time `now`.
pub fn next_refresh(features: &[Feature], now: SystemTime) -> Option<Duration> {
    features
        .iter()
        .filter_map(pulse_expires_at)
        .filter_map(|expires| expires.duration_since(now).ok())
        .filter(|delay| !delay.is_zero())
        .min()
}

/// How a point feature is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointAppearance {
    /// Ring index of the feature.
    pub ring: usize,
    /// Circle radius in pixels.
    pub radius: f64,
    /// Fill color. Transparent for rings.
    pub fill: Color,
    /// Stroke color.
    pub stroke: Color,
    /// Stroke width in pixels.
    pub stroke_width: f64,
    /// Priority highlight.
    pub highlight: Highlight,
}

impl PointAppearance {
    /// Returns true if the point is drawn with the pulsing effect.
    pub fn is_pulsing(&self) -> bool {
        self.highlight == Highlight::UrgentPulsing
    }
}

/// Resolves rings and highlights of all features. The result has one entry per feature, `None`
/// for features that are not points.
pub fn resolve_appearance(
    features: &[Feature],
    style: &LayerStyle,
    now: SystemTime,
) -> Vec<Option<PointAppearance>> {
    let rings = resolve_rings(features);

    features
        .iter()
        .enumerate()
        .map(|(index, feature)| {
            let ring = *rings.get(&index)?;
            let highlight = highlight(feature, now);
            let color = match highlight {
                Highlight::None => style.effective_color(),
                Highlight::Urgent | Highlight::UrgentPulsing => {
                    Color::ALERT.with_opacity(style.opacity)
                }
            };

            let (fill, stroke) = if ring == 0 {
                (color, Color::WHITE)
            } else {
                (Color::TRANSPARENT, color)
            };

            trace!("Feature {index}: ring {ring}, {highlight:?}");

            Some(PointAppearance {
                ring,
                radius: ring_radius(ring),
                fill,
                stroke,
                stroke_width: STROKE_WIDTH,
                highlight,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::{new_feature, point_feature};
    use crate::properties::mark_urgent;
    use approx::assert_abs_diff_eq;
    use geojson::Value;
    use web_time::UNIX_EPOCH;

    fn at(secs: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(1_700_000_000 + secs)
    }

    fn urgent_point(lon: f64, lat: f64, marked: SystemTime) -> Feature {
        let mut feature = point_feature(lon, lat);
        mark_urgent(&mut feature, marked);
        feature
    }

    #[test]
    fn coincident_points_get_consecutive_rings() {
        let features = vec![
            point_feature(34.78, 32.08),
            point_feature(34.78, 32.08),
            point_feature(34.78, 32.08),
        ];

        let rings = resolve_rings(&features);
        assert_eq!(rings[&0], 0);
        assert_eq!(rings[&1], 1);
        assert_eq!(rings[&2], 2);
    }

    #[test]
    fn two_identical_points_differ_by_one_ring_step() {
        let features = vec![point_feature(34.78, 32.08), point_feature(34.78, 32.08)];
        let appearance = resolve_appearance(&features, &LayerStyle::default(), at(0));

        let first = appearance[0].expect("point");
        let second = appearance[1].expect("point");
        assert_eq!((first.ring, second.ring), (0, 1));
        assert_abs_diff_eq!(second.radius - first.radius, RING_STEP);
        assert_eq!(first.fill, LayerStyle::default().color);
        assert!(second.fill.is_transparent());
        assert_eq!(second.stroke, LayerStyle::default().color);
    }

    #[test]
    fn grouping_uses_five_decimals() {
        let features = vec![
            point_feature(34.780001, 32.080001),
            point_feature(34.780004, 32.079999),
            point_feature(34.78001, 32.08),
        ];

        let rings = resolve_rings(&features);
        assert_eq!(rings[&0], 0);
        assert_eq!(rings[&1], 1);
        assert_eq!(rings[&2], 0);
    }

    #[test]
    fn rings_follow_collection_order() {
        let a = point_feature(34.78, 32.08);
        let other = point_feature(35.0, 32.5);

        let rings = resolve_rings(&[a.clone(), other.clone(), a.clone()]);
        assert_eq!((rings[&0], rings[&1], rings[&2]), (0, 0, 1));

        let rings = resolve_rings(&[a.clone(), a.clone(), other, a]);
        assert_eq!(rings[&3], 2);
    }

    #[test]
    fn non_points_have_no_ring() {
        let features = vec![
            new_feature(Value::LineString(vec![vec![34.78, 32.08]]), None),
            point_feature(34.78, 32.08),
        ];

        let rings = resolve_rings(&features);
        assert!(!rings.contains_key(&0));
        assert_eq!(rings[&1], 0);
        assert!(resolve_appearance(&features, &LayerStyle::default(), at(0))[0].is_none());
    }

    #[test]
    fn urgent_pulse_expires_after_window() {
        let feature = urgent_point(34.78, 32.08, at(0));

        assert_eq!(highlight(&feature, at(0)), Highlight::UrgentPulsing);
        assert_eq!(highlight(&feature, at(59)), Highlight::UrgentPulsing);
        assert!(is_highlighted(&feature, at(59)));
        assert_eq!(highlight(&feature, at(60)), Highlight::Urgent);
        assert!(!is_highlighted(&feature, at(3600)));

        assert_eq!(highlight(&point_feature(34.78, 32.08), at(0)), Highlight::None);
    }

    #[test]
    fn urgent_without_timestamp_does_not_pulse() {
        let mut feature = point_feature(34.78, 32.08);
        feature.set_property("priority", "Urgent");

        assert_eq!(highlight(&feature, at(0)), Highlight::Urgent);
        assert_eq!(pulse_expires_at(&feature), None);
    }

    #[test]
    fn urgent_points_use_alert_color() {
        let features = vec![urgent_point(34.78, 32.08, at(0)), urgent_point(34.78, 32.08, at(0))];
        let appearance = resolve_appearance(&features, &LayerStyle::default(), at(10));

        let center = appearance[0].expect("point");
        assert_eq!(center.fill, Color::ALERT);
        assert!(center.is_pulsing());

        let ring = appearance[1].expect("point");
        assert_eq!(ring.stroke, Color::ALERT);
    }

    #[test]
    fn refresh_is_scheduled_for_earliest_pulse_end() {
        let features = vec![
            urgent_point(34.78, 32.08, at(0)),
            urgent_point(35.0, 32.5, at(30)),
            point_feature(34.0, 31.0),
        ];

        assert_eq!(next_refresh(&features, at(40)), Some(Duration::from_secs(20)));
        assert_eq!(next_refresh(&features, at(70)), Some(Duration::from_secs(20)));
        assert_eq!(next_refresh(&features, at(90)), None);
        assert_eq!(next_refresh(&[point_feature(34.0, 31.0)], at(0)), None);
    }
}
