//! Reserved feature properties.
//!
//! Keys starting with `_` are transient flags set by the engine or the UI. They are never part of
//! the committed data: [`strip_transient`] removes them and duplicate detection ignores them.

use geojson::{Feature, FeatureCollection, JsonObject, JsonValue};
use web_time::{Duration, SystemTime, UNIX_EPOCH};

/// Prefix of transient property keys.
pub const TRANSIENT_PREFIX: char = '_';
/// Set on features created in the current session.
pub const FRESH_KEY: &str = "_isNew";
/// Time the feature became urgent, milliseconds since the Unix epoch.
pub const URGENT_AT_KEY: &str = "_urgentAt";
/// Priority property of a feature.
pub const PRIORITY_KEY: &str = "priority";
/// Value of [`PRIORITY_KEY`] marking a feature as urgent.
pub const URGENT_PRIORITY: &str = "Urgent";

/// Returns true for keys of transient properties.
pub fn is_transient(key: &str) -> bool {
    key.starts_with(TRANSIENT_PREFIX)
}

/// Removes all transient properties from the feature. Returns the number of removed keys.
pub fn strip_transient(feature: &mut Feature) -> usize {
    let Some(properties) = feature.properties.as_mut() else {
        return 0;
    };

    let before = properties.len();
    properties.retain(|key, _| !is_transient(key));
    before - properties.len()
}

/// Strips transient properties from every feature of the collection. Returns the total number of
/// removed keys.
pub fn commit_collection(collection: &mut FeatureCollection) -> usize {
    collection.features.iter_mut().map(strip_transient).sum()
}

/// Compares the committed (non-transient) properties of two features. Missing properties are equal
/// to an empty object.
pub fn committed_eq(a: Option<&JsonObject>, b: Option<&JsonObject>) -> bool {
    let a_len = a.map_or(0, committed_len);
    let b_len = b.map_or(0, committed_len);
    if a_len != b_len {
        return false;
    }

    let (Some(a), Some(b)) = (a, b) else {
        return true;
    };

    a.iter()
        .filter(|(key, _)| !is_transient(key))
        .all(|(key, value)| b.get(key) == Some(value))
}

fn committed_len(properties: &JsonObject) -> usize {
    properties.keys().filter(|key| !is_transient(key)).count()
}

/// Returns true if the feature has the urgent priority.
pub fn is_urgent(feature: &Feature) -> bool {
    feature
        .property(PRIORITY_KEY)
        .and_then(JsonValue::as_str)
        .is_some_and(|priority| priority == URGENT_PRIORITY)
}

/// Time the feature was marked urgent, if the transient timestamp is present and valid.
pub fn urgent_since(feature: &Feature) -> Option<SystemTime> {
    let millis = feature.property(URGENT_AT_KEY)?.as_f64()?;
    if !millis.is_finite() || millis < 0.0 {
        return None;
    }

    UNIX_EPOCH.checked_add(Duration::from_millis(millis as u64))
}

/// Marks the feature urgent as of `now`, setting both the priority and the transient timestamp.
pub fn mark_urgent(feature: &mut Feature, now: SystemTime) {
    let millis = now
        .duration_since(UNIX_EPOCH)
        .map(|since| since.as_millis() as u64)
        .unwrap_or_default();

    feature.set_property(PRIORITY_KEY, URGENT_PRIORITY);
    feature.set_property(URGENT_AT_KEY, millis);
}

/// Flags the feature as created in the current session.
pub fn mark_fresh(feature: &mut Feature) {
    feature.set_property(FRESH_KEY, true);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn feature_with(properties: JsonValue) -> Feature {
        Feature {
            bbox: None,
            geometry: None,
            id: None,
            properties: properties.as_object().cloned(),
            foreign_members: None,
        }
    }

    #[test]
    fn strip_removes_only_transient_keys() {
        let mut feature = feature_with(json!({"name": "a", "_isNew": true, "_urgentAt": 5}));

        assert_eq!(strip_transient(&mut feature), 2);
        assert_eq!(feature.properties, json!({"name": "a"}).as_object().cloned());
        assert_eq!(strip_transient(&mut feature), 0);
    }

    #[test]
    fn committed_equality_ignores_transient_keys() {
        let a = feature_with(json!({"name": "a", "_isNew": true}));
        let b = feature_with(json!({"name": "a"}));
        let c = feature_with(json!({"name": "b"}));
        let empty = feature_with(json!({"_isNew": true}));

        assert!(committed_eq(a.properties.as_ref(), b.properties.as_ref()));
        assert!(!committed_eq(a.properties.as_ref(), c.properties.as_ref()));
        assert!(committed_eq(empty.properties.as_ref(), None));
        assert!(!committed_eq(b.properties.as_ref(), None));
    }

    #[test]
    fn urgent_marking() {
        let mut feature = feature_with(json!({}));
        assert!(!is_urgent(&feature));
        assert!(urgent_since(&feature).is_none());

        let now = UNIX_EPOCH + Duration::from_millis(1_700_000_000_000);
        mark_urgent(&mut feature, now);

        assert!(is_urgent(&feature));
        assert_eq!(urgent_since(&feature), Some(now));
    }
}
