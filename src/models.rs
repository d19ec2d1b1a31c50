//! Data types shared by the fetch, aggregation and rendering stages

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Separator used to join hierarchical category names into one label
pub const CATEGORY_SEPARATOR: &str = " > ";

/// Label for window events the categorizer could not classify
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Name given to block markers without a `block` field
pub const UNKNOWN_BLOCK: &str = "Unknown";

/// An ActivityWatch event as returned by the query endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub timestamp: DateTime<Utc>,
    /// Duration in seconds
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl Event {
    pub fn start(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn end(&self) -> DateTime<Utc> {
        offset_by_seconds(self.timestamp, self.duration)
    }

    /// Half-open overlap test against `[start, end)`.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start() < end && self.end() > start
    }

    /// Category label attached by `categorize`, joined with the separator.
    pub fn category_label(&self) -> String {
        match self.data.get("$category").and_then(Value::as_array) {
            Some(segments) => segments
                .iter()
                .map(|segment| match segment {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(CATEGORY_SEPARATOR),
            None => UNCATEGORIZED.to_string(),
        }
    }

    /// Block name of a nextblock marker event.
    pub fn block_name(&self) -> String {
        match self.data.get("block") {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => UNKNOWN_BLOCK.to_string(),
        }
    }

    /// Planned duration of a nextblock marker in seconds.
    ///
    /// Markers carry minutes; anything missing or non-numeric counts as 0.
    pub fn planned_duration_secs(&self) -> f64 {
        let minutes = match self.data.get("planned_duration") {
            Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
            Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
            _ => 0.0,
        };
        let seconds = minutes * 60.0;
        if seconds.is_finite() {
            seconds
        } else {
            0.0
        }
    }
}

/// Moves `start` by fractional seconds at millisecond precision.
///
/// Offsets beyond chrono's range clamp to the earliest or latest instant.
pub fn offset_by_seconds(start: DateTime<Utc>, seconds: f64) -> DateTime<Utc> {
    let limit = if seconds < 0.0 {
        DateTime::<Utc>::MIN_UTC
    } else {
        DateTime::<Utc>::MAX_UTC
    };
    Duration::try_milliseconds((seconds * 1000.0).round() as i64)
        .and_then(|delta| start.checked_add_signed(delta))
        .unwrap_or(limit)
}

/// A category definition from the `classes` setting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryClass {
    pub name: Vec<String>,
    #[serde(default)]
    pub rule: Value,
    #[serde(default)]
    pub data: Option<ClassData>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassData {
    #[serde(default)]
    pub color: Option<String>,
}

impl CategoryClass {
    pub fn label(&self) -> String {
        self.name.join(CATEGORY_SEPARATOR)
    }

    /// Own colour, ignoring empty strings.
    pub fn color(&self) -> Option<&str> {
        self.data
            .as_ref()
            .and_then(|d| d.color.as_deref())
            .filter(|c| !c.is_empty())
    }
}

/// UI theme from the `theme` setting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Anything other than `"dark"` is treated as light.
    pub fn from_setting(value: &Value) -> Self {
        match value.as_str() {
            Some("dark") => Theme::Dark,
            _ => Theme::Light,
        }
    }

    pub fn background(self) -> &'static str {
        match self {
            Theme::Dark => "#1A1D24",
            Theme::Light => "#FFFFFF",
        }
    }

    pub fn foreground(self) -> &'static str {
        match self {
            Theme::Dark => "#FFFFFF",
            Theme::Light => "#000000",
        }
    }

    pub fn grid(self) -> &'static str {
        match self {
            Theme::Dark => "#333333",
            Theme::Light => "#E0E0E0",
        }
    }

    pub fn tick(self) -> &'static str {
        match self {
            Theme::Dark => "#CCCCCC",
            Theme::Light => "#666666",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::event;
    use serde_json::json;

    #[test]
    fn test_event_deserializes_activitywatch_shape() {
        let e: Event = serde_json::from_value(json!({
            "id": 42,
            "timestamp": "2024-05-01T09:00:00.123000+02:00",
            "duration": 12.5,
            "data": {"app": "firefox"}
        }))
        .unwrap();
        assert_eq!(e.timestamp.to_rfc3339(), "2024-05-01T07:00:00.123+00:00");
        assert_eq!(e.duration, 12.5);
        assert_eq!(e.end() - e.start(), Duration::milliseconds(12_500));
    }

    #[test]
    fn test_huge_durations_clamp_to_range() {
        let start = "2024-05-01T10:00:00Z".parse::<DateTime<Utc>>().unwrap();
        assert_eq!(offset_by_seconds(start, 1e15), DateTime::<Utc>::MAX_UTC);
        assert_eq!(offset_by_seconds(start, -1e300), DateTime::<Utc>::MIN_UTC);
        assert_eq!(offset_by_seconds(start, f64::INFINITY), DateTime::<Utc>::MAX_UTC);
        assert_eq!(offset_by_seconds(start, 1.5), start + Duration::milliseconds(1500));

        let e = event("2024-05-01T10:00:00Z", -1e300, json!({}));
        assert_eq!(e.end(), DateTime::<Utc>::MIN_UTC);
        assert!(!e.overlaps(start, start + Duration::hours(1)));
    }

    #[test]
    fn test_overlap_is_half_open() {
        let e = event("2024-05-01T10:00:00Z", 60.0, json!({}));
        let t = |s: &str| s.parse::<DateTime<Utc>>().unwrap();

        // Touching at either edge does not count
        assert!(!e.overlaps(t("2024-05-01T10:01:00Z"), t("2024-05-01T10:02:00Z")));
        assert!(!e.overlaps(t("2024-05-01T09:59:00Z"), t("2024-05-01T10:00:00Z")));
        assert!(e.overlaps(t("2024-05-01T10:00:59Z"), t("2024-05-01T10:02:00Z")));
        assert!(e.overlaps(t("2024-05-01T09:00:00Z"), t("2024-05-01T11:00:00Z")));
    }

    #[test]
    fn test_category_label() {
        let e = event(
            "2024-05-01T10:00:00Z",
            1.0,
            json!({"$category": ["Work", "Email"]}),
        );
        assert_eq!(e.category_label(), "Work > Email");

        let e = event("2024-05-01T10:00:00Z", 1.0, json!({"app": "x"}));
        assert_eq!(e.category_label(), UNCATEGORIZED);
    }

    #[test]
    fn test_block_name_and_planned_duration() {
        let e = event(
            "2024-05-01T10:00:00Z",
            1.0,
            json!({"block": "Deep work", "planned_duration": 25}),
        );
        assert_eq!(e.block_name(), "Deep work");
        assert_eq!(e.planned_duration_secs(), 1500.0);

        let e = event("2024-05-01T10:00:00Z", 1.0, json!({"block": ""}));
        assert_eq!(e.block_name(), UNKNOWN_BLOCK);
        assert_eq!(e.planned_duration_secs(), 0.0);

        let e = event(
            "2024-05-01T10:00:00Z",
            1.0,
            json!({"planned_duration": "1.5"}),
        );
        assert_eq!(e.planned_duration_secs(), 90.0);

        let e = event(
            "2024-05-01T10:00:00Z",
            1.0,
            json!({"planned_duration": "soon"}),
        );
        assert_eq!(e.planned_duration_secs(), 0.0);
    }

    #[test]
    fn test_class_color_ignores_empty() {
        let class: CategoryClass = serde_json::from_value(json!({
            "name": ["Work"],
            "rule": {"type": "regex", "regex": "code"},
            "data": {"color": ""}
        }))
        .unwrap();
        assert_eq!(class.color(), None);
        assert_eq!(class.label(), "Work");

        let class: CategoryClass =
            serde_json::from_value(json!({"name": ["Work", "Email"], "rule": {"type": "none"}}))
                .unwrap();
        assert_eq!(class.color(), None);
        assert_eq!(class.label(), "Work > Email");
    }

    #[test]
    fn test_theme_from_setting() {
        assert_eq!(Theme::from_setting(&json!("dark")), Theme::Dark);
        assert_eq!(Theme::from_setting(&json!("light")), Theme::Light);
        assert_eq!(Theme::from_setting(&json!("auto")), Theme::Light);
        assert_eq!(Theme::from_setting(&Value::Null), Theme::Light);
        assert_eq!(Theme::Dark.background(), "#1A1D24");
        assert_eq!(Theme::Light.grid(), "#E0E0E0");
    }
}
