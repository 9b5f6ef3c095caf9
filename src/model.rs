use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Panel identifier as it appears in the dataset: a string or an integer.
/// `"1"` and `1` are different keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PanelId {
    Number(i64),
    Text(String),
}

impl fmt::Display for PanelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PanelId::Number(n) => write!(f, "{}", n),
            PanelId::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for PanelId {
    fn from(s: &str) -> Self {
        PanelId::Text(s.to_string())
    }
}

impl From<i64> for PanelId {
    fn from(n: i64) -> Self {
        PanelId::Number(n)
    }
}

/// A numeric field the producer may write either as a JSON number or as a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LooseNumber {
    Number(f64),
    Text(String),
}

impl LooseNumber {
    /// Float value using prefix semantics: `"52.1abc"` is 52.1, `"abc"` is `None`.
    pub fn as_float(&self) -> Option<f64> {
        let value = match self {
            LooseNumber::Number(n) => *n,
            LooseNumber::Text(s) => parse_float_prefix(s)?,
        };
        if value.is_nan() {
            None
        } else {
            Some(value)
        }
    }

    /// Integer value using prefix semantics, fractional part truncated.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            LooseNumber::Number(n) if n.is_finite() => Some(n.trunc() as i64),
            LooseNumber::Number(_) => None,
            LooseNumber::Text(s) => parse_int_prefix(s),
        }
    }
}

fn parse_float_prefix(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let end = float_prefix_len(s.as_bytes());
    if end == 0 {
        return None;
    }
    s[..end].parse::<f64>().ok()
}

// Length of the longest prefix shaped like `[+-]digits[.digits][e[+-]digits]`
fn float_prefix_len(bytes: &[u8]) -> usize {
    let digits_from = |start: usize| {
        bytes[start..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count()
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_digits = digits_from(end);
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = digits_from(end + 1);
        if int_digits > 0 || frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return 0;
    }

    // Exponent only counts when digits follow it, e.g. "1e" -> "1"
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let sign = usize::from(matches!(bytes.get(end + 1), Some(b'+' | b'-')));
        let exp_digits = digits_from(end + 1 + sign);
        if exp_digits > 0 {
            end += 1 + sign + exp_digits;
        }
    }
    end
}

fn parse_int_prefix(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let sign_len = usize::from(s.starts_with('-') || s.starts_with('+'));
    let digits = s[sign_len..].chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    s[..sign_len + digits].parse::<i64>().ok()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Panel {
    pub id: PanelId,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub organization: String,
    #[serde(default, deserialize_with = "lenient_text_lines")]
    pub text: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub lat: Option<LooseNumber>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub lon: Option<LooseNumber>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub image_width: Option<LooseNumber>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub image_height: Option<LooseNumber>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub road_id: Option<String>,
    /// Meters along the road
    #[serde(default, deserialize_with = "lenient_float")]
    pub road_offset: Option<f64>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub road_side: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub working: Option<bool>,
}

impl Panel {
    pub fn new(id: impl Into<PanelId>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            organization: String::new(),
            text: None,
            lat: None,
            lon: None,
            image_width: None,
            image_height: None,
            road_id: None,
            road_offset: None,
            road_side: None,
            working: None,
        }
    }

    pub fn coordinates(&self) -> Option<(f64, f64)> {
        let lat = self.lat.as_ref()?.as_float()?;
        let lon = self.lon.as_ref()?.as_float()?;
        Some((lat, lon))
    }

    /// Native image size in pixels; `None` unless both sides are positive.
    pub fn image_size(&self) -> Option<(u32, u32)> {
        let width = self.image_width.as_ref()?.as_int()?;
        let height = self.image_height.as_ref()?.as_int()?;
        if width <= 0 || height <= 0 {
            return None;
        }
        Some((u32::try_from(width).ok()?, u32::try_from(height).ok()?))
    }

    pub fn is_working(&self) -> bool {
        self.working.unwrap_or(true)
    }
}

// Field decoders below never fail on a wrong JSON type, so one odd field
// cannot take its record down with it.

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_opt_string(deserializer)?.unwrap_or_default())
}

fn lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<LooseNumber>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Number(n) => n.as_f64().map(LooseNumber::Number),
        serde_json::Value::String(s) => Some(LooseNumber::Text(s)),
        _ => None,
    })
}

fn lenient_float<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_number(deserializer)?.and_then(|n| n.as_float()))
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(serde_json::Value::deserialize(deserializer)?.as_bool())
}

// Anything but an array is treated as absent
fn lenient_text_lines<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Array(items) => Some(
            items
                .into_iter()
                .map(|item| match item {
                    serde_json::Value::String(s) => s,
                    serde_json::Value::Null => String::new(),
                    other => other.to_string(),
                })
                .collect(),
        ),
        _ => None,
    })
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<FixedOffset>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok()))
}

/// `data.json` as it comes off the wire; records are decoded one by one.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDataset {
    #[serde(default, deserialize_with = "lenient_timestamp")]
    date_updated: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    drips: Vec<serde_json::Value>,
}

/// Decoded `data.json`. Records that do not decode as a panel (e.g. an
/// id that is neither a string nor an integer) are left out and counted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "RawDataset")]
pub struct Dataset {
    pub date_updated: Option<DateTime<FixedOffset>>,
    pub drips: Vec<Panel>,
    pub rejected: usize,
}

impl Dataset {
    pub fn new(drips: Vec<Panel>) -> Self {
        Self {
            date_updated: None,
            drips,
            rejected: 0,
        }
    }
}

impl From<RawDataset> for Dataset {
    fn from(raw: RawDataset) -> Self {
        let mut dataset = Dataset {
            date_updated: raw.date_updated,
            ..Dataset::default()
        };

        for (position, record) in raw.drips.into_iter().enumerate() {
            match serde_json::from_value::<Panel>(record) {
                Ok(panel) => dataset.drips.push(panel),
                Err(e) => {
                    tracing::debug!("Skipping record #{}: {}", position, e);
                    dataset.rejected += 1;
                }
            }
        }
        dataset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_prefix_parsing() {
        assert_eq!(LooseNumber::Text("52.1".into()).as_float(), Some(52.1));
        assert_eq!(LooseNumber::Text(" 52.1abc".into()).as_float(), Some(52.1));
        assert_eq!(LooseNumber::Text("-4.5".into()).as_float(), Some(-4.5));
        assert_eq!(LooseNumber::Text("1e".into()).as_float(), Some(1.0));
        assert_eq!(LooseNumber::Text("abc".into()).as_float(), None);
        assert_eq!(LooseNumber::Text("".into()).as_float(), None);
        assert_eq!(LooseNumber::Number(5.0).as_float(), Some(5.0));
        assert_eq!(LooseNumber::Text("1.5e3x".into()).as_float(), Some(1500.0));
        assert_eq!(LooseNumber::Text(".5".into()).as_float(), Some(0.5));
        assert_eq!(LooseNumber::Text("-.".into()).as_float(), None);
        assert_eq!(LooseNumber::Text("1e1e1e1e".into()).as_float(), Some(10.0));
    }

    #[test]
    fn long_garbage_tail_parses_in_one_pass() {
        let long = format!("7{}", "e1".repeat(100_000));
        assert_eq!(LooseNumber::Text(long).as_float(), Some(70.0));
    }

    #[test]
    fn wrong_field_types_degrade_to_absent() {
        let json = r#"{"id": "x", "name": null, "organization": 3, "lat": true, "lon": [],
                       "imageWidth": {}, "imageHeight": "40", "roadId": null,
                       "roadOffset": "45300", "roadSide": false, "working": "yes"}"#;
        let panel: Panel = serde_json::from_str(json).unwrap();

        assert_eq!(panel.name, "");
        assert_eq!(panel.organization, "3");
        assert_eq!(panel.coordinates(), None);
        assert_eq!(panel.image_size(), None);
        assert_eq!(panel.road_id, None);
        assert_eq!(panel.road_offset, Some(45300.0));
        assert_eq!(panel.road_side.as_deref(), Some("false"));
        assert!(panel.is_working());

        let panel: Panel = serde_json::from_str(r#"{"id": 1, "roadOffset": 1500.5}"#).unwrap();
        assert_eq!(panel.road_offset, Some(1500.5));
    }

    #[test]
    fn undecodable_records_are_dropped_one_by_one() {
        let json = r#"{"drips": [
            {"id": "ok"},
            {"id": 1.5},
            {"id": null},
            {"name": "no id"},
            "not an object",
            {"id": 2}
        ]}"#;
        let dataset: Dataset = serde_json::from_str(json).unwrap();
        let ids: Vec<_> = dataset.drips.iter().map(|p| p.id.to_string()).collect();
        assert_eq!(ids, vec!["ok", "2"]);
        assert_eq!(dataset.rejected, 4);
    }

    #[test]
    fn int_prefix_parsing() {
        assert_eq!(LooseNumber::Text("40px".into()).as_int(), Some(40));
        assert_eq!(LooseNumber::Text("x40".into()).as_int(), None);
        assert_eq!(LooseNumber::Number(40.7).as_int(), Some(40));
    }

    #[test]
    fn deserializes_producer_output() {
        let json = r#"{
            "dateUpdated": "2023-03-01T12:30:00.5+01:00",
            "drips": [
                {"id": "GUID_1", "name": "A2 Li 45,3", "organization": "RWS",
                 "text": ["File", "5 min"], "lat": "52.1", "lon": "5.0",
                 "imageWidth": 40, "imageHeight": 30, "working": false,
                 "roadId": "A2", "roadSide": "L", "roadOffset": 45300},
                {"id": 7, "text": "not a list", "lat": 51.0, "lon": 4.0}
            ]
        }"#;
        let dataset: Dataset = serde_json::from_str(json).unwrap();
        assert!(dataset.date_updated.is_some());
        assert_eq!(dataset.drips.len(), 2);

        let first = &dataset.drips[0];
        assert_eq!(first.id, PanelId::from("GUID_1"));
        assert_eq!(first.coordinates(), Some((52.1, 5.0)));
        assert_eq!(first.image_size(), Some((40, 30)));
        assert!(!first.is_working());

        let second = &dataset.drips[1];
        assert_eq!(second.id, PanelId::Number(7));
        assert_eq!(second.text, None);
        assert_eq!(second.image_size(), None);
        assert!(second.is_working());
    }

    #[test]
    fn bad_timestamp_is_tolerated() {
        let dataset: Dataset = serde_json::from_str(r#"{"dateUpdated": "yesterday", "drips": []}"#).unwrap();
        assert!(dataset.date_updated.is_none());
    }

    #[test]
    fn zero_or_negative_image_size_is_not_renderable() {
        let mut panel = Panel::new("x");
        panel.image_width = Some(LooseNumber::Number(0.0));
        panel.image_height = Some(LooseNumber::Number(40.0));
        assert_eq!(panel.image_size(), None);
        panel.image_width = Some(LooseNumber::Text("-3".into()));
        assert_eq!(panel.image_size(), None);
    }
}
