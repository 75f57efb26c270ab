use std::collections::HashSet;
use std::time::{SystemTime, UNIX_EPOCH};

use bevy::log::debug;
use rand::Rng;
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

use crate::core::palette::pick_new_color;

/// A spin needs at least this many segments; auto-remove never goes below it.
pub const MIN_SEGMENTS: usize = 2;
/// Weights are percentages.
pub const MAX_WEIGHT: f64 = 100.0;

/// One wedge of the wheel. Order in the owning list determines the arc.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub id: String,
    pub text: String,
    pub color: String,
    /// Percentage chance in `[0, 100]`; 0 means "unspecified, share the rest".
    #[serde(default)]
    pub weight: f64,
}

impl Segment {
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        color: impl Into<String>,
        weight: f64,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            color: color.into(),
            weight: clamp_weight(weight),
        }
    }
}

/// Non-finite -> 0, otherwise clamped into `[0, MAX_WEIGHT]`.
#[inline]
pub fn clamp_weight(weight: f64) -> f64 {
    if weight.is_finite() {
        weight.clamp(0.0, MAX_WEIGHT)
    } else {
        0.0
    }
}

/// Random hex followed by the hex millisecond timestamp.
pub fn new_segment_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    format!("{:x}{:x}", rng.gen::<u32>(), millis)
}

/// Wheel shown when the store has nothing usable.
pub fn sample_segments() -> Vec<Segment> {
    vec![
        Segment::new("1", "Grand Prize", "#ff4d4f", 0.0),
        Segment::new("2", "Second Prize", "#faad14", 0.0),
        Segment::new("3", "Third Prize", "#52c41a", 0.0),
        Segment::new("4", "Better luck next time", "#1890ff", 0.0),
    ]
}

// ---------------- Load boundary -----------------

/// Persisted weight. Read the way a loosely typed editor would coerce it:
/// numbers as-is, numeric strings parsed, booleans as 1/0, anything else 0.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum WeightField {
    Number(f64),
    Text(String),
    Flag(bool),
    Other(IgnoredAny),
}

impl WeightField {
    fn value(&self) -> f64 {
        match self {
            WeightField::Number(v) => *v,
            WeightField::Text(s) if s.trim().is_empty() => 0.0,
            WeightField::Text(s) => s.trim().parse().unwrap_or(f64::NAN),
            WeightField::Flag(b) => f64::from(u8::from(*b)),
            WeightField::Other(_) => f64::NAN,
        }
    }
}

/// Persisted scalar used for ids and labels; older files store ids as numbers.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ScalarField {
    Text(String),
    Int(i64),
    Float(f64),
    Flag(bool),
    Other(IgnoredAny),
}

impl ScalarField {
    /// String form; `None` for arrays and objects.
    pub fn into_text(self) -> Option<String> {
        match self {
            ScalarField::Text(s) => Some(s),
            ScalarField::Int(i) => Some(i.to_string()),
            ScalarField::Float(f) => Some(f.to_string()),
            ScalarField::Flag(b) => Some(b.to_string()),
            ScalarField::Other(_) => None,
        }
    }
}

/// Segment as found in storage. Accepts both `id`/`Id` style keys, loosely
/// typed values and any subset of fields; [`normalize_records`] turns it into
/// a canonical [`Segment`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SegmentRecord {
    #[serde(default, alias = "Id")]
    pub id: Option<ScalarField>,
    #[serde(default, alias = "Text")]
    pub text: Option<ScalarField>,
    #[serde(default, alias = "Color")]
    pub color: Option<ScalarField>,
    #[serde(default, alias = "Weight")]
    pub weight: Option<WeightField>,
}

impl From<&Segment> for SegmentRecord {
    fn from(s: &Segment) -> Self {
        Self {
            id: Some(ScalarField::Text(s.id.clone())),
            text: Some(ScalarField::Text(s.text.clone())),
            color: Some(ScalarField::Text(s.color.clone())),
            weight: Some(WeightField::Number(s.weight)),
        }
    }
}

/// Single validation step for persisted data: fills ids and colors, clamps
/// weights and re-issues duplicate ids so the rest of the crate only ever sees
/// canonical segments.
pub fn normalize_records<R: Rng + ?Sized>(records: Vec<SegmentRecord>, rng: &mut R) -> Vec<Segment> {
    let records: Vec<(Option<String>, Option<String>, Option<String>, f64)> = records
        .into_iter()
        .map(|r| {
            let color = match r.color {
                Some(ScalarField::Text(c)) => Some(c),
                _ => None,
            };
            (
                r.id.and_then(ScalarField::into_text),
                r.text.and_then(ScalarField::into_text),
                color,
                r.weight.map(|w| w.value()).unwrap_or(0.0),
            )
        })
        .collect();
    let mut used_colors: Vec<String> = records
        .iter()
        .filter_map(|(_, _, color, _)| color.as_deref())
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect();
    let mut seen_ids = HashSet::new();
    let mut out = Vec::with_capacity(records.len());
    for (id, text, color, weight) in records {
        let mut id = id
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| new_segment_id(rng));
        while !seen_ids.insert(id.clone()) {
            let fresh = new_segment_id(rng);
            debug!(target: "wheel", "duplicate segment id '{id}' re-issued as '{fresh}'");
            id = fresh;
        }
        let color = match color.map(|c| c.trim().to_string()) {
            Some(c) if !c.is_empty() => c,
            _ => {
                let c = pick_new_color(used_colors.iter().map(String::as_str), rng);
                used_colors.push(c.clone());
                c
            }
        };
        out.push(Segment {
            id,
            text: text.unwrap_or_default(),
            color,
            weight: clamp_weight(weight),
        });
    }
    out
}
