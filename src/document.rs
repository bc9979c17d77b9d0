use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// StatsDocument
// ---------------------------------------------------------------------------

/// The root of a stats file. The document is user-supplied and unvalidated,
/// so every section defaults to empty and every scalar to zero -- consumers
/// must never assume a field is present.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct StatsDocument {
    #[serde(default)]
    pub summary: Summary,
    #[serde(default)]
    pub by_pillar: Vec<PillarCount>,
    #[serde(default)]
    pub by_sender: Vec<SenderCount>,
    #[serde(default)]
    pub heatmap_date_slot: Vec<SlotCount>,
    #[serde(default)]
    pub pillar_trend_week: Vec<TrendPoint>,
    #[serde(default)]
    pub avg_response_time_by_sender: Vec<ResponseTime>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Summary {
    #[serde(default)]
    pub total_messages: u64,
    #[serde(default)]
    pub unique_senders: u64,
    /// Timestamps are display-only; kept as whatever string the producer wrote.
    #[serde(default)]
    pub first_message_at: Option<String>,
    #[serde(default)]
    pub last_message_at: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PillarCount {
    #[serde(default)]
    pub pillar: String,
    #[serde(default)]
    pub count: u64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SenderCount {
    #[serde(default)]
    pub sender: String,
    #[serde(default)]
    pub count: u64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SlotCount {
    #[serde(default)]
    pub date_only: String,
    #[serde(default)]
    pub slot: String,
    #[serde(default)]
    pub count: u64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TrendPoint {
    #[serde(default)]
    pub week: String,
    #[serde(default)]
    pub pillar: String,
    #[serde(default)]
    pub count: u64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ResponseTime {
    #[serde(default)]
    pub sender: String,
    #[serde(default)]
    pub avg_response_mins: f64,
}

// ---------------------------------------------------------------------------
// Slot
// ---------------------------------------------------------------------------

/// The four fixed time-of-day buckets used by the heatmap. The axis order is
/// canonical regardless of what the document contains; slots missing from the
/// input still render as zero cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Slot {
    /// 06:00 - 12:00
    Morning,
    /// 12:00 - 18:00
    Afternoon,
    /// 18:00 - 24:00
    Evening,
    /// 00:00 - 06:00
    Night,
}

impl Slot {
    /// Canonical axis order for rendering.
    pub const ALL: [Slot; 4] = [Slot::Morning, Slot::Afternoon, Slot::Evening, Slot::Night];

    pub fn label(&self) -> &'static str {
        match self {
            Slot::Morning => "Morning",
            Slot::Afternoon => "Afternoon",
            Slot::Evening => "Evening",
            Slot::Night => "Night",
        }
    }

    /// Parse a document slot label. Returns `None` for anything outside the
    /// four canonical labels -- unrecognized slots are skipped, not an error.
    pub fn from_label(label: &str) -> Option<Slot> {
        match label {
            "Morning" => Some(Slot::Morning),
            "Afternoon" => Some(Slot::Afternoon),
            "Evening" => Some(Slot::Evening),
            "Night" => Some(Slot::Night),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// Format a numeric count as a comma-grouped integer string.
/// NaN counts as 0; the value is rounded to the nearest integer first.
pub fn format_count(value: f64) -> String {
    let n = if value.is_nan() { 0 } else { value.round() as i64 };

    let negative = n < 0;
    let digits = n.unsigned_abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if negative {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// Percentage of `numerator` over `denominator`, rounded to the nearest
/// integer. Returns 0 when the denominator is 0. Not clamped: a numerator
/// above the denominator yields a value over 100.
pub fn percent_of(numerator: u64, denominator: u64) -> u64 {
    if denominator == 0 {
        return 0;
    }
    (numerator as f64 / denominator as f64 * 100.0).round() as u64
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
