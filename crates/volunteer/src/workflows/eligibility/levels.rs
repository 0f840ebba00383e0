//! Score-to-tier classification and tier comparison.

use serde::{Deserialize, Serialize};

use super::domain::StandardTable;

/// Performance band derived from a raw score and a subject's standard table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Top,
    Front,
    Average,
    Back,
    Bottom,
    /// Scored, but below the lowest threshold.
    BelowBottom,
}

impl Tier {
    /// The five graded tiers, highest first.
    pub const fn graded() -> [Self; 5] {
        [Self::Top, Self::Front, Self::Average, Self::Back, Self::Bottom]
    }

    pub const fn ordinal(self) -> u8 {
        match self {
            Self::Top => 5,
            Self::Front => 4,
            Self::Average => 3,
            Self::Back => 2,
            Self::Bottom => 1,
            Self::BelowBottom => 0,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Top => "頂標",
            Self::Front => "前標",
            Self::Average => "均標",
            Self::Back => "後標",
            Self::Bottom => "底標",
            Self::BelowBottom => "底標以下",
        }
    }

    pub fn from_label(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        if let Some(tier) = Self::graded()
            .into_iter()
            .chain([Self::BelowBottom])
            .find(|tier| tier.label() == trimmed)
        {
            return Some(tier);
        }

        match trimmed.to_ascii_lowercase().as_str() {
            "top" => Some(Self::Top),
            "front" => Some(Self::Front),
            "average" => Some(Self::Average),
            "back" => Some(Self::Back),
            "bottom" => Some(Self::Bottom),
            "below_bottom" | "belowbottom" => Some(Self::BelowBottom),
            _ => None,
        }
    }

    fn threshold(self, table: &StandardTable) -> Option<f64> {
        match self {
            Self::Top => Some(table.top),
            Self::Front => Some(table.front),
            Self::Average => Some(table.average),
            Self::Back => Some(table.back),
            Self::Bottom => Some(table.bottom),
            Self::BelowBottom => None,
        }
    }
}

/// A stated minimum tier. Text that names no known tier is kept and ranks below every tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierRequirement {
    Level(Tier),
    Unrecognized(String),
}

impl TierRequirement {
    /// Parse a requirement cell; placeholders for "not required" yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        if is_unset(raw) {
            return None;
        }
        let trimmed = raw.trim();
        Some(match Tier::from_label(trimmed) {
            Some(tier) => Self::Level(tier),
            None => Self::Unrecognized(trimmed.to_string()),
        })
    }

    pub fn ordinal(&self) -> u8 {
        match self {
            Self::Level(tier) => tier.ordinal(),
            Self::Unrecognized(_) => 0,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Level(tier) => tier.label(),
            Self::Unrecognized(raw) => raw,
        }
    }
}

/// Empty cells and the dash placeholders all mean "no requirement".
pub fn is_unset(raw: &str) -> bool {
    matches!(raw.trim(), "" | "-" | "--" | "---")
}

/// Map a raw score onto a tier. `None` when the score is missing, zero, or not numeric, or
/// when the subject has no standard table.
pub fn classify(score: Option<&str>, table: Option<&StandardTable>) -> Option<Tier> {
    let table = table?;
    let value = parse_float_prefix(score?)?;
    if value == 0.0 {
        return None;
    }

    Some(
        Tier::graded()
            .into_iter()
            .find(|tier| {
                tier.threshold(table)
                    .is_some_and(|threshold| value >= threshold)
            })
            .unwrap_or(Tier::BelowBottom),
    )
}

/// Whether a student's tier satisfies a requirement. No requirement always passes; a missing
/// or below-bottom tier never satisfies a stated one.
pub fn passes(student: Option<Tier>, required: Option<&TierRequirement>) -> bool {
    let Some(required) = required else {
        return true;
    };

    match student {
        None | Some(Tier::BelowBottom) => false,
        Some(tier) => tier.ordinal() >= required.ordinal(),
    }
}

/// Same as [`passes`] but takes the requirement as raw sheet text.
pub fn passes_raw(student: Option<Tier>, required: &str) -> bool {
    passes(student, TierRequirement::parse(required).as_ref())
}

/// Ordinal of an English listening grade label; unknown labels rank 0.
pub fn listening_ordinal(label: &str) -> u8 {
    match label.trim() {
        "A級" | "A" => 4,
        "B級" | "B" => 3,
        "C級" | "C" => 2,
        "F級" | "F" => 1,
        _ => 0,
    }
}

/// Leading-integer parse in the spirit of spreadsheet formulas: `" 07"` → 7, `"12abc"` → 12.
pub fn parse_int_prefix(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    let (sign, digits) = split_sign(trimmed);
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    digits[..end].parse::<i64>().ok().map(|value| sign * value)
}

/// Leading-decimal parse: `"12.5"` → 12.5, `"88分"` → 88, `"abc"` → `None`.
pub fn parse_float_prefix(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let (sign, body) = split_sign(trimmed);
    if body.starts_with("Infinity") {
        return Some(sign as f64 * f64::INFINITY);
    }

    let bytes = body.as_bytes();
    let mut end = 0;
    let mut digits = 0;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
        digits += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
            digits += 1;
        }
    }
    if digits == 0 {
        return None;
    }
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    body[..end]
        .parse::<f64>()
        .ok()
        .map(|value| sign as f64 * value)
}

fn split_sign(value: &str) -> (i64, &str) {
    if let Some(rest) = value.strip_prefix('-') {
        (-1, rest)
    } else if let Some(rest) = value.strip_prefix('+') {
        (1, rest)
    } else {
        (1, value)
    }
}
