// Version and mode matching - pure comparison primitives
// Answers "is version V within range R" and "does a variant's mode apply to
// the active mode"; carries no engine state.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VersionError {
    #[error("malformed version '{text}'")]
    MalformedVersion { text: String },
    #[error("malformed version range '{text}'")]
    MalformedRange { text: String },
}

/// Operating context the engine is bound to for its entire lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Offline,
    Online,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Offline => f.write_str("offline"),
            Mode::Online => f.write_str("online"),
        }
    }
}

/// Mode qualifier on an attribute variant; `Both` matches either mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantMode {
    Offline,
    Online,
    Both,
}

impl VariantMode {
    pub fn matches(self, mode: Mode) -> bool {
        match self {
            VariantMode::Both => true,
            VariantMode::Offline => mode == Mode::Offline,
            VariantMode::Online => mode == Mode::Online,
        }
    }
}

impl FromStr for VariantMode {
    type Err = ();

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text {
            "offline" => Ok(VariantMode::Offline),
            "online" => Ok(VariantMode::Online),
            "both" => Ok(VariantMode::Both),
            _ => Err(()),
        }
    }
}

/// Dotted numeric product version, compared segment-wise with zero padding
/// so that `12.2` equals `12.2.0.0`.
#[derive(Debug, Clone, Eq)]
pub struct ModelVersion {
    segments: Vec<u64>,
    text: String,
}

impl ModelVersion {
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl FromStr for ModelVersion {
    type Err = VersionError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(VersionError::MalformedVersion {
                text: text.to_string(),
            });
        }
        let segments = trimmed
            .split('.')
            .map(|segment| segment.parse::<u64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| VersionError::MalformedVersion {
                text: text.to_string(),
            })?;
        Ok(Self {
            segments,
            text: trimmed.to_string(),
        })
    }
}

impl PartialEq for ModelVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl PartialOrd for ModelVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ModelVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let length = self.segments.len().max(other.segments.len());
        for index in 0..length {
            let left = self.segments.get(index).copied().unwrap_or(0);
            let right = other.segments.get(index).copied().unwrap_or(0);
            match left.cmp(&right) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        Ordering::Equal
    }
}

impl fmt::Display for ModelVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Version range in interval notation.
///
/// Accepted forms: a bare version (exact match), `[a,b]`, `[a,b)`, `(a,b]`,
/// `(a,b)`, and open-ended variants with an empty bound such as `[a,)` or
/// `(,b]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRange {
    lower: Option<(ModelVersion, bool)>,
    upper: Option<(ModelVersion, bool)>,
}

impl VersionRange {
    pub fn contains(&self, version: &ModelVersion) -> bool {
        if let Some((lower, inclusive)) = &self.lower {
            let ordering = version.cmp(lower);
            if ordering == Ordering::Less || (ordering == Ordering::Equal && !inclusive) {
                return false;
            }
        }
        if let Some((upper, inclusive)) = &self.upper {
            let ordering = version.cmp(upper);
            if ordering == Ordering::Greater || (ordering == Ordering::Equal && !inclusive) {
                return false;
            }
        }
        true
    }
}

impl FromStr for VersionRange {
    type Err = VersionError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let trimmed = text.trim();
        let malformed = || VersionError::MalformedRange {
            text: text.to_string(),
        };

        let lower_inclusive = match trimmed.chars().next() {
            Some('[') => true,
            Some('(') => false,
            Some(_) => {
                // Bare version: the range containing exactly that version.
                let version: ModelVersion = trimmed.parse()?;
                return Ok(Self {
                    lower: Some((version.clone(), true)),
                    upper: Some((version, true)),
                });
            }
            None => return Err(malformed()),
        };

        let upper_inclusive = match trimmed.chars().last() {
            Some(']') => true,
            Some(')') => false,
            _ => return Err(malformed()),
        };

        let inner = &trimmed[1..trimmed.len() - 1];
        let (lower_text, upper_text) = inner.split_once(',').ok_or_else(malformed)?;

        let lower = match lower_text.trim() {
            "" => None,
            bound => Some((bound.parse()?, lower_inclusive)),
        };
        let upper = match upper_text.trim() {
            "" => None,
            bound => Some((bound.parse()?, upper_inclusive)),
        };
        if lower.is_none() && upper.is_none() {
            return Err(malformed());
        }
        Ok(Self { lower, upper })
    }
}

/// Range-expression entry point used by the composer: total over all valid
/// version strings, and a distinct error for malformed range expressions.
pub fn is_version_in_range(version: &ModelVersion, range: &str) -> Result<bool, VersionError> {
    let range: VersionRange = range.parse()?;
    Ok(range.contains(version))
}
