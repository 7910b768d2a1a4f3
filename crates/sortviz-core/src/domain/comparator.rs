//! Comparator settings attached to teaching-mode requests.
//!
//! The service performs every comparison itself; the client only tells it
//! which ordering the user picked.  [`ComparatorSettings::to_info`] produces
//! the `comparatorInfo` object of a `SORT_REQUEST`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::protocol::messages::{ComparatorInfo, DataType};

/// Requested sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// How two numbers are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComparisonMethod {
    /// Plain numeric order.
    #[default]
    Numeric,
    /// Order by absolute value.
    Absolute,
    /// Inverted numeric order, a deliberately "wrong" comparator for demos.
    Reverse,
}

/// The `Person` field a record dataset is sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersonField {
    #[default]
    Score,
    Age,
    Id,
    Name,
}

/// The user's comparator choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ComparatorSettings {
    #[serde(default)]
    pub direction: SortDirection,
    #[serde(default)]
    pub method: ComparisonMethod,
    #[serde(default)]
    pub struct_field: PersonField,
}

impl ComparatorSettings {
    /// Returns `true` for an ascending sort.
    pub fn ascending(&self) -> bool {
        self.direction == SortDirection::Ascending
    }

    /// Human-readable summary, e.g. `"ascending - absolute value"`.
    pub fn description(&self) -> String {
        let method = match self.method {
            ComparisonMethod::Numeric => "numeric",
            ComparisonMethod::Absolute => "absolute value",
            ComparisonMethod::Reverse => "reversed",
        };
        format!("{} - {method}", self.direction)
    }

    /// Builds the wire description for a dataset of `data_type`.
    ///
    /// `structField` is only sent for `Person` data.
    pub fn to_info(&self, data_type: DataType) -> ComparatorInfo {
        ComparatorInfo {
            direction: self.direction,
            method: self.method,
            description: self.description(),
            struct_field: (data_type == DataType::Person).then_some(self.struct_field),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortDirection::Ascending => "ascending",
            SortDirection::Descending => "descending",
        })
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Ascending),
            "desc" | "descending" => Ok(SortDirection::Descending),
            other => Err(format!("unknown sort direction: {other}")),
        }
    }
}

impl FromStr for ComparisonMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "numeric" => Ok(ComparisonMethod::Numeric),
            "absolute" => Ok(ComparisonMethod::Absolute),
            "reverse" => Ok(ComparisonMethod::Reverse),
            other => Err(format!("unknown comparison method: {other}")),
        }
    }
}

impl FromStr for PersonField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "score" => Ok(PersonField::Score),
            "age" => Ok(PersonField::Age),
            "id" => Ok(PersonField::Id),
            "name" => Ok(PersonField::Name),
            other => Err(format!("unknown person field: {other}")),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
