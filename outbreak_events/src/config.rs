// ********* Input data structures ***********

use chrono::NaiveDate;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::Display;

/// One row of the surveillance table.
///
/// The date is `None` when the source value could not be understood. Such
/// records are kept by the loaders (they still show up in previews) but they
/// never reach the aggregation.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct EventRecord {
    pub date: Option<NaiveDate>,
    pub category: String,
    pub raw_text: String,
}

// ******** Output data structures *********

/// A region mention found in an event description.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct RegionCount {
    pub region_code: String,
    pub count: u64,
}

/// The result of parsing one event description.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct ParsedEvent {
    /// The number in front of `positive`, or 0 if the text does not have one.
    pub total_count: u64,
    /// The region mentions, in the order in which they appear in the text.
    pub regions: Vec<RegionCount>,
}

#[derive(Eq, PartialEq, Debug, Clone, Hash, PartialOrd, Ord)]
pub struct TimeSeriesPoint {
    pub date: NaiveDate,
    pub region_code: String,
    pub cumulative_count: u64,
}

/// Errors that prevent the parser from being built.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum EventErrors {
    InvalidRegionTable(String),
    InvalidPattern(String),
}

impl Error for EventErrors {}

impl Display for EventErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventErrors::InvalidRegionTable(msg) => write!(f, "Invalid region table: {}", msg),
            EventErrors::InvalidPattern(msg) => write!(f, "Invalid region pattern: {}", msg),
        }
    }
}

// ********* Configuration **********

/// An entry of the region vocabulary: the name as written in the reports
/// and the short code used as the spatial key of the map.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct Region {
    pub name: String,
    pub code: String,
}

/// The closed vocabulary of regions recognized by the parser.
///
/// Any region name that is not in the table is ignored when parsing.
/// The default table covers the states reported in the 2024 H5N1 outbreak.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RegionTable {
    regions: Vec<Region>,
}

const DEFAULT_REGIONS: [(&str, &str); 7] = [
    ("Michigan", "MI"),
    ("Texas", "TX"),
    ("South Dakota", "SD"),
    ("Massachusetts", "MA"),
    ("Kansas", "KS"),
    ("Minnesota", "MN"),
    ("Colorado", "CO"),
];

impl RegionTable {
    /// Builds a table from (name, code) pairs.
    ///
    /// Names must be unique and non-empty. Codes must be non-empty.
    pub fn new(regions: &[(String, String)]) -> Result<RegionTable, EventErrors> {
        let mut seen: HashSet<&str> = HashSet::new();
        for (name, code) in regions.iter() {
            if name.trim().is_empty() {
                return Err(EventErrors::InvalidRegionTable(
                    "empty region name".to_string(),
                ));
            }
            if code.trim().is_empty() {
                return Err(EventErrors::InvalidRegionTable(format!(
                    "empty code for region {}",
                    name
                )));
            }
            if !seen.insert(name.as_str()) {
                return Err(EventErrors::InvalidRegionTable(format!(
                    "region {} declared multiple times",
                    name
                )));
            }
        }
        Ok(RegionTable {
            regions: regions
                .iter()
                .map(|(name, code)| Region {
                    name: name.clone(),
                    code: code.clone(),
                })
                .collect(),
        })
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// The code for a region name. Unknown names are returned unchanged.
    pub fn code_for(&self, name: &str) -> String {
        self.regions
            .iter()
            .find(|r| r.name == name)
            .map(|r| r.code.clone())
            .unwrap_or_else(|| name.to_string())
    }
}

impl Default for RegionTable {
    fn default() -> Self {
        RegionTable {
            regions: DEFAULT_REGIONS
                .iter()
                .map(|(name, code)| Region {
                    name: name.to_string(),
                    code: code.to_string(),
                })
                .collect(),
        }
    }
}

/// What to do when the same region is mentioned several times in one
/// event description.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum DuplicatePolicy {
    /// Every mention becomes a point.
    KeepAll,
    /// Only the last mention is kept, at the position of the first one.
    LastWins,
    /// Only the first mention is kept.
    FirstWins,
    /// The counts of all the mentions are added, at the position of the first one.
    Sum,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct AggregationRules {
    pub duplicate_policy: DuplicatePolicy,
}

impl AggregationRules {
    pub const DEFAULT_RULES: AggregationRules = AggregationRules {
        duplicate_policy: DuplicatePolicy::KeepAll,
    };
}
