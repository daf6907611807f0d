mod config;
pub mod manual;
pub mod pipeline;

use log::{debug, info, warn};
use regex::Regex;

use std::{collections::HashMap, sync::OnceLock};

pub use crate::config::*;

// **** Parsing ****

const TOTAL_PATTERN: &str = r"([0-9]+) positive";

/// Extracts the counts contained in the free-text description of an event.
///
/// The parser is built once from a region table and can be reused for any
/// number of descriptions.
#[derive(Debug, Clone)]
pub struct EventParser {
    table: RegionTable,
    total_re: Regex,
    // None when the table is empty: nothing can match.
    region_re: Option<Regex>,
}

impl EventParser {
    pub fn new(table: &RegionTable) -> Result<EventParser, EventErrors> {
        let total_re =
            Regex::new(TOTAL_PATTERN).map_err(|e| EventErrors::InvalidPattern(e.to_string()))?;
        let region_re = if table.is_empty() {
            None
        } else {
            let pattern = region_pattern(table);
            debug!("EventParser::new: region pattern: {}", pattern);
            Some(Regex::new(&pattern).map_err(|e| EventErrors::InvalidPattern(e.to_string()))?)
        };
        Ok(EventParser {
            table: table.clone(),
            total_re,
            region_re,
        })
    }

    pub fn region_table(&self) -> &RegionTable {
        &self.table
    }

    /// Parses one event description.
    ///
    /// This never fails: a text without any recognized content gives a
    /// total of 0 and no regions.
    pub fn parse(&self, event_text: &str) -> ParsedEvent {
        let total_count = self
            .total_re
            .captures_iter(event_text)
            .find_map(|caps| read_count(&caps[1]))
            .unwrap_or(0);

        let mut regions: Vec<RegionCount> = Vec::new();
        if let Some(region_re) = &self.region_re {
            for caps in region_re.captures_iter(event_text) {
                let name = &caps[1];
                if let Some(count) = read_count(&caps[2]) {
                    regions.push(RegionCount {
                        region_code: self.table.code_for(name),
                        count,
                    });
                }
            }
        }
        ParsedEvent {
            total_count,
            regions,
        }
    }
}

// Longest names first, so that a name that is the suffix of another one
// does not shadow it. A name may also match inside a longer word.
fn region_pattern(table: &RegionTable) -> String {
    let mut names: Vec<&str> = table.regions().iter().map(|r| r.name.as_str()).collect();
    names.sort_by_key(|n| std::cmp::Reverse(n.len()));
    let alternatives: Vec<String> = names.iter().map(|n| regex::escape(n)).collect();
    format!(r"({}) \(([0-9]+)\)", alternatives.join("|"))
}

fn read_count(digits: &str) -> Option<u64> {
    match digits.parse::<u64>() {
        Ok(x) => Some(x),
        Err(e) => {
            warn!("read_count: skipping count {:?}: {}", digits, e);
            None
        }
    }
}

fn default_parser() -> &'static EventParser {
    static PARSER: OnceLock<EventParser> = OnceLock::new();
    PARSER.get_or_init(|| {
        EventParser::new(&RegionTable::default()).expect("the default region table is valid")
    })
}

/// Parses one event description with the default region table.
pub fn parse(event_text: &str) -> ParsedEvent {
    default_parser().parse(event_text)
}

// **** Aggregation ****

/// Applies the duplicate policy to the regions extracted from one record.
///
/// Regions are compared by code. The order of first appearance is preserved.
pub fn apply_duplicate_policy(regions: &[RegionCount], policy: DuplicatePolicy) -> Vec<RegionCount> {
    if policy == DuplicatePolicy::KeepAll {
        return regions.to_vec();
    }
    let mut res: Vec<RegionCount> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();
    for rc in regions.iter() {
        match positions.get(rc.region_code.as_str()).copied() {
            None => {
                positions.insert(rc.region_code.as_str(), res.len());
                res.push(rc.clone());
            }
            Some(idx) => {
                let current = &mut res[idx];
                match policy {
                    DuplicatePolicy::LastWins => current.count = rc.count,
                    DuplicatePolicy::Sum => current.count = current.count.saturating_add(rc.count),
                    DuplicatePolicy::FirstWins | DuplicatePolicy::KeepAll => {}
                }
            }
        }
    }
    res
}

/// Turns the records into a flat list of time series points.
///
/// Arguments:
/// * `parser` the parser to apply to the text of each record
/// * `records` the records to process
/// * `category_filter` if provided, only the records with exactly this category are processed
/// * `rules` the rules for handling repeated mentions
///
/// The points are returned in the order of the records. Callers that need
/// a time-ordered sequence should use [`sort_by_date`].
/// Records without a date are skipped.
pub fn aggregate_with(
    parser: &EventParser,
    records: &[EventRecord],
    category_filter: Option<&str>,
    rules: &AggregationRules,
) -> Vec<TimeSeriesPoint> {
    info!(
        "Aggregating {:?} records, category filter: {:?}, rules: {:?}",
        records.len(),
        category_filter,
        rules
    );
    let mut res: Vec<TimeSeriesPoint> = Vec::new();
    let mut num_matched = 0;
    for record in records.iter() {
        if let Some(cat) = category_filter {
            if record.category != cat {
                continue;
            }
        }
        let date = match record.date {
            Some(d) => d,
            None => {
                debug!("aggregate: skipping undated record {:?}", record.raw_text);
                continue;
            }
        };
        num_matched += 1;
        let parsed = parser.parse(&record.raw_text);
        debug!("aggregate: {:?} -> {:?}", record, parsed);
        for rc in apply_duplicate_policy(&parsed.regions, rules.duplicate_policy) {
            res.push(TimeSeriesPoint {
                date,
                region_code: rc.region_code,
                cumulative_count: rc.count,
            });
        }
    }
    info!(
        "Aggregated {:?} records into {:?} points",
        num_matched,
        res.len()
    );
    res
}

/// Aggregates with the default region table and the default rules.
pub fn aggregate(records: &[EventRecord], category_filter: Option<&str>) -> Vec<TimeSeriesPoint> {
    aggregate_with(
        default_parser(),
        records,
        category_filter,
        &AggregationRules::DEFAULT_RULES,
    )
}

/// Sorts the points by date. Points of the same date keep their relative order.
pub fn sort_by_date(points: &mut [TimeSeriesPoint]) {
    points.sort_by_key(|p| p.date);
}

/// The distinct categories, in order of first appearance.
pub fn categories(records: &[EventRecord]) -> Vec<String> {
    let mut res: Vec<String> = Vec::new();
    for r in records.iter() {
        if !res.contains(&r.category) {
            res.push(r.category.clone());
        }
    }
    res
}
