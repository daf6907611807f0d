pub use crate::config::*;
use crate::{aggregate_with, categories, sort_by_date, EventParser};

use log::info;

/// Holds the loaded records together with the parser and the rules that
/// apply to them.
///
/// ```
/// use chrono::NaiveDate;
/// use outbreak_events::pipeline::Pipeline;
/// use outbreak_events::{AggregationRules, EventRecord};
/// # use outbreak_events::EventErrors;
///
/// let mut pipeline = Pipeline::new(&AggregationRules::DEFAULT_RULES)?;
///
/// pipeline.add_record(EventRecord {
///     date: NaiveDate::from_ymd_opt(2024, 1, 1),
///     category: "Poultry".to_string(),
///     raw_text: "5 positive: Michigan (2), Texas (3)".to_string(),
/// });
///
/// let points = pipeline.run(Some("Poultry"));
/// assert_eq!(points.len(), 2);
/// assert_eq!(points[0].region_code, "MI");
///
/// # Ok::<(), EventErrors>(())
/// ```
pub struct Pipeline {
    pub(crate) _rules: AggregationRules,
    pub(crate) _parser: EventParser,
    pub(crate) _records: Vec<EventRecord>,
}

impl Pipeline {
    pub fn new(rules: &AggregationRules) -> Result<Pipeline, EventErrors> {
        Ok(Pipeline {
            _rules: rules.clone(),
            _parser: EventParser::new(&RegionTable::default())?,
            _records: Vec::new(),
        })
    }

    /// Replaces the region vocabulary used by the parser.
    pub fn regions(self, table: &RegionTable) -> Result<Pipeline, EventErrors> {
        Ok(Pipeline {
            _rules: self._rules,
            _parser: EventParser::new(table)?,
            _records: self._records,
        })
    }

    pub fn add_record(&mut self, record: EventRecord) {
        self._records.push(record);
    }

    pub fn add_records(&mut self, records: &[EventRecord]) {
        self._records.extend_from_slice(records);
    }

    pub fn records(&self) -> &[EventRecord] {
        &self._records
    }

    pub fn rules(&self) -> &AggregationRules {
        &self._rules
    }

    /// The distinct categories of the records, in order of first appearance.
    pub fn categories(&self) -> Vec<String> {
        categories(&self._records)
    }

    /// The number of records that have no usable date.
    pub fn undated_records(&self) -> usize {
        self._records.iter().filter(|r| r.date.is_none()).count()
    }

    pub fn parse(&self, event_text: &str) -> ParsedEvent {
        self._parser.parse(event_text)
    }

    /// Runs the aggregation and returns the points sorted by date.
    ///
    /// The records without a date are left out.
    pub fn run(&self, category_filter: Option<&str>) -> Vec<TimeSeriesPoint> {
        let num_undated = self.undated_records();
        if num_undated > 0 {
            info!(
                "Pipeline::run: leaving out {:?} records without a date",
                num_undated
            );
        }
        let mut points =
            aggregate_with(&self._parser, &self._records, category_filter, &self._rules);
        sort_by_date(&mut points);
        points
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(date: &str, category: &str, text: &str) -> EventRecord {
        EventRecord {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").ok(),
            category: category.to_string(),
            raw_text: text.to_string(),
        }
    }

    fn pipeline() -> Pipeline {
        let mut p = Pipeline::new(&AggregationRules::DEFAULT_RULES).unwrap();
        p.add_records(&[
            record("2024-04-10", "Poultry", "Colorado (3)"),
            record("not a date", "Dairy", "Texas (9)"),
            record("2024-03-25", "Dairy", "Texas (2), Texas (4)"),
            record("2024-04-02", "Poultry", "Michigan (4)"),
        ]);
        p
    }

    #[test]
    fn run_sorts_and_drops_undated() {
        let p = pipeline();
        assert_eq!(p.undated_records(), 1);
        let points = p.run(None);
        let summary: Vec<(String, String, u64)> = points
            .iter()
            .map(|pt| (pt.date.to_string(), pt.region_code.clone(), pt.cumulative_count))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("2024-03-25".to_string(), "TX".to_string(), 2),
                ("2024-03-25".to_string(), "TX".to_string(), 4),
                ("2024-04-02".to_string(), "MI".to_string(), 4),
                ("2024-04-10".to_string(), "CO".to_string(), 3),
            ]
        );
    }

    #[test]
    fn run_with_only_undated_records() {
        let mut p = Pipeline::new(&AggregationRules::DEFAULT_RULES).unwrap();
        p.add_record(record("", "Dairy", "Texas (9)"));
        assert!(p.run(None).is_empty());
        assert!(p.run(Some("Dairy")).is_empty());
        assert_eq!(p.undated_records(), 1);
        assert_eq!(p.records().len(), 1);
    }

    #[test]
    fn run_with_last_wins() {
        let rules = AggregationRules {
            duplicate_policy: DuplicatePolicy::LastWins,
        };
        let mut p = Pipeline::new(&rules).unwrap();
        p.add_records(pipeline().records());
        let points = p.run(Some("Dairy"));
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].cumulative_count, 4);
    }

    #[test]
    fn custom_regions() {
        let table = RegionTable::new(&[("Colorado".to_string(), "CO".to_string())]).unwrap();
        let p = pipeline().regions(&table).unwrap();
        let points = p.run(None);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].region_code, "CO");
        assert_eq!(p.records().len(), 4);
    }

    #[test]
    fn categories_and_parse() {
        let p = pipeline();
        assert_eq!(p.categories(), vec!["Poultry".to_string(), "Dairy".to_string()]);
        assert_eq!(p.parse("3 positive").total_count, 3);
    }

    #[test]
    fn empty_pipeline() {
        let p = Pipeline::new(&AggregationRules::DEFAULT_RULES).unwrap();
        assert!(p.run(None).is_empty());
        assert!(p.categories().is_empty());
    }
}
