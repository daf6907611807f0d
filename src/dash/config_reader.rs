use crate::dash::*;

use serde::{Deserialize, Serialize};

pub const DEFAULT_DATE_COLUMN: &str = "Date_Event";
pub const DEFAULT_CATEGORY_COLUMN: &str = "Category";
pub const DEFAULT_EVENT_COLUMN: &str = "Event";

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SourceSettings {
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "dateColumn")]
    pub date_column: Option<String>,
    #[serde(rename = "categoryColumn")]
    pub category_column: Option<String>,
    #[serde(rename = "eventColumn")]
    pub event_column: Option<String>,
    #[serde(rename = "dateFormats")]
    pub date_formats: Option<Vec<String>>,
}

impl SourceSettings {
    pub fn date_column(&self) -> &str {
        self.date_column.as_deref().unwrap_or(DEFAULT_DATE_COLUMN)
    }

    pub fn category_column(&self) -> &str {
        self.category_column
            .as_deref()
            .unwrap_or(DEFAULT_CATEGORY_COLUMN)
    }

    pub fn event_column(&self) -> &str {
        self.event_column.as_deref().unwrap_or(DEFAULT_EVENT_COLUMN)
    }

    pub fn date_formats(&self) -> Vec<String> {
        match &self.date_formats {
            Some(l) if !l.is_empty() => l.clone(),
            _ => io_common::DEFAULT_DATE_FORMATS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct RegionEntry {
    pub name: String,
    pub code: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct DashRules {
    #[serde(rename = "duplicateRegionPolicy")]
    pub duplicate_region_policy: Option<String>,
}

impl DashRules {
    pub fn duplicate_policy(&self) -> DashResult<DuplicatePolicy> {
        match self.duplicate_region_policy.as_deref() {
            None | Some("keepAll") => Ok(DuplicatePolicy::KeepAll),
            Some("lastWins") => Ok(DuplicatePolicy::LastWins),
            Some("firstWins") => Ok(DuplicatePolicy::FirstWins),
            Some("sum") => Ok(DuplicatePolicy::Sum),
            Some(x) => whatever!("unknown duplicate region policy: {}", x),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSettings {
    pub category: Option<String>,
    #[serde(rename = "previewRows")]
    pub preview_rows: Option<usize>,
    #[serde(rename = "outputPath")]
    pub output_path: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct DashConfig {
    pub source: SourceSettings,
    pub regions: Option<Vec<RegionEntry>>,
    pub rules: Option<DashRules>,
    #[serde(rename = "outputSettings")]
    pub output_settings: Option<OutputSettings>,
}

impl DashConfig {
    /// The configuration used when only an input file is given.
    pub fn from_file_path(path: &str) -> DashConfig {
        DashConfig {
            source: SourceSettings {
                file_path: path.to_string(),
                date_column: None,
                category_column: None,
                event_column: None,
                date_formats: None,
            },
            regions: None,
            rules: None,
            output_settings: None,
        }
    }
}

pub fn read_config(path: &str) -> BDashResult<DashConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: DashConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(config)
}

pub fn read_summary(path: &str) -> BDashResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

pub fn validate_regions(entries: &[RegionEntry]) -> DashResult<RegionTable> {
    let pairs: Vec<(String, String)> = entries
        .iter()
        .map(|e| (e.name.clone(), e.code.clone()))
        .collect();
    RegionTable::new(&pairs).context(InvalidRegionsSnafu {})
}

pub fn validate_rules(rules: &Option<DashRules>) -> DashResult<AggregationRules> {
    let duplicate_policy = match rules {
        Some(r) => r.duplicate_policy()?,
        None => AggregationRules::DEFAULT_RULES.duplicate_policy,
    };
    Ok(AggregationRules { duplicate_policy })
}

pub fn policy_name(policy: DuplicatePolicy) -> &'static str {
    match policy {
        DuplicatePolicy::KeepAll => "keepAll",
        DuplicatePolicy::LastWins => "lastWins",
        DuplicatePolicy::FirstWins => "firstWins",
        DuplicatePolicy::Sum => "sum",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config() {
        let config: DashConfig =
            serde_json::from_str(r#"{"source": {"filePath": "events.csv"}}"#).unwrap();
        assert_eq!(config, DashConfig::from_file_path("events.csv"));
        assert_eq!(config.source.date_column(), "Date_Event");
        assert_eq!(config.source.category_column(), "Category");
        assert_eq!(config.source.event_column(), "Event");
        assert_eq!(
            config.source.date_formats().len(),
            io_common::DEFAULT_DATE_FORMATS.len()
        );
        assert_eq!(
            validate_rules(&config.rules).unwrap(),
            AggregationRules::DEFAULT_RULES
        );
    }

    #[test]
    fn full_config() {
        let config: DashConfig = serde_json::from_str(
            r#"{
              "source": {"filePath": "events.csv", "dateColumn": "When", "dateFormats": ["%d.%m.%Y"]},
              "regions": [{"name": "Idaho", "code": "ID"}],
              "rules": {"duplicateRegionPolicy": "lastWins"},
              "outputSettings": {"category": "Dairy", "previewRows": 0}
            }"#,
        )
        .unwrap();
        assert_eq!(config.source.date_column(), "When");
        assert_eq!(config.source.date_formats(), vec!["%d.%m.%Y".to_string()]);
        let rules = validate_rules(&config.rules).unwrap();
        assert_eq!(rules.duplicate_policy, DuplicatePolicy::LastWins);
        let table = validate_regions(config.regions.as_deref().unwrap()).unwrap();
        assert_eq!(table.code_for("Idaho"), "ID");
        let output = config.output_settings.unwrap();
        assert_eq!(output.category.as_deref(), Some("Dairy"));
        assert_eq!(output.preview_rows, Some(0));
    }

    #[test]
    fn unknown_policy() {
        let rules = Some(DashRules {
            duplicate_region_policy: Some("average".to_string()),
        });
        assert!(validate_rules(&rules).is_err());
    }

    #[test]
    fn invalid_regions() {
        let entries = vec![
            RegionEntry {
                name: "Idaho".to_string(),
                code: "ID".to_string(),
            },
            RegionEntry {
                name: "Idaho".to_string(),
                code: "ID".to_string(),
            },
        ];
        assert!(matches!(
            validate_regions(&entries),
            Err(DashError::InvalidRegions { .. })
        ));
    }

    #[test]
    fn policy_names() {
        for name in ["keepAll", "lastWins", "firstWins", "sum"] {
            let rules = DashRules {
                duplicate_region_policy: Some(name.to_string()),
            };
            assert_eq!(policy_name(rules.duplicate_policy().unwrap()), name);
        }
    }
}
