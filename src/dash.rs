use log::{debug, info, warn};

use outbreak_events::pipeline::Pipeline;
use outbreak_events::*;
use snafu::{prelude::*, ErrorCompat, Snafu};

use std::fs;
use std::path::Path;

use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::dash::config_reader::*;

pub mod config_reader;
pub mod io_common;
pub mod io_csv;
pub mod report;

/// The input file used when neither a configuration nor an input is provided.
pub const DEFAULT_INPUT: &str = "H5N1_US_2024.csv";

const NO_DATA_NOTICE: &str = "No data to display for this selection.";

#[derive(Debug, Snafu)]
pub enum DashError {
    #[snafu(display("Error opening CSV file {path}"))]
    OpeningCsv { source: csv::Error, path: String },
    #[snafu(display("Error reading line {lineno} of the CSV file"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display("The CSV file has no column named {column}"))]
    MissingColumn { column: String },
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON content"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error writing file {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("The configuration file has no parent directory"))]
    MissingParentDir {},
    #[snafu(display("The region table is invalid"))]
    InvalidRegions { source: EventErrors },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type DashResult<T> = Result<T, DashError>;

pub type BDashResult<T> = Result<T, Box<DashError>>;

/// The options of one run, as given on the command line.
///
/// The options set here take precedence over the values of the configuration file.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct DashOptions {
    pub config: Option<String>,
    pub input: Option<String>,
    pub category: Option<String>,
    pub out: Option<String>,
    pub preview: Option<usize>,
    pub timeline: bool,
    pub reference: Option<String>,
}

fn load_config(opts: &DashOptions) -> BDashResult<(DashConfig, String)> {
    match (&opts.config, &opts.input) {
        (Some(config_path), input_o) => {
            let config = read_config(config_path)?;
            info!("config: {:?}", config);
            let input_path = match input_o {
                Some(p) => p.clone(),
                None => {
                    let root_p = Path::new(config_path.as_str())
                        .parent()
                        .context(MissingParentDirSnafu {})?;
                    root_p
                        .join(config.source.file_path.as_str())
                        .display()
                        .to_string()
                }
            };
            Ok((config, input_path))
        }
        (None, Some(input_path)) => Ok((DashConfig::from_file_path(input_path), input_path.clone())),
        (None, None) => Ok((DashConfig::from_file_path(DEFAULT_INPUT), DEFAULT_INPUT.to_string())),
    }
}

fn write_summary(summary: &str, out: Option<String>) -> BDashResult<()> {
    match out.as_deref() {
        None | Some("stdout") => {
            println!("summary:{}", summary);
        }
        Some(path) => {
            info!("Writing summary to {:?}", path);
            fs::write(path, summary).context(WritingOutputSnafu { path })?;
        }
    }
    Ok(())
}

/// Loads the events, runs the aggregation and writes the dashboard data.
///
/// Returns the summary that was produced.
pub fn run_dashboard(opts: &DashOptions) -> BDashResult<JSValue> {
    let (config, input_path) = load_config(opts)?;

    let rules = validate_rules(&config.rules)?;
    let mut pipeline = Pipeline::new(&rules).context(InvalidRegionsSnafu {})?;
    if let Some(regions) = &config.regions {
        let table = validate_regions(regions)?;
        pipeline = pipeline.regions(&table).context(InvalidRegionsSnafu {})?;
    }

    info!("Attempting to read event file {:?}", input_path);
    let table = io_csv::read_csv_table(&input_path)?;
    let records = io_csv::to_event_records(&table, &config.source)?;
    pipeline.add_records(&records);
    debug!("records: {:?}", records);

    let output_settings = config.output_settings.clone().unwrap_or_default();

    let preview_rows = opts
        .preview
        .or(output_settings.preview_rows)
        .unwrap_or(report::DEFAULT_PREVIEW_ROWS);
    if preview_rows > 0 {
        println!("{}", report::render_preview(&table, preview_rows));
    }

    if opts.timeline {
        println!("{}", report::render_timeline(pipeline.records()));
    }

    let category = opts.category.clone().or(output_settings.category);
    let categories = pipeline.categories();
    if let Some(cat) = &category {
        if !categories.contains(cat) {
            warn!(
                "Category {:?} does not appear in the data, known categories: {:?}",
                cat, categories
            );
        }
    }

    let points = pipeline.run(category.as_deref());
    info!("points: {:?}", points);

    let summary = report::build_summary(
        &io_common::simplify_file_name(&input_path),
        category.as_deref(),
        &pipeline,
        &points,
    );
    if summary.no_data {
        println!("{}", NO_DATA_NOTICE);
    }

    let result_js = serde_json::to_value(&summary).context(ParsingJsonSnafu {})?;
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;
    write_summary(
        &pretty_js_stats,
        opts.out.clone().or(output_settings.output_path),
    )?;

    // The reference summary, if provided for comparison
    if let Some(summary_p) = &opts.reference {
        let summary_ref = read_summary(summary_p)?;
        let pretty_js_summary_ref =
            serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
        if pretty_js_summary_ref != pretty_js_stats {
            warn!("Found differences with the reference summary");
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_stats.as_ref(),
                "\n",
            );
            return Err(Box::new(DashError::Whatever {
                message: "Difference detected between calculated summary and reference summary"
                    .to_string(),
                source: None,
            }));
        }
    }

    Ok(result_js)
}

/// Prints the error chain of a failed run.
pub fn report_error(e: &DashError) {
    eprintln!("An error occured: {}", e);
    let mut cause = std::error::Error::source(e);
    while let Some(c) = cause {
        eprintln!("  caused by: {}", c);
        cause = std::error::Error::source(c);
    }
    if let Some(bt) = ErrorCompat::backtrace(e) {
        eprintln!("trace: {}", bt);
    }
}

#[cfg(test)]
fn run_dashboard_test(test_name: &str, config_lpath: &str, summary_lpath: &str) {
    let _ = env_logger::builder().is_test(true).try_init();
    let test_dir =
        option_env!("DASH_TEST_DIR").unwrap_or(concat!(env!("CARGO_MANIFEST_DIR"), "/testdata"));
    info!("Running test {}", test_name);
    let opts = DashOptions {
        config: Some(format!("{}/{}/{}", test_dir, test_name, config_lpath)),
        reference: Some(format!("{}/{}/{}", test_dir, test_name, summary_lpath)),
        preview: Some(0),
        ..Default::default()
    };
    let res = run_dashboard(&opts);
    if let Err(e) = &res {
        report_error(e);
    }
    assert!(res.is_ok(), "test {} failed", test_name);
}

#[cfg(test)]
pub fn test_wrapper(test_name: &str) {
    run_dashboard_test(
        test_name,
        format!("{}_config.json", test_name).as_str(),
        format!("{}_expected_summary.json", test_name).as_str(),
    )
}

#[cfg(test)]
mod tests {

    use super::*;

    fn test_dir() -> String {
        concat!(env!("CARGO_MANIFEST_DIR"), "/testdata").to_string()
    }

    #[test]
    fn poultry_end_to_end() {
        test_wrapper("poultry_end_to_end");
    }

    #[test]
    fn mixed_categories() {
        test_wrapper("mixed_categories");
    }

    #[test]
    fn no_data() {
        test_wrapper("no_data");
    }

    #[test]
    fn command_line_overrides_config() {
        let opts = DashOptions {
            config: Some(format!(
                "{}/mixed_categories/mixed_categories_config.json",
                test_dir()
            )),
            category: Some("Poultry".to_string()),
            preview: Some(0),
            ..Default::default()
        };
        let js = run_dashboard(&opts).unwrap();
        assert_eq!(js["config"]["category"], "Poultry");
        assert_eq!(js["counts"]["points"], 2);
        assert_eq!(js["frames"][0]["date"], "2024-04-02");
    }

    #[test]
    fn input_without_config() {
        let opts = DashOptions {
            input: Some(format!(
                "{}/poultry_end_to_end/poultry_end_to_end_events.csv",
                test_dir()
            )),
            preview: Some(2),
            timeline: true,
            ..Default::default()
        };
        let js = run_dashboard(&opts).unwrap();
        assert_eq!(js["config"]["category"], JSValue::Null);
        assert_eq!(js["config"]["duplicateRegionPolicy"], "keepAll");
        assert_eq!(js["counts"]["points"], 2);
    }

    #[test]
    fn missing_input_is_fatal() {
        let opts = DashOptions {
            input: Some(format!("{}/does_not_exist.csv", test_dir())),
            preview: Some(0),
            ..Default::default()
        };
        let res = run_dashboard(&opts);
        assert!(matches!(res, Err(e) if matches!(*e, DashError::OpeningCsv { .. })));
    }

    #[test]
    fn reference_mismatch_fails() {
        let opts = DashOptions {
            config: Some(format!("{}/no_data/no_data_config.json", test_dir())),
            reference: Some(format!(
                "{}/poultry_end_to_end/poultry_end_to_end_expected_summary.json",
                test_dir()
            )),
            preview: Some(0),
            ..Default::default()
        };
        assert!(run_dashboard(&opts).is_err());
    }
}
