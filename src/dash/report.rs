// The data handed to the map and the text views.

use crate::dash::{config_reader::policy_name, io_csv::RawTable, *};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PREVIEW_ROWS: usize = 5;

const MAX_CELL_WIDTH: usize = 60;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SummaryConfig {
    pub source: String,
    pub category: Option<String>,
    #[serde(rename = "duplicateRegionPolicy")]
    pub duplicate_region_policy: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SummaryCounts {
    #[serde(rename = "recordsRead")]
    pub records_read: usize,
    #[serde(rename = "recordsWithoutDate")]
    pub records_without_date: usize,
    pub points: usize,
}

/// The bounds of the color scale. Only defined when there is at least one point.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ColorRange {
    pub min: u64,
    pub max: u64,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SummaryPoint {
    pub date: String,
    #[serde(rename = "regionCode")]
    pub region_code: String,
    #[serde(rename = "cumulativeCount")]
    pub cumulative_count: u64,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FrameRegion {
    pub code: String,
    pub count: u64,
    pub label: String,
}

/// One step of the animation. The choropleth and the labels share it.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct Frame {
    pub date: String,
    pub regions: Vec<FrameRegion>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub config: SummaryConfig,
    pub categories: Vec<String>,
    pub counts: SummaryCounts,
    #[serde(rename = "noData")]
    pub no_data: bool,
    #[serde(rename = "colorRange")]
    pub color_range: Option<ColorRange>,
    pub points: Vec<SummaryPoint>,
    pub frames: Vec<Frame>,
}

fn format_date(d: &NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

/// Groups the points into frames, one per date.
///
/// The points are expected to be sorted by date.
pub fn build_frames(points: &[TimeSeriesPoint]) -> Vec<Frame> {
    let mut frames: Vec<Frame> = Vec::new();
    let mut current: Option<NaiveDate> = None;
    for p in points.iter() {
        if current != Some(p.date) {
            current = Some(p.date);
            frames.push(Frame {
                date: format_date(&p.date),
                regions: Vec::new(),
            });
        }
        if let Some(frame) = frames.last_mut() {
            frame.regions.push(FrameRegion {
                code: p.region_code.clone(),
                count: p.cumulative_count,
                label: p.cumulative_count.to_string(),
            });
        }
    }
    frames
}

pub fn color_range(points: &[TimeSeriesPoint]) -> Option<ColorRange> {
    let min = points.iter().map(|p| p.cumulative_count).min()?;
    let max = points.iter().map(|p| p.cumulative_count).max()?;
    Some(ColorRange { min, max })
}

pub fn build_summary(
    source_name: &str,
    category: Option<&str>,
    pipeline: &Pipeline,
    points: &[TimeSeriesPoint],
) -> DashboardSummary {
    let frames = build_frames(points);
    debug!("build_summary: {:?} frames", frames.len());
    DashboardSummary {
        config: SummaryConfig {
            source: source_name.to_string(),
            category: category.map(|s| s.to_string()),
            duplicate_region_policy: policy_name(pipeline.rules().duplicate_policy).to_string(),
        },
        categories: pipeline.categories(),
        counts: SummaryCounts {
            records_read: pipeline.records().len(),
            records_without_date: pipeline.undated_records(),
            points: points.len(),
        },
        no_data: points.is_empty(),
        color_range: color_range(points),
        points: points
            .iter()
            .map(|p| SummaryPoint {
                date: format_date(&p.date),
                region_code: p.region_code.clone(),
                cumulative_count: p.cumulative_count,
            })
            .collect(),
        frames,
    }
}

fn truncate_cell(s: &str) -> String {
    if s.chars().count() > MAX_CELL_WIDTH {
        let mut res: String = s.chars().take(MAX_CELL_WIDTH - 3).collect();
        res.push_str("...");
        res
    } else {
        s.to_string()
    }
}

/// The first rows of the table, with aligned columns.
pub fn render_preview(table: &RawTable, num_rows: usize) -> String {
    let rows: Vec<Vec<String>> = table
        .rows
        .iter()
        .take(num_rows)
        .map(|r| {
            (0..table.headers.len())
                .map(|idx| truncate_cell(r.get(idx).map(|s| s.as_str()).unwrap_or("")))
                .collect()
        })
        .collect();
    let headers: Vec<String> = table.headers.iter().map(|h| truncate_cell(h)).collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for r in rows.iter() {
        for (idx, c) in r.iter().enumerate() {
            widths[idx] = widths[idx].max(c.chars().count());
        }
    }

    let format_line = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(widths.iter())
            .map(|(c, w)| format!("{:<width$}", c, width = *w))
            .collect::<Vec<String>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut lines: Vec<String> = vec![format_line(&headers)];
    lines.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<String>>()
            .join("-+-"),
    );
    for r in rows.iter() {
        lines.push(format_line(r));
    }
    lines.join("\n")
}

/// The events of each category, in order of first appearance of the categories.
///
/// Within a category, the events are sorted by date. The events without a date come last.
pub fn render_timeline(records: &[EventRecord]) -> String {
    let mut lines: Vec<String> = Vec::new();
    for cat in categories(records) {
        lines.push(format!("### {}", cat));
        let mut subset: Vec<&EventRecord> = records.iter().filter(|r| r.category == cat).collect();
        // None sorts before Some: put the undated records at the end.
        subset.sort_by_key(|r| (r.date.is_none(), r.date));
        for r in subset {
            let date_s = r
                .date
                .as_ref()
                .map(format_date)
                .unwrap_or_else(|| "unknown date".to_string());
            lines.push(format!("{}: {}", date_s, r.raw_text));
        }
    }
    lines.join("\n")
}
