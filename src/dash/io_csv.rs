// Primitives for reading CSV files.

use crate::dash::{config_reader::SourceSettings, io_common::parse_date, *};

/// The content of the CSV file, kept as strings for the preview.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    fn column_index(&self, name: &str) -> DashResult<usize> {
        self.headers
            .iter()
            .position(|h| h.trim() == name)
            .context(MissingColumnSnafu { column: name })
    }
}

pub fn read_csv_table(path: &str) -> BDashResult<RawTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .context(OpeningCsvSnafu { path })?;

    let headers: Vec<String> = rdr
        .headers()
        .context(CsvLineParseSnafu { lineno: 1_usize })?
        .iter()
        .enumerate()
        .map(|(idx, h)| {
            if idx == 0 {
                h.trim_start_matches('\u{feff}').to_string()
            } else {
                h.to_string()
            }
        })
        .collect();
    debug!("read_csv_table: headers: {:?}", headers);

    let mut rows: Vec<Vec<String>> = Vec::new();
    for (idx, line_r) in rdr.records().enumerate() {
        // The header is line 1.
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu { lineno })?;
        let row: Vec<String> = line.iter().map(|s| s.to_string()).collect();
        debug!("read_csv_table: lineno: {:?} row: {:?}", lineno, &row);
        rows.push(row);
    }
    info!("Read {:?} rows from {:?}", rows.len(), path);
    Ok(RawTable { headers, rows })
}

/// Builds the event records from the table.
///
/// Missing cells are read as empty strings. Dates that cannot be read are kept as None.
pub fn to_event_records(table: &RawTable, source: &SourceSettings) -> BDashResult<Vec<EventRecord>> {
    let date_idx = table.column_index(source.date_column())?;
    let category_idx = table.column_index(source.category_column())?;
    let event_idx = table.column_index(source.event_column())?;
    let formats = source.date_formats();

    let cell = |row: &Vec<String>, idx: usize| -> String { row.get(idx).cloned().unwrap_or_default() };

    let mut res: Vec<EventRecord> = Vec::new();
    for (idx, row) in table.rows.iter().enumerate() {
        let date_s = cell(row, date_idx);
        let date = parse_date(&date_s, &formats);
        if date.is_none() {
            warn!(
                "to_event_records: line {}: could not read date {:?}",
                idx + 2,
                date_s
            );
        }
        res.push(EventRecord {
            date,
            category: cell(row, category_idx),
            raw_text: cell(row, event_idx),
        });
    }
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn fixture(name: &str) -> String {
        format!(
            "{}/testdata/{}/{}_events.csv",
            env!("CARGO_MANIFEST_DIR"),
            name,
            name
        )
    }

    fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn read_fixture() {
        let t = read_csv_table(&fixture("mixed_categories")).unwrap();
        assert_eq!(t.headers, vec!["Date_Event", "Category", "Event", "Source"]);
        assert_eq!(t.rows.len(), 5);
        assert_eq!(
            t.rows[1][2],
            "12 positive flocks: Michigan (4), Minnesota (8), Michigan (1)"
        );
    }

    #[test]
    fn records_from_fixture() {
        let t = read_csv_table(&fixture("mixed_categories")).unwrap();
        let records =
            to_event_records(&t, &DashConfig::from_file_path("events.csv").source).unwrap();
        assert_eq!(records.len(), 5);
        assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2024, 3, 25));
        assert_eq!(records[0].category, "Dairy");
        assert_eq!(records[2].date, None);
        assert_eq!(records[3].date, NaiveDate::from_ymd_opt(2024, 4, 5));
    }

    #[test]
    fn missing_file() {
        let res = read_csv_table("/nonexistent/events.csv");
        assert!(matches!(res, Err(e) if matches!(*e, DashError::OpeningCsv { .. })));
    }

    #[test]
    fn missing_column() {
        let t = table(&["Date", "Category", "Event"], &[&["2024-01-01", "Poultry", "x"]]);
        let res = to_event_records(&t, &DashConfig::from_file_path("events.csv").source);
        match res {
            Err(e) => match *e {
                DashError::MissingColumn { column } => assert_eq!(column, "Date_Event"),
                other => panic!("unexpected error {:?}", other),
            },
            Ok(_) => panic!("expected an error"),
        }
    }

    #[test]
    fn renamed_columns_and_short_rows() {
        let t = table(
            &["When", "Kind", "Text"],
            &[&["2024-01-01", "Poultry", "Texas (1)"], &["2024-01-02"]],
        );
        let mut source = DashConfig::from_file_path("events.csv").source;
        source.date_column = Some("When".to_string());
        source.category_column = Some("Kind".to_string());
        source.event_column = Some("Text".to_string());
        let records = to_event_records(&t, &source).unwrap();
        assert_eq!(records[0].raw_text, "Texas (1)");
        assert_eq!(records[1].category, "");
        assert_eq!(records[1].raw_text, "");
    }
}
