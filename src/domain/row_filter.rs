use error_stack::report;
use thiserror::Error;
use tracing::debug;

use super::integration::IntegrationRecord;
use super::sheets::header_index::HeaderIndex;

pub const STATUS_COLUMN: &str = "status";
pub const LIST_NAME_COLUMN: &str = "convoso list name";
pub const LIST_ID_COLUMN: &str = "convoso";

pub const REQUIRED_COLUMNS: [&str; 3] = [STATUS_COLUMN, LIST_NAME_COLUMN, LIST_ID_COLUMN];

const ACTIVE_STATUS: &str = "active";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RowFilterError {
    #[error("Worksheet is empty, expected a header row")]
    EmptySheet,
    #[error("Column names don't match, missing {missing:?}. Found headers: {found:?}")]
    MissingColumns {
        missing: Vec<String>,
        found: Vec<String>,
    },
}

struct Columns {
    status: usize,
    name: usize,
    list_id: usize,
}

impl Columns {
    fn resolve(headers: &[String]) -> error_stack::Result<Self, RowFilterError> {
        let index = HeaderIndex::new(headers);

        let missing = index.missing(&REQUIRED_COLUMNS);
        if !missing.is_empty() {
            return Err(report!(RowFilterError::MissingColumns {
                missing: missing.into_iter().map(str::to_owned).collect(),
                found: index.normalized_headers().to_vec(),
            }));
        }

        match (
            index.position(STATUS_COLUMN),
            index.position(LIST_NAME_COLUMN),
            index.position(LIST_ID_COLUMN),
        ) {
            (Some(status), Some(name), Some(list_id)) => Ok(Self {
                status,
                name,
                list_id,
            }),
            _ => Err(report!(RowFilterError::MissingColumns {
                missing: REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect(),
                found: index.normalized_headers().to_vec(),
            })),
        }
    }
}

// The Sheets API drops trailing empty cells, so a short row just means blanks.
fn cell(row: &[String], index: usize) -> &str {
    row.get(index).map(String::as_str).unwrap_or("")
}

/// Keeps the rows whose status is `active` and that carry both a list name and
/// a list id. The first row of `rows` is the header row.
pub fn filter_active_integrations(
    rows: &[Vec<String>],
) -> error_stack::Result<Vec<IntegrationRecord>, RowFilterError> {
    let (headers, data) = rows
        .split_first()
        .ok_or_else(|| report!(RowFilterError::EmptySheet))?;

    let columns = Columns::resolve(headers)?;

    let records = data
        .iter()
        .enumerate()
        .filter_map(|(offset, row)| {
            let status = cell(row, columns.status).trim().to_lowercase();
            if status != ACTIVE_STATUS {
                return None;
            }

            let record = IntegrationRecord::new(cell(row, columns.name), cell(row, columns.list_id));
            if record.is_none() {
                // +2: one for the header, one for 1-based sheet rows
                debug!(row = offset + 2, "Active row without list name or list id, skipping");
            }
            record
        })
        .collect();

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect()
    }

    const HEADERS: &[&str] = &["Status", "Convoso List Name", "Convoso"];

    #[test]
    fn test_active_row_is_trimmed() {
        let rows = sheet(&[HEADERS, &["Active ", " Acme West ", " 8842 "]]);
        let records = filter_active_integrations(&rows).unwrap();
        assert_eq!(
            records,
            vec![IntegrationRecord::new("Acme West", "8842").unwrap()]
        );
    }

    #[test]
    fn test_inactive_row_is_dropped() {
        let rows = sheet(&[HEADERS, &["inactive", "Acme West", "8842"]]);
        assert!(filter_active_integrations(&rows).unwrap().is_empty());
    }

    #[test]
    fn test_status_must_be_exactly_active() {
        let rows = sheet(&[
            HEADERS,
            &["ACTIVE", "One", "1"],
            &["active-ish", "Two", "2"],
            &["not active", "Three", "3"],
        ]);
        let records = filter_active_integrations(&rows).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name(), "One");
    }

    #[test]
    fn test_blank_name_or_id_is_dropped() {
        let rows = sheet(&[
            HEADERS,
            &["Active", "  ", "8842"],
            &["Active", "Acme", "   "],
        ]);
        assert!(filter_active_integrations(&rows).unwrap().is_empty());
    }

    #[test]
    fn test_columns_are_found_by_name_not_position() {
        let rows = sheet(&[
            &["Convoso", "Owner", "STATUS", "convoso list name"],
            &["8842", "bob", "active", "Acme West"],
        ]);
        let records = filter_active_integrations(&rows).unwrap();
        assert_eq!(
            records,
            vec![IntegrationRecord::new("Acme West", "8842").unwrap()]
        );
    }

    #[test]
    fn test_order_is_preserved() {
        let rows = sheet(&[
            HEADERS,
            &["Active", "Charlie", "3"],
            &["Active", "Alpha", "1"],
            &["Active", "Bravo", "2"],
        ]);
        let names = filter_active_integrations(&rows)
            .unwrap()
            .iter()
            .map(|r| r.name().to_owned())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["Charlie", "Alpha", "Bravo"]);
    }

    #[test]
    fn test_short_rows_do_not_panic() {
        let rows = sheet(&[HEADERS, &["Active", "Acme"], &["Active"], &[]]);
        assert!(filter_active_integrations(&rows).unwrap().is_empty());
    }

    #[test]
    fn test_missing_column_is_rejected() {
        for headers in [
            &["Convoso List Name", "Convoso"][..],
            &["Status", "Convoso"][..],
            &["Status", "Convoso List Name"][..],
            &[][..],
        ] {
            let rows = sheet(&[headers, &["Active", "Acme", "1"]]);
            let report = filter_active_integrations(&rows).unwrap_err();
            assert!(matches!(
                report.current_context(),
                RowFilterError::MissingColumns { .. }
            ));
        }
    }

    #[test]
    fn test_missing_column_reports_found_headers() {
        let rows = sheet(&[&[" Status ", "List"]]);
        let report = filter_active_integrations(&rows).unwrap_err();
        assert_eq!(
            report.current_context(),
            &RowFilterError::MissingColumns {
                missing: vec!["convoso list name".into(), "convoso".into()],
                found: vec!["status".into(), "list".into()],
            }
        );
    }

    #[test]
    fn test_empty_sheet_is_rejected() {
        let report = filter_active_integrations(&[]).unwrap_err();
        assert_eq!(report.current_context(), &RowFilterError::EmptySheet);
    }
}
