//! CSV report of image layers backed by more than one datasource.

use super::csv_line;

/// One mosaic layer row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MosaicRow {
    pub id: String,
    pub name: String,
    pub datasource_count: usize,
}

/// Build the CSV report, sorted by datasource count descending.
pub fn mosaic_csv(rows: &[MosaicRow]) -> String {
    let mut sorted: Vec<&MosaicRow> = rows.iter().collect();
    sorted.sort_by(|a, b| b.datasource_count.cmp(&a.datasource_count));

    let mut out = csv_line(&["id", "name", "num_datasources"]);
    for row in sorted {
        out.push_str(&csv_line(&[
            &row.id,
            &row.name,
            &row.datasource_count.to_string(),
        ]));
    }
    out
}
