//! Sample file generation: a downloadable template matching the
//! configured field selection.

/// Fixed name the sample document is served under.
pub const SAMPLE_FILE_NAME: &str = "user-csv-import-sample.csv";

/// Number of synthetic data rows in the sample.
const SAMPLE_ROWS: usize = 2;

/// Build a sample delimited document: one header row naming the selected
/// fields, then two synthetic data rows (`sample_<field>_<i>`).
pub fn sample_csv(fields: &[String], separator: char) -> String {
    let sep = separator.to_string();
    let mut content = fields.join(&sep);
    content.push('\n');

    for i in 1..=SAMPLE_ROWS {
        let row: Vec<String> = fields
            .iter()
            .map(|field| format!("sample_{field}_{i}"))
            .collect();
        content.push_str(&row.join(&sep));
        content.push('\n');
    }

    content
}
