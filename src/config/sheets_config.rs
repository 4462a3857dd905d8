use std::path::PathBuf;

#[derive(serde::Deserialize, Debug, Clone)]
pub struct SpreadsheetConfig {
    pub spreadsheet_id: Box<str>,
    /// A1 or named range to export, e.g. "Sheet1" or "Sheet1!A1:D20".
    pub range: Box<str>,
    /// When present, the exported records are also written here as JSON.
    pub output_path: Option<PathBuf>,
}
