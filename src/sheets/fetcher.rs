use std::path::Path;

use error_stack::{Result, ResultExt};
use thiserror::Error;
use tracing::{info, warn};

use super::client::ValuesReader;
use super::records::{to_records, RecordSet};

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("remote range query failed")]
    Query,
    #[error("could not persist records to '{path}'")]
    Persist { path: String },
}

/// Orchestrates an export: read the grid, convert it to records, optionally
/// persist the result as an indented JSON document.
pub struct SheetFetcher<C> {
    client: C,
}

impl<C: ValuesReader> SheetFetcher<C> {
    pub fn new(client: C) -> Self {
        SheetFetcher { client }
    }

    pub async fn fetch(
        &self,
        spreadsheet_id: &str,
        range: &str,
        destination: Option<&Path>,
    ) -> Result<RecordSet, FetchError> {
        let grid = self
            .client
            .read_range(spreadsheet_id, range)
            .await
            .change_context(FetchError::Query)?;

        let Some(records) = to_records(&grid) else {
            warn!(spreadsheet_id, range, "no data found on the sheet");
            return Ok(RecordSet::new());
        };

        if let Some(path) = destination {
            self.persist(&records, path)?;
        }

        Ok(records)
    }

    fn persist(&self, records: &RecordSet, path: &Path) -> Result<(), FetchError> {
        let persist_error = || FetchError::Persist {
            path: path.display().to_string(),
        };

        let document = serde_json::to_string_pretty(records).change_context_lazy(persist_error)?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).change_context_lazy(persist_error)?;
            }
        }
        std::fs::write(path, document).change_context_lazy(persist_error)?;
        info!(path = %path.display(), "records written");
        Ok(())
    }
}
