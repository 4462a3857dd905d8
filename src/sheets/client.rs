use async_trait::async_trait;
use error_stack::{Result, ResultExt};
use serde::Deserialize;
use thiserror::Error;

use crate::auth::credential::AuthorizationCredential;

use super::records::Grid;

const VALUES_ENDPOINT: &str = "https://sheets.googleapis.com/v4/spreadsheets";

#[derive(Error, Debug)]
pub enum RemoteQueryError {
    #[error("could not fetch range '{range}' from spreadsheet '{spreadsheet_id}'")]
    Fetch {
        spreadsheet_id: String,
        range: String,
    },
}

/// Opaque capability to fetch a grid by spreadsheet identifier and range.
#[async_trait]
pub trait ValuesReader: Send + Sync {
    async fn read_range(&self, spreadsheet_id: &str, range: &str)
        -> Result<Grid, RemoteQueryError>;
}

/// values.get response body. A range with no cells comes back without a
/// `values` key at all.
#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Grid,
}

/// Session bound to an acquired credential, reading ranges over the Sheets v4
/// values endpoint. An expired token surfaces here as a query error.
pub struct HttpValuesClient {
    http: reqwest::Client,
    credential: AuthorizationCredential,
}

impl HttpValuesClient {
    pub fn new(http: reqwest::Client, credential: AuthorizationCredential) -> Self {
        HttpValuesClient { http, credential }
    }
}

#[async_trait]
impl ValuesReader for HttpValuesClient {
    async fn read_range(
        &self,
        spreadsheet_id: &str,
        range: &str,
    ) -> Result<Grid, RemoteQueryError> {
        let fetch_error = || RemoteQueryError::Fetch {
            spreadsheet_id: spreadsheet_id.to_owned(),
            range: range.to_owned(),
        };

        let url = format!("{VALUES_ENDPOINT}/{spreadsheet_id}/values/{range}");
        let value_range: ValueRange = self
            .http
            .get(&url)
            .bearer_auth(&self.credential.access_token)
            .send()
            .await
            .change_context_lazy(fetch_error)?
            .error_for_status()
            .change_context_lazy(fetch_error)?
            .json()
            .await
            .change_context_lazy(fetch_error)?;

        Ok(value_range.values)
    }
}
