//! HTTP byte source (e.g. the MHLW open-data mirror or a static site).

use reqwest::blocking::Client;

use crate::data::source::SourceReader;
use crate::domain::SourceId;
use crate::error::{AppError, SourceError};

/// Environment variable holding the base URL for `HttpSource::from_env`.
pub const DATA_URL_ENV: &str = "COVID_DATA_URL";

/// Fetches `<base_url>/<SourceId::file_name()>` with a blocking client.
pub struct HttpSource {
    client: Client,
    base_url: String,
}

impl HttpSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let base_url = std::env::var(DATA_URL_ENV)
            .map_err(|_| AppError::new(2, format!("Missing {DATA_URL_ENV} in environment (.env).")))?;
        Ok(Self::new(base_url))
    }

    pub fn url_for(&self, source: SourceId) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), source.file_name())
    }
}

impl SourceReader for HttpSource {
    fn read(&self, source: SourceId) -> Result<Vec<u8>, SourceError> {
        let url = self.url_for(source);

        let resp = self.client.get(&url).send().map_err(|e| SourceError::Http {
            url: url.clone(),
            message: e.to_string(),
        })?;

        if !resp.status().is_success() {
            return Err(SourceError::Status {
                url,
                status: resp.status().as_u16(),
            });
        }

        let body = resp.bytes().map_err(|e| SourceError::Http {
            url: url.clone(),
            message: format!("failed to read body: {e}"),
        })?;
        Ok(body.to_vec())
    }

    fn describe(&self) -> String {
        format!("http:{}", self.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_without_double_slash() {
        let src = HttpSource::new("https://example.org/data/");
        assert_eq!(
            src.url_for(SourceId::InfectionTrend),
            "https://example.org/data/newly_confirmed_cases_daily.csv"
        );
    }
}
