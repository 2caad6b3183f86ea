use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::{form_urlencoded, Url};

use crate::model::CharacterPage;
use crate::{AppError, AppResult, ErrorKind, CHARACTER_RESOURCE, DEFAULT_API_BASE_URL};

pub const MAX_URL_LENGTH: usize = 2048;

#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndpointError {
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValidatedUrl {
    url: String,
    scheme: String,
    host: String,
}

impl ValidatedUrl {
    pub fn new(url: impl Into<String>) -> Result<Self, EndpointError> {
        let url = url.into();
        let parsed = Self::validate(&url)?;

        let scheme = parsed.scheme().to_lowercase();
        let host = parsed
            .host_str()
            .map(str::to_lowercase)
            .unwrap_or_default();

        Ok(Self {
            url: parsed.to_string(),
            scheme,
            host,
        })
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    fn validate(url: &str) -> Result<Url, EndpointError> {
        let invalid = |reason: &str| EndpointError::InvalidUrl {
            url: Self::truncate_url(url),
            reason: reason.to_string(),
        };

        if url.trim().is_empty() {
            return Err(invalid("URL cannot be empty"));
        }

        if url.len() > MAX_URL_LENGTH {
            return Err(invalid(&format!(
                "URL exceeds maximum length of {MAX_URL_LENGTH} bytes"
            )));
        }

        let parsed = Url::parse(url).map_err(|e| invalid(&e.to_string()))?;

        let scheme = parsed.scheme().to_lowercase();
        if scheme != "http" && scheme != "https" {
            return Err(invalid(&format!(
                "invalid scheme '{scheme}', only 'http' and 'https' are allowed"
            )));
        }

        if parsed.host_str().is_none() {
            return Err(invalid("URL must have a host"));
        }

        if !parsed.username().is_empty() || parsed.password().is_some() {
            return Err(invalid("credentials in URL are not allowed"));
        }

        if parsed.query().is_some() || parsed.fragment().is_some() {
            return Err(invalid("base URL cannot carry a query or fragment"));
        }

        Ok(parsed)
    }

    fn truncate_url(url: &str) -> String {
        match url.char_indices().nth(100) {
            Some((cut, _)) => format!("{}...", &url[..cut]),
            None => url.to_string(),
        }
    }
}

/// Request URLs for the character resource of one API deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEndpoints {
    base: String,
}

impl CatalogEndpoints {
    pub fn new(base: &str) -> Result<Self, EndpointError> {
        let validated = ValidatedUrl::new(base)?;
        Ok(Self {
            base: validated.as_str().trim_end_matches('/').to_string(),
        })
    }

    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    /// `{base}/character?page=N`
    #[must_use]
    pub fn page(&self, page: u32) -> String {
        self.resource_with("page", &page.to_string())
    }

    /// `{base}/character?name=TERM`, form-encoded.
    #[must_use]
    pub fn search(&self, term: &str) -> String {
        self.resource_with("name", term)
    }

    fn resource_with(&self, key: &str, value: &str) -> String {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair(key, value)
            .finish();
        format!("{}/{CHARACTER_RESOURCE}?{query}", self.base)
    }
}

impl Default for CatalogEndpoints {
    fn default() -> Self {
        Self {
            base: DEFAULT_API_BASE_URL.to_string(),
        }
    }
}

/// Maps a transport-level failure onto the app taxonomy.
#[must_use]
pub fn classify(error: &crux_http::HttpError) -> AppError {
    match error {
        crux_http::HttpError::Http {
            code,
            message,
            body,
        } => AppError::from_http_status(u16::from(*code), body.as_deref())
            .with_internal(message.clone()),
        crux_http::HttpError::Json(reason) => {
            AppError::new(ErrorKind::Deserialization, "unexpected catalog payload")
                .with_internal(reason.clone())
        }
        other => AppError::new(ErrorKind::Network, "catalog request failed")
            .with_internal(other.to_string()),
    }
}

/// Resolves a page response into the page body or a classified error.
pub fn page_outcome(
    result: crux_http::Result<crux_http::Response<CharacterPage>>,
) -> AppResult<CharacterPage> {
    let mut response = result.map_err(|e| classify(&e))?;

    let status = u16::from(response.status());
    if !(200..300).contains(&status) {
        return Err(AppError::from_http_status(status, None));
    }

    response.take_body().ok_or_else(|| {
        AppError::new(ErrorKind::Deserialization, "catalog response had no body")
            .with_context("http_status", status.to_string())
    })
}
