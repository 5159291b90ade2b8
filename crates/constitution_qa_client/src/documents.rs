//! Document registry: the ordered, de-duplicated list of source URLs sent with
//! each query, plus the pending text of the "add document" field.
//!
//! The registry is never empty. It starts with [`DEFAULT_DOCUMENT_URL`] and
//! refuses to remove its last entry.

use url::Url;

/// Document queried when nothing else is registered (Constitution of India, 2024 edition).
pub const DEFAULT_DOCUMENT_URL: &str = "https://cdnbbsr.s3waas.gov.in/s380537a945c7aaa788ccfcdf1b99b5d8f/uploads/2024/07/20240716890312078.pdf";

/// Registry mutation error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("Please enter a valid URL")]
    InvalidUrl(String),

    #[error("cannot remove the last document")]
    LastDocument,
}

/// Result of a successful [`DocumentRegistry::add`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    AlreadyPresent,
    /// Input was empty or whitespace; nothing to do.
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRegistry {
    urls: Vec<String>,
    draft: String,
}

impl Default for DocumentRegistry {
    fn default() -> Self {
        Self {
            urls: vec![DEFAULT_DOCUMENT_URL.to_string()],
            draft: String::new(),
        }
    }
}

impl DocumentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from configured URLs. Invalid entries are skipped;
    /// an empty result falls back to the default document.
    pub fn from_urls<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut kept: Vec<String> = Vec::new();
        for raw in urls {
            let url = raw.as_ref().trim();
            if url.is_empty() {
                continue;
            }
            if let Err(e) = validate(url) {
                tracing::warn!(url, error = %e, "skipping configured document");
                continue;
            }
            if !kept.iter().any(|u| u == url) {
                kept.push(url.to_string());
            }
        }
        if kept.is_empty() {
            return Self::default();
        }
        Self {
            urls: kept,
            draft: String::new(),
        }
    }

    /// Add `url` (trimmed) to the end of the registry.
    ///
    /// Clears the draft on success. Duplicates are left alone, exact string match.
    pub fn add(&mut self, url: &str) -> Result<AddOutcome, RegistryError> {
        let url = url.trim();
        if url.is_empty() {
            return Ok(AddOutcome::Empty);
        }
        validate(url)?;
        if self.contains(url) {
            tracing::debug!(url, "document already registered");
            return Ok(AddOutcome::AlreadyPresent);
        }
        self.urls.push(url.to_string());
        self.draft.clear();
        tracing::debug!(url, count = self.urls.len(), "document added");
        Ok(AddOutcome::Added)
    }

    /// Add whatever is currently in the draft field.
    pub fn add_draft(&mut self) -> Result<AddOutcome, RegistryError> {
        let draft = self.draft.clone();
        self.add(&draft)
    }

    /// Remove `url`. Returns `Ok(false)` if it was not registered.
    pub fn remove(&mut self, url: &str) -> Result<bool, RegistryError> {
        if self.urls.len() == 1 {
            return Err(RegistryError::LastDocument);
        }
        match self.urls.iter().position(|u| u == url) {
            Some(pos) => {
                self.urls.remove(pos);
                tracing::debug!(url, count = self.urls.len(), "document removed");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Document sent with a query.
    pub fn first(&self) -> Option<&str> {
        self.urls.first().map(String::as_str)
    }

    pub fn contains(&self, url: &str) -> bool {
        self.urls.iter().any(|u| u == url)
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.urls.clone()
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

fn validate(url: &str) -> Result<(), RegistryError> {
    Url::parse(url)
        .map(|_| ())
        .map_err(|_| RegistryError::InvalidUrl(url.to_string()))
}
