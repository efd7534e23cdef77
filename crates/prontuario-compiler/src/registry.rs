//! Medication registry clients.
//!
//! The parser resolves every medication name through a [`MedicationRegistry`].
//! [`HttpRegistry`] talks to the medication directory service over HTTP with
//! a bounded timeout; [`InMemoryRegistry`] is a fixed mapping for tests and
//! embedders that already hold the directory data.

use std::sync::Arc;

use prontuario_types::well_known::{MEDICATIONS_PATH, MEDICATION_SEARCH_PATH};
use prontuario_types::{MedicationEntry, MedicationId, NewMedication};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::types::{RegistryConfig, RegistryError, RegistryResult};

/// Resolves medication names to canonical directory entries.
///
/// Implementations match names case-insensitively and return `Ok(None)`
/// when the name is unknown. `Err` is reserved for a registry that could
/// not answer.
pub trait MedicationRegistry: Send + Sync {
    /// Looks up a medication by name.
    fn find_by_name(&self, name: &str) -> RegistryResult<Option<MedicationEntry>>;
}

impl<R: MedicationRegistry + ?Sized> MedicationRegistry for &R {
    fn find_by_name(&self, name: &str) -> RegistryResult<Option<MedicationEntry>> {
        (**self).find_by_name(name)
    }
}

impl<R: MedicationRegistry + ?Sized> MedicationRegistry for Box<R> {
    fn find_by_name(&self, name: &str) -> RegistryResult<Option<MedicationEntry>> {
        (**self).find_by_name(name)
    }
}

impl<R: MedicationRegistry + ?Sized> MedicationRegistry for Arc<R> {
    fn find_by_name(&self, name: &str) -> RegistryResult<Option<MedicationEntry>> {
        (**self).find_by_name(name)
    }
}

/// A fixed in-memory name → entry mapping.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRegistry {
    entries: Vec<MedicationEntry>,
    last_id: MedicationId,
}

impl InMemoryRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry, assigning the next identifier.
    pub fn insert(&mut self, medication: NewMedication) -> MedicationEntry {
        self.last_id += 1;
        let entry = medication.into_entry(self.last_id);
        self.entries.push(entry.clone());
        entry
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, medication: NewMedication) -> Self {
        self.insert(medication);
        self
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the registry holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl MedicationRegistry for InMemoryRegistry {
    fn find_by_name(&self, name: &str) -> RegistryResult<Option<MedicationEntry>> {
        Ok(self.entries.iter().find(|e| e.matches_name(name)).cloned())
    }
}

/// A registry response: the HTTP status and the decoded payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryReply<T> {
    /// HTTP status code.
    pub status: u16,
    /// Decoded body.
    pub payload: T,
}

/// How a response status is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusClass {
    Success,
    NotFound,
    Unexpected,
}

impl StatusClass {
    fn of(status: StatusCode) -> Self {
        if status.is_success() {
            Self::Success
        } else if status == StatusCode::NOT_FOUND {
            Self::NotFound
        } else {
            Self::Unexpected
        }
    }
}

/// Blocking HTTP client for the medication directory service.
///
/// Every request is bounded by [`RegistryConfig::timeout`]. Must not be
/// constructed, used or dropped on an async runtime thread; run it on a
/// blocking worker instead.
#[derive(Debug, Clone)]
pub struct HttpRegistry {
    client: Client,
    base_url: Url,
    timeout_secs: u64,
}

impl HttpRegistry {
    /// Creates a client for the configured directory.
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: RegistryConfig) -> RegistryResult<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|_| RegistryError::InvalidUrl {
            url: config.base_url.clone(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(RegistryError::InvalidUrl {
                url: config.base_url,
            });
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RegistryError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            timeout_secs: config.timeout_secs(),
        })
    }

    /// Returns the directory base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Looks up a medication by name.
    ///
    /// A 404 answer yields `payload: None`.
    pub fn lookup(&self, name: &str) -> RegistryResult<RegistryReply<Option<MedicationEntry>>> {
        let url = self.endpoint(MEDICATION_SEARCH_PATH, Some(name))?;
        tracing::debug!(%url, name, "Looking up medication");

        let response = self.send(self.client.get(url.clone()), &url)?;
        let status = response.status();

        match StatusClass::of(status) {
            StatusClass::Success => Ok(RegistryReply {
                status: status.as_u16(),
                payload: Some(Self::decode(response)?),
            }),
            StatusClass::NotFound => Ok(RegistryReply {
                status: status.as_u16(),
                payload: None,
            }),
            StatusClass::Unexpected => Err(Self::unexpected(response)),
        }
    }

    /// Registers a new medication; the directory assigns its identifier.
    pub fn create(&self, medication: &NewMedication) -> RegistryResult<RegistryReply<MedicationEntry>> {
        let url = self.endpoint(MEDICATIONS_PATH, None)?;
        tracing::debug!(%url, name = %medication.name, "Registering medication");

        let response = self.send(self.client.post(url.clone()).json(medication), &url)?;
        Self::expect_success(response)
    }

    /// Lists every medication in the directory.
    pub fn list(&self) -> RegistryResult<RegistryReply<Vec<MedicationEntry>>> {
        let url = self.endpoint(MEDICATIONS_PATH, None)?;
        tracing::debug!(%url, "Listing medications");

        let response = self.send(self.client.get(url.clone()), &url)?;
        Self::expect_success(response)
    }

    /// Joins `path` (and an optional percent-encoded trailing segment) onto
    /// the base URL.
    fn endpoint(&self, path: &str, segment: Option<&str>) -> RegistryResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| RegistryError::InvalidUrl {
                url: self.base_url.to_string(),
            })?;
            segments.pop_if_empty();
            segments.extend(path.split('/').filter(|s| !s.is_empty()));
            if let Some(segment) = segment {
                segments.push(segment);
            }
        }
        Ok(url)
    }

    fn send(&self, request: RequestBuilder, url: &Url) -> RegistryResult<Response> {
        request.send().map_err(|e| {
            if e.is_timeout() {
                RegistryError::Timeout {
                    url: url.to_string(),
                    timeout_secs: self.timeout_secs,
                }
            } else {
                RegistryError::Unavailable {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            }
        })
    }

    fn expect_success<T: DeserializeOwned>(response: Response) -> RegistryResult<RegistryReply<T>> {
        let status = response.status();
        match StatusClass::of(status) {
            StatusClass::Success => Ok(RegistryReply {
                status: status.as_u16(),
                payload: Self::decode(response)?,
            }),
            StatusClass::NotFound | StatusClass::Unexpected => Err(Self::unexpected(response)),
        }
    }

    fn decode<T: DeserializeOwned>(response: Response) -> RegistryResult<T> {
        response
            .json::<T>()
            .map_err(|e| RegistryError::Decode(e.to_string()))
    }

    fn unexpected(response: Response) -> RegistryError {
        let status = response.status().as_u16();
        let body = response.text().unwrap_or_default();
        tracing::warn!(status, "Medication registry returned unexpected status");
        RegistryError::UnexpectedStatus { status, body }
    }
}

impl MedicationRegistry for HttpRegistry {
    fn find_by_name(&self, name: &str) -> RegistryResult<Option<MedicationEntry>> {
        self.lookup(name).map(|reply| reply.payload)
    }
}
