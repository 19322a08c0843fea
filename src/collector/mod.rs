//! Collector module
//!
//! This module groups all logic responsible for one probe:
//! - Declaring the exported metric descriptors
//! - Fetching the device status document
//! - Mapping the document into metric samples
//!
//! A `ProbeCollector` is built per scrape, bound to exactly one target,
//! and dropped when the scrape ends. Nothing is shared between scrapes
//! except the HTTP client connection pool.
//!
//! Design notes:
//! - Rendering into the exposition format MUST NOT live here
//! - A failed fetch or decode fails the whole probe, never a subset
pub mod fetch;
pub mod sample;

use reqwest::Client;

use crate::{error::ProbeError, schema::DeviceStatus};

use sample::{DESCRIPTORS, MetricDesc, Sample};

pub struct ProbeCollector {
    target: String,
    client: Client,
    descs: [MetricDesc; 4],
}

impl ProbeCollector {
    /// Bind a collector to `target`.
    ///
    /// The target is not validated. An empty or malformed value is
    /// accepted and surfaces as `ProbeError::InvalidTarget` on collect.
    pub fn new(target: impl Into<String>, client: Client) -> Self {
        Self {
            target: target.into(),
            client,
            descs: DESCRIPTORS,
        }
    }

    /// Returns the four metric descriptors. Performs no I/O.
    pub fn describe(&self) -> &[MetricDesc] {
        &self.descs
    }

    /// Run one fetch-parse cycle against the bound target.
    ///
    /// Returns a `Snapshot` whose samples are produced lazily, or the
    /// first error encountered. No samples are emitted on error.
    pub async fn collect(&self) -> Result<Snapshot, ProbeError> {
        let url = fetch::resolve(&self.target)?;
        let status = fetch::fetch_status(&self.client, url).await?;
        Ok(Snapshot { status })
    }
}

/// Status of one device at scrape time.
#[derive(Debug, Clone)]
pub struct Snapshot {
    status: DeviceStatus,
}

impl Snapshot {
    pub fn new(status: DeviceStatus) -> Self {
        Self { status }
    }

    /// Samples in emission order. See [`sample::samples`].
    pub fn samples(&self) -> impl Iterator<Item = Sample> + '_ {
        sample::samples(&self.status)
    }
}
