//! Liveness probe for MongoDB-backed deployments.
//!
//! Issues a trivial `ping` command under a bounded timeout and reports the
//! outcome as an error map suitable for aggregation into a service health
//! response.

use std::time::Duration;

use bson::{Document, doc};
use mongodb::Client;

use searchlayer_core::error::{SearchError, SearchResult};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(4);

/// Named liveness check against one MongoDB database.
#[derive(Debug, Clone)]
pub struct MongoHealthProbe {
    client: Client,
    database: String,
    name: String,
    timeout: Duration,
}

impl MongoHealthProbe {
    /// Creates a probe named `mongo` with the default 4-second timeout.
    pub fn new(client: Client, database: impl Into<String>) -> Self {
        Self {
            client,
            database: database.into(),
            name: "mongo".to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Overrides the probe name used in health reports.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Overrides the ping timeout. A zero timeout disables the bound.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The probe's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Pings the database, bounded by the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns a backend error when the ping fails or the timeout elapses.
    pub async fn check(&self) -> SearchResult<Document> {
        let ping = async {
            self.client
                .database(&self.database)
                .run_command(doc! { "ping": 1 })
                .await
        };

        if self.timeout.is_zero() {
            return ping
                .await
                .map_err(|err| SearchError::Backend(err.to_string()));
        }

        match tokio::time::timeout(self.timeout, ping).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(err)) => Err(SearchError::Backend(err.to_string())),
            Err(_) => Err(SearchError::Backend("timeout".to_string())),
        }
    }

    /// Builds the health report map for a check outcome: the response data
    /// on success, an `error` entry on failure.
    pub fn report(&self, outcome: SearchResult<Document>) -> Document {
        match outcome {
            Ok(data) => data,
            Err(err) => doc! { "error": err.to_string() },
        }
    }
}
