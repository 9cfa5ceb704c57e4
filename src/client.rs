use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use crate::config::settings::ClientConfig;
use crate::errors::{AcquisitionError, RenewalError};
use crate::query::types::{QueryResult, Variables};
use crate::scheduler::renewal::{RenewalScheduler, RenewalSettings, SchedulerHandle};
use crate::session::{Credential, Session};

/// Entry point: an authenticated session plus the knobs to keep it alive.
#[derive(Debug, Clone)]
pub struct IntraClient {
    session: Arc<Session>,
    renewal: RenewalSettings,
}

impl IntraClient {
    /// Acquire a first token for the configured endpoint.
    ///
    /// Fails, and yields no client, when the credential exchange fails.
    pub async fn connect(config: &ClientConfig) -> Result<Self, AcquisitionError> {
        let http = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(AcquisitionError::Network)?;

        let session = Session::establish(
            &config.endpoint,
            Credential::new(config.credential.clone()),
            http,
        )
        .await?;

        Ok(Self {
            session: Arc::new(session),
            renewal: RenewalSettings {
                safety_margin_seconds: config.renewal.safety_margin_seconds,
            },
        })
    }

    pub fn from_session(session: Arc<Session>, renewal: RenewalSettings) -> Self {
        Self { session, renewal }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub async fn query(&self, query: &str, variables: Variables) -> QueryResult {
        self.session.execute(query, variables).await
    }

    pub async fn renew(&self) -> Result<(), RenewalError> {
        self.session.renew().await
    }

    /// Start the background renewal loop for this client's session
    pub fn spawn_renewal(&self) -> SchedulerHandle {
        RenewalScheduler::new(self.session.clone(), self.renewal).spawn()
    }
}
