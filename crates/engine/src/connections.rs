//! Saved data-source connections and the simulated connection test.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use nodes::OutcomeProvider;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::simulation::Scheduler;
use crate::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Connected,
    Disconnected,
    Testing,
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connected => write!(f, "connected"),
            Self::Disconnected => write!(f, "disconnected"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: String,
    pub name: String,
    /// `mongodb`, `api`, `cloud`, ...
    #[serde(rename = "type")]
    pub connection_type: String,
    pub connection_string: String,
    pub status: ConnectionStatus,
    /// `None` until the first test.
    pub last_tested: Option<DateTime<Utc>>,
}

/// In-memory list of connections with simulated testing.
pub struct ConnectionManager {
    connections: Vec<Connection>,
    scheduler: Arc<dyn Scheduler>,
    outcomes: Arc<dyn OutcomeProvider>,
    test_delay: Duration,
}

impl ConnectionManager {
    pub fn new(
        scheduler: Arc<dyn Scheduler>,
        outcomes: Arc<dyn OutcomeProvider>,
        test_delay: Duration,
    ) -> Self {
        Self {
            connections: Vec::new(),
            scheduler,
            outcomes,
            test_delay,
        }
    }

    pub fn list(&self) -> &[Connection] {
        &self.connections
    }

    pub fn get(&self, id: &str) -> Option<&Connection> {
        self.connections.iter().find(|c| c.id == id)
    }

    /// Add a `disconnected`, never-tested connection.
    ///
    /// # Errors
    /// [`EngineError::Validation`] if the name or connection string is
    /// blank; nothing is added.
    pub fn add(
        &mut self,
        name: &str,
        connection_type: &str,
        connection_string: &str,
    ) -> Result<&Connection, EngineError> {
        if name.trim().is_empty() {
            return Err(EngineError::validation("name", "please fill in all fields"));
        }
        if connection_string.trim().is_empty() {
            return Err(EngineError::validation(
                "connectionString",
                "please fill in all fields",
            ));
        }

        let connection = Connection {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_owned(),
            connection_type: connection_type.to_owned(),
            connection_string: connection_string.trim().to_owned(),
            status: ConnectionStatus::Disconnected,
            last_tested: None,
        };
        info!(id = %connection.id, name = %connection.name, "connection added");
        self.connections.push(connection);
        Ok(&self.connections[self.connections.len() - 1])
    }

    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.connections.len();
        self.connections.retain(|c| c.id != id);
        before != self.connections.len()
    }

    /// Put connection `id` into `testing`. `false` for an unknown id.
    pub fn begin_test(&mut self, id: &str) -> bool {
        match self.connections.iter_mut().find(|c| c.id == id) {
            Some(connection) => {
                connection.status = ConnectionStatus::Testing;
                true
            }
            None => false,
        }
    }

    /// Settle a test started with [`Self::begin_test`] from the outcome
    /// provider.
    pub fn finish_test(&mut self, id: &str) -> Option<ConnectionStatus> {
        let connection = self.connections.iter_mut().find(|c| c.id == id)?;
        let status = if self.outcomes.next_outcome().is_success() {
            ConnectionStatus::Connected
        } else {
            ConnectionStatus::Disconnected
        };
        connection.status = status;
        connection.last_tested = Some(Utc::now());

        match status {
            ConnectionStatus::Connected => info!(id, "connection test succeeded"),
            _ => warn!(id, "connection test failed"),
        }
        Some(status)
    }

    /// Test connection `id`: `testing` for the simulated delay, then
    /// `connected` or `disconnected`. Returns `None` for an unknown id.
    pub async fn test(&mut self, id: &str) -> Option<ConnectionStatus> {
        if !self.begin_test(id) {
            return None;
        }
        self.scheduler.sleep(self.test_delay).await;
        self.finish_test(id)
    }
}
