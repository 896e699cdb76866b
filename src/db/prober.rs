use serde::Serialize;
use sqlx::postgres::PgConnectOptions;
use sqlx::{Connection, PgConnection};
use std::time::Duration;

/// Fixed bound on each connection attempt.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

/// Connection parameters for the probe, as read from the environment.
///
/// Values are handed to the driver without validation: a missing value is
/// not applied at all, leaving the driver default in place, and the port
/// is parsed only when a probe runs.
#[derive(Debug, Clone)]
pub struct DbSettings {
    pub host: Option<String>,
    pub port: String,
    pub user: Option<String>,
    pub password: Option<String>,
    pub database: Option<String>,
}

/// Outcome of a single connectivity probe, serialized as the `/db`
/// response body.
#[derive(Debug, Serialize)]
pub struct ProbeResult {
    #[serde(rename = "database")]
    status: ProbeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
enum ProbeStatus {
    Connected,
    Error,
}

impl ProbeResult {
    fn connected() -> Self {
        Self {
            status: ProbeStatus::Connected,
            detail: None,
        }
    }

    fn error(detail: impl Into<String>) -> Self {
        Self {
            status: ProbeStatus::Error,
            detail: Some(detail.into()),
        }
    }
}

/// Checks database connectivity by opening and immediately closing a
/// connection.
///
/// Every probe is independent: no pooling, no retry, no caching of the
/// result.
#[derive(Clone)]
pub struct DbProber {
    settings: DbSettings,
}

impl DbProber {
    /// Create a prober for the given connection parameters.
    pub fn new(settings: DbSettings) -> Self {
        Self { settings }
    }

    /// Attempt one short-lived connection, bounded to 3 seconds.
    ///
    /// Any failure (unreachable host, refused connection, bad credentials,
    /// malformed port, timeout) is reported as data in the result, never
    /// as an error.
    pub async fn probe(&self) -> ProbeResult {
        let options = match self.connect_options() {
            Ok(options) => options,
            Err(detail) => return ProbeResult::error(detail),
        };

        let attempt = async {
            let conn = PgConnection::connect_with(&options).await?;
            conn.close().await
        };

        match tokio::time::timeout(CONNECT_TIMEOUT, attempt).await {
            Ok(Ok(())) => ProbeResult::connected(),
            Ok(Err(e)) => ProbeResult::error(e.to_string()),
            Err(_) => ProbeResult::error(format!(
                "connection attempt timed out after {}s",
                CONNECT_TIMEOUT.as_secs()
            )),
        }
    }

    /// Build driver options from the raw settings.
    fn connect_options(&self) -> Result<PgConnectOptions, String> {
        let port: u16 = self
            .settings
            .port
            .parse()
            .map_err(|e| format!("invalid port {:?}: {}", self.settings.port, e))?;

        let mut options = PgConnectOptions::new().port(port);
        if let Some(host) = &self.settings.host {
            options = options.host(host);
        }
        if let Some(user) = &self.settings.user {
            options = options.username(user);
        }
        if let Some(password) = &self.settings.password {
            options = options.password(password);
        }
        if let Some(database) = &self.settings.database {
            options = options.database(database);
        }

        Ok(options)
    }
}
