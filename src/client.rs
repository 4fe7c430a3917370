//! Client facade
//!
//! Owns the HTTP transport handle and the current database, and exposes
//! statement execution plus the scalar/table query helpers. All operations
//! are plain blocking-on-await calls against the server's `/query`
//! endpoint; nothing is retried and every failure surfaces immediately.
//!
//! A `Client` is not internally synchronized. Share one per task, or wrap
//! it in external synchronization if it must cross tasks.

use crate::config::ConnectionConfig;
use crate::error::{ClientError, ClientResult};
use crate::quote::quote_always;
use crate::statement::{DataSource, RetentionPolicy, Statement};
use crate::table::{QueryResponse, Table};
use std::time::{Duration, Instant};

/// A connection to the time-series database
pub struct Client {
    /// Live transport handle; `None` once closed
    http: Option<reqwest::Client>,
    base_url: String,
    username: String,
    password: String,
    database: String,
    version: String,
}

impl Client {
    /// Open a connection.
    ///
    /// Builds the base URL from the config, pings the server once to
    /// validate connectivity and capture its version string, then selects
    /// the configured database if one is named.
    pub async fn connect(config: &ConnectionConfig) -> ClientResult<Client> {
        let base_url = config.base_url();
        tracing::debug!("Connecting to {}", base_url);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let mut client = Client {
            http: Some(http),
            base_url,
            username: config.username.clone(),
            password: config.password.clone(),
            database: String::new(),
            version: String::new(),
        };

        let (round_trip, version) = client.ping().await?;
        client.version = version;
        tracing::info!(
            "Connected to {} version={} ping={:?}",
            client.base_url,
            client.version,
            round_trip
        );

        if !config.database.is_empty() {
            client.set_database(&config.database).await?;
        }

        Ok(client)
    }

    /// Ping the server, returning the round-trip duration and the server
    /// version string
    pub async fn ping(&self) -> ClientResult<(Duration, String)> {
        let http = self.transport()?;
        let started = Instant::now();

        let response = http
            .get(format!("{}ping", self.base_url))
            .send()
            .await?
            .error_for_status()?;

        let version = response
            .headers()
            .get("X-Influxdb-Version")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        Ok((started.elapsed(), version))
    }

    /// Drop the transport handle. Every subsequent operation fails with
    /// [`ClientError::NotConnected`].
    pub fn close(&mut self) {
        tracing::debug!("Closing connection to {}", self.base_url);
        self.http = None;
    }

    /// Server version string captured at connect time; empty once closed
    pub fn version(&self) -> &str {
        if self.http.is_some() {
            &self.version
        } else {
            ""
        }
    }

    /// Currently selected database; empty means the server default
    pub fn database(&self) -> &str {
        if self.http.is_some() {
            &self.database
        } else {
            ""
        }
    }

    /// Start a SELECT statement over the given sources
    pub fn select(&self, sources: Vec<DataSource>) -> ClientResult<Statement> {
        Statement::select(sources)
    }

    /// Render and run a statement
    pub async fn execute(&self, statement: &Statement) -> ClientResult<Table> {
        self.query(&statement.render()).await
    }

    /// Run query text against the current database and map the response
    pub async fn query(&self, command: &str) -> ClientResult<Table> {
        let response = self.raw_query(command).await?;
        Table::from_response(response)
    }

    /// Run query text and extract a single named string column
    pub async fn query_scalar(
        &self,
        command: &str,
        dataset: &str,
        column: &str,
    ) -> ClientResult<Vec<String>> {
        let table = self.query(command).await?;
        table.scalar_values(dataset, column)
    }

    /// Enumerate the databases on the server
    pub async fn show_databases(&self) -> ClientResult<Vec<String>> {
        self.query_scalar("SHOW DATABASES", "databases", "name")
            .await
    }

    /// Enumerate the measurements of the current database
    pub async fn measurements(&self) -> ClientResult<Vec<String>> {
        self.query_scalar("SHOW MEASUREMENTS", "measurements", "name")
            .await
    }

    /// List the series of the current database.
    ///
    /// The server returns the series listing as an unnamed single-column
    /// table of keys, so it is mapped as a [`Table`] rather than through
    /// the scalar helper.
    pub async fn show_series(&self) -> ClientResult<Table> {
        self.query("SHOW SERIES").await
    }

    /// Select the current database.
    ///
    /// Fails with [`ClientError::EmptyResponse`] when the name is not among
    /// the server's databases; on success the name applies to every
    /// subsequent query.
    pub async fn set_database(&mut self, name: &str) -> ClientResult<()> {
        self.transport()?;
        let databases = self.show_databases().await?;
        self.database = pick_database(&databases, name)?;
        Ok(())
    }

    /// Create a database, optionally with a retention policy
    pub async fn create_database(
        &self,
        name: &str,
        policy: Option<&RetentionPolicy>,
    ) -> ClientResult<()> {
        self.command(&create_database_query(name, policy)).await
    }

    /// Drop a database
    pub async fn drop_database(&self, name: &str) -> ClientResult<()> {
        self.command(&format!("DROP DATABASE {}", quote_always(name)))
            .await
    }

    /// List the retention policies of a database
    pub async fn retention_policies(&self, database: &str) -> ClientResult<Table> {
        self.query(&format!(
            "SHOW RETENTION POLICIES ON {}",
            quote_always(database)
        ))
        .await
    }

    /// Create a retention policy on a database
    pub async fn create_retention_policy(
        &self,
        database: &str,
        policy: &RetentionPolicy,
        default: bool,
    ) -> ClientResult<()> {
        self.command(&create_retention_policy_query(database, policy, default))
            .await
    }

    /// Drop a retention policy from a database
    pub async fn drop_retention_policy(&self, database: &str, name: &str) -> ClientResult<()> {
        self.command(&format!(
            "DROP RETENTION POLICY {} ON {}",
            quote_always(name),
            quote_always(database)
        ))
        .await
    }

    fn transport(&self) -> ClientResult<&reqwest::Client> {
        self.http.as_ref().ok_or(ClientError::NotConnected)
    }

    /// Submit query text and decode the response body
    async fn raw_query(&self, command: &str) -> ClientResult<QueryResponse> {
        let http = self.transport()?;
        tracing::debug!(database = %self.database, "query: {}", command);

        let mut request = http
            .post(format!("{}query", self.base_url))
            .query(&[("q", command)]);
        if !self.database.is_empty() {
            request = request.query(&[("db", self.database.as_str())]);
        }
        if !self.username.is_empty() {
            request = request.basic_auth(&self.username, Some(&self.password));
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            // Error statuses usually still carry {"error": "..."}
            if let Ok(decoded) = serde_json::from_str::<QueryResponse>(&body) {
                if let Some(message) = decoded.error {
                    return Err(ClientError::Server(message));
                }
            }
            return Err(ClientError::Server(format!("status {}: {}", status, body)));
        }

        Ok(response.json().await?)
    }

    /// Run a command statement where success is a single result carrying
    /// no series
    async fn command(&self, text: &str) -> ClientResult<()> {
        let response = self.raw_query(text).await?;
        if let Some(message) = response.error {
            return Err(ClientError::Server(message));
        }
        if response.results.len() != 1 {
            return Err(ClientError::UnexpectedResponse(format!(
                "expected a single result, got {}",
                response.results.len()
            )));
        }
        if let Some(message) = response.results.into_iter().next().and_then(|r| r.error) {
            return Err(ClientError::Server(message));
        }
        Ok(())
    }
}

impl std::fmt::Display for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.http.is_some() {
            write!(
                f,
                "Client {{ connected=true addr={} database={} version={} }}",
                self.base_url, self.database, self.version
            )
        } else {
            write!(
                f,
                "Client {{ connected=false addr={} database={} }}",
                self.base_url, self.database
            )
        }
    }
}

fn pick_database(databases: &[String], name: &str) -> ClientResult<String> {
    databases
        .iter()
        .find(|db| db.as_str() == name)
        .cloned()
        .ok_or(ClientError::EmptyResponse)
}

fn create_database_query(name: &str, policy: Option<&RetentionPolicy>) -> String {
    let mut q = format!("CREATE DATABASE {}", quote_always(name));
    if let Some(policy) = policy {
        q.push_str(&policy.render_with_clause());
    }
    q
}

fn create_retention_policy_query(database: &str, policy: &RetentionPolicy, default: bool) -> String {
    let mut q = format!(
        "CREATE RETENTION POLICY {} ON {} DURATION {} REPLICATION {}",
        quote_always(&policy.name),
        quote_always(database),
        policy.duration,
        policy.replication.unwrap_or(1)
    );
    if !policy.shard_group_duration.is_empty() {
        q.push_str(&format!(" SHARD DURATION {}", policy.shard_group_duration));
    }
    if default {
        q.push_str(" DEFAULT");
    }
    q
}

#[cfg(test)]
mod tests {
    use super::*;

    fn closed_client() -> Client {
        Client {
            http: None,
            base_url: "http://localhost:8086/".to_string(),
            username: String::new(),
            password: String::new(),
            database: "db".to_string(),
            version: "1.8".to_string(),
        }
    }

    #[tokio::test]
    async fn test_closed_client_query_fails() {
        let client = closed_client();
        assert!(matches!(
            client.query("SHOW DATABASES").await,
            Err(ClientError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn test_closed_client_set_database_fails() {
        let mut client = closed_client();
        assert!(matches!(
            client.set_database("db").await,
            Err(ClientError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn test_closed_client_show_series_fails() {
        let client = closed_client();
        assert!(matches!(
            client.show_series().await,
            Err(ClientError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn test_closed_client_ping_fails() {
        let client = closed_client();
        assert!(matches!(client.ping().await, Err(ClientError::NotConnected)));
    }

    #[test]
    fn test_closed_client_hides_version_and_database() {
        let client = closed_client();
        assert_eq!(client.version(), "");
        assert_eq!(client.database(), "");
    }

    #[test]
    fn test_pick_database_present() {
        let databases = vec!["db1".to_string(), "db2".to_string()];
        assert_eq!(pick_database(&databases, "db2").unwrap(), "db2");
    }

    #[test]
    fn test_pick_database_absent() {
        let databases = vec!["db1".to_string()];
        assert!(matches!(
            pick_database(&databases, "nope"),
            Err(ClientError::EmptyResponse)
        ));
    }

    #[test]
    fn test_create_database_query_plain() {
        assert_eq!(create_database_query("mydb", None), "CREATE DATABASE \"mydb\"");
    }

    #[test]
    fn test_create_database_query_with_policy() {
        let policy = RetentionPolicy {
            name: "one_day".to_string(),
            duration: "1d".to_string(),
            replication: Some(1),
            shard_group_duration: String::new(),
        };
        assert_eq!(
            create_database_query("mydb", Some(&policy)),
            "CREATE DATABASE \"mydb\" WITH DURATION 1d REPLICATION 1 NAME one_day"
        );
    }

    #[test]
    fn test_create_retention_policy_query() {
        let policy = RetentionPolicy {
            name: "raw".to_string(),
            duration: "30d".to_string(),
            replication: None,
            shard_group_duration: "1h".to_string(),
        };
        assert_eq!(
            create_retention_policy_query("mydb", &policy, true),
            "CREATE RETENTION POLICY \"raw\" ON \"mydb\" DURATION 30d REPLICATION 1 SHARD DURATION 1h DEFAULT"
        );
    }

    #[test]
    fn test_display_reports_connection_state() {
        let client = closed_client();
        let text = format!("{}", client);
        assert!(text.contains("connected=false"));
    }
}
