use serde::Serialize;

/// Connection settings for the relational store, read from `LIGHTBNB_DB_*`
/// environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionConfig {
    pub user: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub host: String,
    pub port: u16,
    pub database: String,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            user: "development".to_string(),
            password: "development".to_string(),
            host: "localhost".to_string(),
            port: 5432,
            database: "lightbnb".to_string(),
        }
    }
}

impl ConnectionConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let d = Self::default();
        let port = match lookup("LIGHTBNB_DB_PORT") {
            Some(raw) => raw.parse::<u16>().unwrap_or_else(|_| {
                tracing::warn!("ignoring invalid LIGHTBNB_DB_PORT {:?}", raw);
                d.port
            }),
            None => d.port,
        };
        Self {
            user: lookup("LIGHTBNB_DB_USER").unwrap_or(d.user),
            password: lookup("LIGHTBNB_DB_PASSWORD").unwrap_or(d.password),
            host: lookup("LIGHTBNB_DB_HOST").unwrap_or(d.host),
            port,
            database: lookup("LIGHTBNB_DB_NAME").unwrap_or(d.database),
        }
    }

    /// Connection URL with the password left out.
    pub fn redacted_url(&self) -> String {
        format!(
            "postgres://{}@{}:{}/{}",
            self.user, self.host, self.port, self.database
        )
    }
}
