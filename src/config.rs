use serde::Deserialize;

/// Config, read from the TOML file given as the first CLI arg.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// <address>:<port> to serve userfacing endpoints
    pub listen_address: String,

    /// <address>:<port> to serve metrics on
    pub metrics_address: String,

    /// By default, output JSON logs. Only if this flag is set to true, output colourful human-friendly logs
    pub human_logs: bool,

    /// Max HTTP body size the API accepts
    #[serde(default = "max_body_size")]
    pub max_body_size: usize,

    /// password to connect to database.
    pub db_dsn: String,

    /// maximum number of connections maintained by PostgresStore
    pub db_pool_size: u32,

    /// maximum seconds waiting for a database connection
    pub db_connection_timeout: u64,

    /// HMAC secret used to sign session tokens.
    pub session_secret: String,

    /// How many seconds a login session stays valid.
    #[serde(default = "session_ttl_secs")]
    pub session_ttl_secs: i64,

    /// If set, this admin account is created at startup (unless it already exists).
    #[serde(default)]
    pub bootstrap_admin: Option<AdminAccount>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminAccount {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl Config {
    /// Will crash if file isn't found or config is invalid.
    pub fn from_file(filepath: &str) -> Self {
        let contents = std::fs::read_to_string(filepath).expect("Couldn't read from config file");
        Self::from_toml(&contents).expect("couldn't parse config file")
    }

    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }
}

fn max_body_size() -> usize {
    65536
}

fn session_ttl_secs() -> i64 {
    60 * 60 * 24 * 7
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_filled_in() {
        let config = Config::from_toml(
            r#"
            listen_address = "127.0.0.1:8080"
            metrics_address = "127.0.0.1:9090"
            human_logs = true
            db_dsn = "postgres://murmur@localhost/murmur"
            db_pool_size = 4
            db_connection_timeout = 5
            session_secret = "hunter2"
            "#,
        )
        .unwrap();
        assert_eq!(config.max_body_size, 65536);
        assert_eq!(config.session_ttl_secs, 604800);
        assert!(config.bootstrap_admin.is_none());
    }

    #[test]
    fn test_example_config_parses() {
        let config = Config::from_toml(include_str!("../murmur.example.toml")).unwrap();
        assert_eq!(config.db_pool_size, 8);
        assert!(config.bootstrap_admin.is_some());
    }

    #[test]
    fn test_bootstrap_admin_table() {
        let config = Config::from_toml(
            r#"
            listen_address = "127.0.0.1:8080"
            metrics_address = "127.0.0.1:9090"
            human_logs = false
            db_dsn = "postgres://murmur@localhost/murmur"
            db_pool_size = 4
            db_connection_timeout = 5
            session_secret = "hunter2"

            [bootstrap_admin]
            username = "jason"
            email = "jason@example.com"
            password = "password"
            "#,
        )
        .unwrap();
        let admin = config.bootstrap_admin.unwrap();
        assert_eq!(admin.username, "jason");
        assert_eq!(admin.email, "jason@example.com");
    }
}
