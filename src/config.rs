use std::env;

/// Runtime configuration for the server itself, sourced from environment
/// variables. Token settings (`JWT_SECRET`, `JWT_EXPIRATION_SECS`) are read
/// where they are used, in `auth::token`.
pub struct Config {
    /// SQLite URL; defaults to a local database file.
    pub database_url: String,
    pub server_port: u16,
    pub server_host: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://taskhub.db".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("SERVER_PORT must be a number"),
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
        }
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}
