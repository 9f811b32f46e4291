/// Application name
pub const APP_NAME: &str = "Rapport";

/// Maximum message length in characters
pub const MAX_MESSAGE_LEN: usize = 4096;

/// Default HTTP API port (server)
pub const DEFAULT_HTTP_PORT: u16 = 4000;

/// Default per-request deadline in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// File name of the SQLite database inside the data directory
pub const DATABASE_FILE_NAME: &str = "rapport.db";
