// Fundamental configuration constants
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATABASE_URL: &str = "sqlite://token_gate.db";
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

// Token lifetime bounds (seconds)
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 3600;
pub const MAX_TOKEN_TTL_SECS: u64 = 30 * 24 * 3600;

// Minimum wall time for a failed credential check
pub const DEFAULT_AUTH_MIN_DURATION_MS: u64 = 100;

// Input limits
pub const MAX_USERNAME_LENGTH: usize = 64;
pub const MAX_PASSWORD_LENGTH: usize = 1024;
pub const MAX_EMAIL_LENGTH: usize = 254;
pub const MAX_TOKEN_LENGTH: usize = 4096;
pub const MAX_BODY_BYTES: u64 = 16 * 1024;

// Route segments
pub const API_PREFIX: &str = "api";
pub const HEALTH_PATH: &str = "health";
