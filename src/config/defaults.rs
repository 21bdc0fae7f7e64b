/// Configuration default values
///
/// This module contains all the default values for configuration options,
/// making them easily changeable in one central location.
// Database defaults
pub const DEFAULT_DATABASE_URL: &str = "sqlite://./food-scan.db";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

// Web server defaults
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_REQUEST_TIMEOUT: &str = "60s";
pub const DEFAULT_MAX_REQUEST_SIZE_BYTES: usize = 20 * 1024 * 1024; // 20MB, phone photos as base64

// AI gateway defaults
pub const DEFAULT_AI_GATEWAY_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_AI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_AI_TIMEOUT: &str = "60s";
pub const AI_API_KEY_ENV: &str = "FOOD_SCAN_AI_API_KEY";

// Budget defaults (all amounts in cents)
pub const DEFAULT_SCAN_COST_CENTS: i64 = 1;
pub const DEFAULT_MEAL_PLAN_COST_CENTS: i64 = 2;
pub const DEFAULT_MONTHLY_LIMIT_CENTS: i64 = 100;

// Scan defaults
pub const DEFAULT_HASH_PREFIX_LEN: usize = 10_000;

// Environment override prefix, e.g. FOOD_SCAN_WEB__PORT=9090
pub const ENV_PREFIX: &str = "FOOD_SCAN_";
