use std::net::Ipv4Addr;

// ============================================================================
// Guarded arithmetic
// ============================================================================
//
// Every place that turns possibly-missing readings into numbers goes through
// these helpers, so "nothing sampled" is always 0 and never NaN.

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// `part / whole * 100`, or `0` when `whole` is zero or not finite.
pub fn percent_of(part: f64, whole: f64) -> f64 {
    if whole <= 0.0 || !whole.is_finite() || !part.is_finite() {
        return 0.0;
    }
    part / whole * 100.0
}

/// Arithmetic mean, or `0` when `count` is zero.
pub fn mean_or_zero(sum: f64, count: usize) -> f64 {
    if count == 0 || !sum.is_finite() {
        return 0.0;
    }
    sum / count as f64
}

/// Reading for a value that may be absent; absence counts as `0`.
pub fn value_or_zero(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or_default()
}

pub fn bytes_to_mb(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MB
}

// ============================================================================
// Environment
// ============================================================================

const API_PORT: &str = "VMT_API_PORT";

const DEFAULT_PORT: u16 = 8080;

pub fn get_default_port() -> u16 {
    DEFAULT_PORT
}

pub fn get_port() -> u16 {
    let port_from_env = std::env::var(API_PORT);
    port_from_env.map_or(DEFAULT_PORT, |res| res.parse().unwrap_or(DEFAULT_PORT))
}

const API_ADDR: &str = "VMT_API_ADDR";

const DEFAULT_ADDR: Ipv4Addr = Ipv4Addr::new(127, 0, 0, 1);

pub fn get_addr() -> Ipv4Addr {
    let addr_from_env = std::env::var(API_ADDR);
    addr_from_env.map_or(DEFAULT_ADDR, |res| res.parse().unwrap_or(DEFAULT_ADDR))
}

const API_TOKEN: &str = "VMT_API_TOKEN";

pub fn get_api_token() -> Option<String> {
    std::env::var(API_TOKEN).ok()
}

const SOURCE_TOKEN: &str = "VMT_SOURCE_TOKEN";

pub fn get_source_token() -> Option<String> {
    std::env::var(SOURCE_TOKEN).ok()
}
