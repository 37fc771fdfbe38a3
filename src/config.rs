use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::services::signals::{RsiMethod, RuleSet};
use crate::types::InstrumentType;

/// ETFs recognised out of the box.
pub const DEFAULT_ETF_SYMBOLS: [&str; 11] = [
    "JEPQ", "QQQM", "SCHG", "SPY", "VOO", "QQQ", "VTI", "IVV", "SPYM", "SPMO", "SCHD",
];

/// Watch-list served to users who have not saved one.
pub const DEFAULT_TICKERS: [&str; 3] = ["AAPL", "MSFT", "GOOGL"];

/// Fewest closes a live row is ever computed from (EMA50 needs 50).
pub const MIN_HISTORY_FLOOR: usize = 50;

/// Scan engine configuration.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Uppercased ETF allow-list.
    pub etf_symbols: Vec<String>,
    /// Closes required for a live row (never below 50).
    pub min_history: usize,
    /// RSI lookback period.
    pub rsi_period: usize,
    /// RSI averaging method.
    pub rsi_method: RsiMethod,
    /// Number of most recent closes fed to RSI.
    pub rsi_window: usize,
    /// Classification rule set.
    pub rule_set: RuleSet,
    /// Apply the ±5 RSI confidence tier.
    pub mild_rsi_tier: bool,
    /// Maximum in-flight history fetches per scan.
    pub max_concurrency: usize,
    /// Per-ticker fetch timeout (seconds).
    pub fetch_timeout_secs: u64,
    /// How long fetched histories are reused (seconds, 0 = never).
    pub history_cache_ttl_secs: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        let rsi_method = RsiMethod::default();
        Self {
            etf_symbols: DEFAULT_ETF_SYMBOLS.iter().map(|s| s.to_string()).collect(),
            min_history: MIN_HISTORY_FLOOR,
            rsi_period: 14,
            rsi_method,
            rsi_window: rsi_method.default_window(),
            rule_set: RuleSet::default(),
            mild_rsi_tier: false,
            max_concurrency: 4,
            fetch_timeout_secs: 10,
            history_cache_ttl_secs: 60,
        }
    }
}

impl ScanConfig {
    /// Load scan settings from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let rsi_method = env::var("RSI_METHOD")
            .ok()
            .and_then(|v| RsiMethod::from_str(&v))
            .unwrap_or(defaults.rsi_method);

        Self {
            etf_symbols: parse_list("ETF_SYMBOLS").unwrap_or(defaults.etf_symbols),
            min_history: parse_env("MIN_HISTORY", defaults.min_history).max(MIN_HISTORY_FLOOR),
            rsi_period: parse_env("RSI_PERIOD", defaults.rsi_period).max(1),
            rsi_method,
            rsi_window: parse_env("RSI_WINDOW", rsi_method.default_window()),
            rule_set: env::var("SIGNAL_RULES")
                .ok()
                .and_then(|v| RuleSet::from_str(&v))
                .unwrap_or(defaults.rule_set),
            mild_rsi_tier: parse_flag("CONFIDENCE_MILD_RSI", defaults.mild_rsi_tier),
            max_concurrency: parse_env("SCAN_CONCURRENCY", defaults.max_concurrency).max(1),
            fetch_timeout_secs: parse_env("FETCH_TIMEOUT_SECS", defaults.fetch_timeout_secs).max(1),
            history_cache_ttl_secs: parse_env(
                "HISTORY_CACHE_TTL_SECS",
                defaults.history_cache_ttl_secs,
            ),
        }
    }

    /// Case-insensitive ETF allow-list check.
    pub fn is_etf(&self, ticker: &str) -> bool {
        let upper = ticker.trim().to_uppercase();
        self.etf_symbols.iter().any(|etf| *etf == upper)
    }

    pub fn instrument_type(&self, ticker: &str) -> InstrumentType {
        if self.is_etf(ticker) {
            InstrumentType::Etf
        } else {
            InstrumentType::Stock
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn history_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.history_cache_ttl_secs)
    }
}

/// Yahoo Finance source configuration.
#[derive(Debug, Clone)]
pub struct YahooConfig {
    /// Chart API host.
    pub base_url: String,
    /// History range requested (e.g. "1y").
    pub range: String,
    /// HTTP client timeout (seconds).
    pub timeout_secs: u64,
}

impl Default for YahooConfig {
    fn default() -> Self {
        Self {
            base_url: "https://query1.finance.yahoo.com".to_string(),
            range: "1y".to_string(),
            timeout_secs: 15,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// SQLite database file.
    pub database_path: String,
    /// Bearer session lifetime (days).
    pub session_ttl_days: u32,
    /// Subscription granted at registration (days).
    pub subscription_days: u32,
    /// Watch-list for users without a saved one.
    pub default_tickers: Vec<String>,
    /// Maximum tickers per watch-list and per scan request.
    pub max_watchlist: usize,
    pub scan: ScanConfig,
    pub yahoo: YahooConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            database_path: "tickerscan.db".to_string(),
            session_ttl_days: 30,
            subscription_days: 30,
            default_tickers: DEFAULT_TICKERS.iter().map(|s| s.to_string()).collect(),
            max_watchlist: 50,
            scan: ScanConfig::default(),
            yahoo: YahooConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: parse_env("PORT", defaults.port),
            database_path: env::var("DATABASE_PATH").unwrap_or(defaults.database_path),
            session_ttl_days: parse_env("SESSION_TTL_DAYS", defaults.session_ttl_days),
            subscription_days: parse_env("SUBSCRIPTION_DAYS", defaults.subscription_days),
            default_tickers: parse_list("DEFAULT_TICKERS").unwrap_or(defaults.default_tickers),
            max_watchlist: parse_env("MAX_WATCHLIST", defaults.max_watchlist).max(1),
            scan: ScanConfig::from_env(),
            yahoo: YahooConfig {
                base_url: env::var("YAHOO_BASE_URL").unwrap_or(defaults.yahoo.base_url),
                range: env::var("YAHOO_RANGE").unwrap_or(defaults.yahoo.range),
                timeout_secs: parse_env("YAHOO_TIMEOUT_SECS", defaults.yahoo.timeout_secs),
            },
        }
    }
}

fn parse_env<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn parse_flag(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .map(|v| v == "true" || v == "1")
        .unwrap_or(default)
}

/// Comma-separated, uppercased, empty entries dropped. None if unset or empty.
fn parse_list(key: &str) -> Option<Vec<String>> {
    let items: Vec<String> = env::var(key)
        .ok()?
        .split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect();

    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // ScanConfig Tests
    // =========================================================================

    #[test]
    fn test_scan_config_defaults() {
        let config = ScanConfig::default();
        assert_eq!(config.min_history, 50);
        assert_eq!(config.rsi_period, 14);
        assert_eq!(config.rsi_method, RsiMethod::Simple);
        assert_eq!(config.rsi_window, 50);
        assert_eq!(config.rule_set, RuleSet::Combined);
        assert_eq!(config.etf_symbols.len(), 11);
        assert_eq!(config.fetch_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_is_etf_case_insensitive() {
        let config = ScanConfig::default();
        assert!(config.is_etf("spy"));
        assert!(config.is_etf(" Qqqm "));
        assert!(!config.is_etf("AAPL"));
        assert!(!config.is_etf("SP"));
    }

    #[test]
    fn test_instrument_type() {
        let config = ScanConfig::default();
        assert_eq!(config.instrument_type("VOO"), InstrumentType::Etf);
        assert_eq!(config.instrument_type("MSFT"), InstrumentType::Stock);
    }

    // =========================================================================
    // Config Tests
    // =========================================================================

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.port, 3000);
        assert_eq!(config.default_tickers, vec!["AAPL", "MSFT", "GOOGL"]);
        assert_eq!(config.yahoo.range, "1y");
        assert_eq!(config.max_watchlist, 50);
    }

    #[test]
    fn test_parse_env_fallback() {
        assert_eq!(parse_env("TICKERSCAN_TEST_UNSET_NUMBER", 7usize), 7);
        assert!(parse_list("TICKERSCAN_TEST_UNSET_LIST").is_none());
        assert!(!parse_flag("TICKERSCAN_TEST_UNSET_FLAG", false));
    }
}
