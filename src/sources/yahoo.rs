//! Yahoo Finance chart API client.
//!
//! Daily closes for stocks and ETFs from the unofficial v8 chart endpoint.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{PriceHistoryProvider, SourceError};
use crate::config::YahooConfig;
use crate::types::PriceHistory;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Deserialize)]
struct ChartQuote {
    close: Option<Vec<Option<f64>>>,
}

/// Yahoo uses hyphens instead of dots for share classes (BRK-B not BRK.B).
fn normalize_yahoo_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase().replace('.', "-")
}

/// Turn a chart payload into a history, dropping null and non-positive closes.
fn parse_chart(ticker: &str, body: &str) -> Result<PriceHistory, SourceError> {
    let data: ChartResponse =
        serde_json::from_str(body).map_err(|e| SourceError::Parse(e.to_string()))?;

    if let Some(error) = data.chart.error {
        return Err(SourceError::Api {
            code: error.code,
            description: error.description,
        });
    }

    let closes: Vec<f64> = data
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .and_then(|result| result.indicators.quote.into_iter().next())
        .and_then(|quote| quote.close)
        .unwrap_or_default()
        .into_iter()
        .flatten()
        .filter(|close| close.is_finite() && *close > 0.0)
        .collect();

    PriceHistory::from_closes(ticker, closes).ok_or_else(|| SourceError::NoData(ticker.to_string()))
}

/// Yahoo Finance API client.
pub struct YahooFinanceClient {
    client: Client,
    config: YahooConfig,
}

impl YahooFinanceClient {
    pub fn new(config: YahooConfig) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self { client, config })
    }

    /// The symbol is percent-encoded as a single path segment.
    fn chart_url(&self, ticker: &str) -> Result<Url, SourceError> {
        let symbol = normalize_yahoo_symbol(ticker);
        let mut url = Url::parse(&self.config.base_url)
            .map_err(|e| SourceError::Request(format!("invalid base url {}: {}", self.config.base_url, e)))?;

        url.path_segments_mut()
            .map_err(|_| SourceError::Request(format!("base url {} cannot hold a path", self.config.base_url)))?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", symbol.as_str()]);
        url.query_pairs_mut()
            .append_pair("range", &self.config.range)
            .append_pair("interval", "1d")
            .append_pair("includePrePost", "false");

        Ok(url)
    }
}

#[async_trait]
impl PriceHistoryProvider for YahooFinanceClient {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    async fn fetch_price_history(&self, ticker: &str) -> Result<PriceHistory, SourceError> {
        let url = self.chart_url(ticker)?;
        debug!("Fetching Yahoo Finance data: {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        // Yahoo reports unknown symbols as 404 with a chart.error payload
        if !status.is_success() {
            return match parse_chart(ticker, &body) {
                Err(err @ SourceError::Api { .. }) => Err(err),
                _ => Err(SourceError::Status(status.as_u16())),
            };
        }

        parse_chart(ticker, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // normalize_yahoo_symbol Tests
    // =========================================================================

    #[test]
    fn test_normalize_yahoo_symbol_uppercase() {
        assert_eq!(normalize_yahoo_symbol("aapl"), "AAPL");
        assert_eq!(normalize_yahoo_symbol(" msft "), "MSFT");
    }

    #[test]
    fn test_normalize_yahoo_symbol_dots_to_hyphens() {
        assert_eq!(normalize_yahoo_symbol("BRK.B"), "BRK-B");
        assert_eq!(normalize_yahoo_symbol("brk.a"), "BRK-A");
    }

    // =========================================================================
    // parse_chart Tests
    // =========================================================================

    #[test]
    fn test_parse_chart_filters_nulls() {
        let body = r#"{
            "chart": {
                "result": [{
                    "meta": {"symbol": "AAPL"},
                    "timestamp": [1, 2, 3, 4],
                    "indicators": {"quote": [{"close": [150.0, null, 0.0, 153.0]}]}
                }],
                "error": null
            }
        }"#;
        let history = parse_chart("AAPL", body).unwrap();
        assert_eq!(history.closes, vec![150.0, 153.0]);
        assert_eq!(history.current_price, 153.0);
        assert_eq!(history.previous_price, 150.0);
    }

    #[test]
    fn test_parse_chart_api_error() {
        let body = r#"{
            "chart": {
                "result": null,
                "error": {"code": "Not Found", "description": "No data found, symbol may be delisted"}
            }
        }"#;
        match parse_chart("XYZ", body) {
            Err(SourceError::Api { code, .. }) => assert_eq!(code, "Not Found"),
            other => panic!("expected api error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_chart_no_closes() {
        let body = r#"{
            "chart": {
                "result": [{"indicators": {"quote": [{}]}}],
                "error": null
            }
        }"#;
        assert!(matches!(parse_chart("XYZ", body), Err(SourceError::NoData(_))));
    }

    #[test]
    fn test_parse_chart_malformed() {
        assert!(matches!(parse_chart("AAPL", "<html>"), Err(SourceError::Parse(_))));
    }

    // =========================================================================
    // YahooFinanceClient Tests
    // =========================================================================

    fn client(base_url: &str, range: &str) -> YahooFinanceClient {
        YahooFinanceClient::new(YahooConfig {
            base_url: base_url.to_string(),
            range: range.to_string(),
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[test]
    fn test_chart_url() {
        let url = client("http://localhost:9000/", "6mo").chart_url("brk.b").unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:9000/v8/finance/chart/BRK-B?range=6mo&interval=1d&includePrePost=false"
        );
    }

    #[test]
    fn test_chart_url_keeps_symbol_inside_path() {
        let url = client("https://query1.finance.yahoo.com", "1y")
            .chart_url("AAPL?range=5d&interval=1m#")
            .unwrap();

        assert_eq!(url.path(), "/v8/finance/chart/AAPL%3FRANGE=5D&INTERVAL=1M%23");
        assert_eq!(url.query(), Some("range=1y&interval=1d&includePrePost=false"));
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn test_chart_url_rejects_bad_base() {
        assert!(matches!(
            client("not a url", "1y").chart_url("AAPL"),
            Err(SourceError::Request(_))
        ));
    }
}
