use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, header};
use snafu::ResultExt;
use tracing::{debug, info};

use crate::{
    config::ProviderConfig,
    models::{date_range::DateRange, raw_table::RawTable, symbol::Symbol},
    providers::{
        ApiSnafu, ClientBuildSnafu, DataProvider, DecodeSnafu, InvalidUserAgentSnafu,
        ProviderError, ProviderInitError, ReqwestSnafu,
        yahoo_chart::{params::ChartQuery, response::ChartEnvelope},
    },
};

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Yahoo rejects requests without a browser-like user agent.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

pub struct YahooChartProvider {
    client: Client,
    base_url: String,
}

impl YahooChartProvider {
    /// Creates a new Yahoo chart provider.
    ///
    /// No credentials are needed; the user agent and timeout come from `config`.
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderInitError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_str(&config.user_agent).context(InvalidUserAgentSnafu)?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context(ClientBuildSnafu)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_chart(&self, symbol: &Symbol, query: &ChartQuery) -> Result<RawTable, ProviderError> {
        let url = format!("{}/{}", self.base_url, symbol);
        debug!(%url, ?query, "requesting chart");

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .context(ReqwestSnafu)?;
        let status = response.status();
        let body = response.text().await.context(ReqwestSnafu)?;

        let table = parse_chart_body(status, &body)?;
        info!(symbol = %symbol, rows = table.len(), "chart received");
        Ok(table)
    }
}

/// Turns a chart response into a table.
///
/// "Not Found" and an absent result both mean "no data" and yield an empty
/// table. Any other error payload, or an undecodable non-success response,
/// is an error.
pub fn parse_chart_body(status: StatusCode, body: &str) -> Result<RawTable, ProviderError> {
    let envelope = match serde_json::from_str::<ChartEnvelope>(body) {
        Ok(envelope) => envelope,
        Err(_) if !status.is_success() => {
            return ApiSnafu {
                status: status.as_u16(),
                message: body.chars().take(200).collect::<String>(),
            }
            .fail();
        }
        Err(e) => return Err(e).context(DecodeSnafu),
    };

    if let Some(error) = envelope.chart.error {
        if error.is_not_found() {
            return Ok(RawTable::new());
        }
        return ApiSnafu {
            status: status.as_u16(),
            message: format!("{}: {}", error.code, error.description),
        }
        .fail();
    }

    Ok(envelope
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .map(|result| result.into_raw_table())
        .unwrap_or_default())
}

#[async_trait]
impl DataProvider for YahooChartProvider {
    async fn lookup_recent(&self, symbol: &Symbol) -> Result<RawTable, ProviderError> {
        self.get_chart(symbol, &ChartQuery::single_day()).await
    }

    async fn fetch_history(
        &self,
        symbol: &Symbol,
        range: &DateRange,
    ) -> Result<RawTable, ProviderError> {
        self.get_chart(symbol, &ChartQuery::history(range)).await
    }
}
