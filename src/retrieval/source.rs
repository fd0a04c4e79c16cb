use crate::retrieval::error::RetrievalError;
use bon::bon;
use chrono::NaiveDate;
use log::{info, warn};
use reqwest::Client;
use std::future::Future;
use std::time::Duration;

pub const BASE_URL: &str = "https://eco2mix.rte-france.com/curves/eco2mixDl";
pub const DEFAULT_USER_AGENT: &str = concat!("eco2mix-retriever/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Region code of the national perimeter; requests for it omit the `region` parameter.
pub const NATIONAL_REGION: &str = "FR";

/// Something that can hand over the raw export of one region for one day.
///
/// The HTTP implementation is [`HttpSource`]; tests plug in in-memory sources.
pub trait DataSource: Send + Sync {
    fn fetch(
        &self,
        date: NaiveDate,
        region: &str,
    ) -> impl Future<Output = Result<Vec<u8>, RetrievalError>> + Send;
}

/// Downloads exports from the eco2mix portal.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    base_url: String,
    timeout: Duration,
}

#[bon]
impl HttpSource {
    /// Creates a source for the eco2mix download endpoint.
    ///
    /// * `.base_url(String)`: endpoint URL, defaults to [`BASE_URL`].
    /// * `.user_agent(String)`: `User-Agent` header, defaults to [`DEFAULT_USER_AGENT`].
    /// * `.timeout(Duration)`: per-request timeout, defaults to 30 seconds.
    ///
    /// # Errors
    ///
    /// [`RetrievalError::HttpClient`] if the underlying client cannot be built.
    #[builder]
    pub fn new(
        base_url: Option<String>,
        user_agent: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, RetrievalError> {
        let client = Client::builder()
            .user_agent(user_agent.unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()))
            .build()
            .map_err(RetrievalError::HttpClient)?;
        Ok(Self {
            client,
            base_url: base_url.unwrap_or_else(|| BASE_URL.to_string()),
            timeout: timeout.unwrap_or(DEFAULT_TIMEOUT),
        })
    }
}

/// Query parameters of one request: `date` as `DD/MM/YYYY`, plus `region`
/// unless the national perimeter is requested.
pub(crate) fn query_params(date: NaiveDate, region: &str) -> Vec<(&'static str, String)> {
    let mut params = vec![("date", date.format("%d/%m/%Y").to_string())];
    if region != NATIONAL_REGION {
        params.push(("region", region.to_string()));
    }
    params
}

impl DataSource for HttpSource {
    async fn fetch(&self, date: NaiveDate, region: &str) -> Result<Vec<u8>, RetrievalError> {
        let params = query_params(date, region);
        let url = format!("{}?{}", self.base_url, describe(&params));
        info!("Downloading data from {}", url);

        let response = self
            .client
            .get(&self.base_url)
            .query(&params)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| RetrievalError::NetworkRequest(url.clone(), e))?;

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                warn!("HTTP error for {}: {:?}", url, e);
                return Err(if let Some(status) = e.status() {
                    RetrievalError::HttpStatus {
                        url,
                        status,
                        source: e,
                    }
                } else {
                    RetrievalError::NetworkRequest(url, e)
                });
            }
        };

        let bytes = response
            .bytes()
            .await
            .map_err(|e| RetrievalError::NetworkRequest(url.clone(), e))?;
        info!("Downloaded {} bytes for region {} on {}", bytes.len(), region, date);
        Ok(bytes.to_vec())
    }
}

fn describe(params: &[(&str, String)]) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}
