use crate::config::model::HttpSettings;
use crate::error::FetchError;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::policies::ExponentialBackoff;
use reqwest_retry::RetryTransientMiddleware;
use tracing::{debug, info};

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const ACCEPTED_LANGUAGES: &str = "en-CA,en;q=0.9";

/// Shared by every HTTP-backed source; cheap to clone.
#[derive(Clone)]
pub struct HttpClient {
    inner: ClientWithMiddleware,
}

impl HttpClient {
    pub fn new(settings: &HttpSettings) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPTED_LANGUAGES));

        let client = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .default_headers(headers)
            .timeout(settings.request_timeout)
            .build()?;

        let inner = ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(
                ExponentialBackoff::builder().build_with_max_retries(settings.max_retries),
            ))
            .build();

        Ok(Self { inner })
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        info!("Fetching");

        let response = self
            .inner
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response.text().await.map_err(|source| FetchError::Body {
            url: url.to_string(),
            source,
        })?;

        debug!("Received {} bytes", body.len());

        Ok(body)
    }
}
