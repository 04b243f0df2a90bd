use crate::error::AdapterError;
use crate::model::RawEventFields;
use crate::sources::adapter::SourceAdapter;
use crate::sources::http::HttpClient;
use futures::future::BoxFuture;
use futures::FutureExt;
use tracing::{error, info};

/// Endpoint serving a JSON array of raw event records.
pub struct JsonFeedSource {
    name: String,
    url: String,
    client: HttpClient,
}

impl JsonFeedSource {
    pub fn new(name: &str, url: &str, client: HttpClient) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            client,
        }
    }

    /// Records without their own link are attributed to the feed.
    pub fn parse_payload(&self, json: &str) -> Result<Vec<RawEventFields>, AdapterError> {
        let records = serde_json::from_str::<Vec<RawEventFields>>(json).map_err(|e| {
            error!("Response parse failed: {:?}", e);
            AdapterError::Parse(e.to_string())
        })?;

        Ok(records
            .into_iter()
            .map(|mut record| {
                if record.source_url.trim().is_empty() {
                    record.source_url = self.url.clone();
                }
                record
            })
            .collect())
    }

    #[tracing::instrument(skip(self), fields(source = %self.name))]
    async fn fetch_feed(&self) -> Result<Vec<RawEventFields>, AdapterError> {
        let json = self.client.get_text(&self.url).await?;
        let records = self.parse_payload(&json)?;

        info!("Feed listed {} records", records.len());

        Ok(records)
    }
}

impl SourceAdapter for JsonFeedSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> BoxFuture<'_, Result<Vec<RawEventFields>, AdapterError>> {
        self.fetch_feed().boxed()
    }
}
