use crate::error::ConfigError;
use crate::sources::adapter::SourceAdapter;
use crate::sources::demo::StaticSource;
use crate::sources::html::{HtmlListingSource, HtmlSelectorSpec};
use crate::sources::http::HttpClient;
use crate::sources::json_feed::JsonFeedSource;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::info;

/// One entry of the sources file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, strum::IntoStaticStr)]
#[serde(tag = "kind", rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SourceDefinition {
    Html {
        name: String,
        url: String,
        venue_name: String,
        venue_address: String,
        selectors: HtmlSelectorSpec,
    },
    Json {
        name: String,
        url: String,
    },
}

impl SourceDefinition {
    pub fn name(&self) -> &str {
        match self {
            SourceDefinition::Html { name, .. } | SourceDefinition::Json { name, .. } => name,
        }
    }
}

#[tracing::instrument]
pub fn load_source_definitions(path: &Path) -> Result<Vec<SourceDefinition>, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    parse_source_definitions(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn parse_source_definitions(json: &str) -> Result<Vec<SourceDefinition>, serde_json::Error> {
    serde_json::from_str(json)
}

/// Adapters in definition order, which is the order a run visits them in.
pub fn build_adapters(
    definitions: &[SourceDefinition],
    client: &HttpClient,
) -> Result<Vec<Box<dyn SourceAdapter>>, ConfigError> {
    definitions
        .iter()
        .map(|definition| -> Result<Box<dyn SourceAdapter>, ConfigError> {
            let kind: &'static str = definition.into();
            info!("Registering {} source '{}'", kind, definition.name());

            let adapter: Box<dyn SourceAdapter> = match definition {
                SourceDefinition::Html {
                    name,
                    url,
                    venue_name,
                    venue_address,
                    selectors,
                } => Box::new(HtmlListingSource::new(
                    name,
                    url,
                    venue_name,
                    venue_address,
                    selectors,
                    client.clone(),
                )?),
                SourceDefinition::Json { name, url } => {
                    Box::new(JsonFeedSource::new(name, url, client.clone()))
                }
            };

            Ok(adapter)
        })
        .collect()
}

pub fn demo_adapters() -> Vec<Box<dyn SourceAdapter>> {
    StaticSource::kingston_demo()
        .into_iter()
        .map(|source| Box::new(source) as Box<dyn SourceAdapter>)
        .collect()
}
