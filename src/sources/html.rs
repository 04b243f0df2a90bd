use crate::error::{AdapterError, ConfigError};
use crate::model::RawEventFields;
use crate::sources::adapter::SourceAdapter;
use crate::sources::http::HttpClient;
use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use serde::Deserialize;
use tracing::{debug, warn};

/// CSS selectors as written in the sources file. Field selectors are relative
/// to one event card.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HtmlSelectorSpec {
    pub card: String,
    pub title: String,
    pub date: String,
    /// Falls back to the date element, which often reads "Fri Dec 12, 7:30 PM".
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    /// An `a[href]` pointing to the event page.
    pub link: Option<String>,
    /// An `img[src]`.
    pub image: Option<String>,
    pub ticket_link: Option<String>,
}

struct HtmlSelectors {
    card: Selector,
    title: Selector,
    date: Selector,
    start_time: Option<Selector>,
    end_time: Option<Selector>,
    description: Option<Selector>,
    price: Option<Selector>,
    link: Option<Selector>,
    image: Option<Selector>,
    ticket_link: Option<Selector>,
}

/// Event listing page with one card per event at a single venue.
pub struct HtmlListingSource {
    name: String,
    url: Url,
    venue_name: String,
    venue_address: String,
    selectors: HtmlSelectors,
    client: HttpClient,
}

impl HtmlListingSource {
    pub fn new(
        name: &str,
        url: &str,
        venue_name: &str,
        venue_address: &str,
        selectors: &HtmlSelectorSpec,
        client: HttpClient,
    ) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidSource {
            name: name.to_string(),
            reason,
        };
        let parse = |css: &str| {
            Selector::parse(css).map_err(|err| invalid(format!("bad selector '{}': {}", css, err)))
        };
        let parse_optional =
            |css: &Option<String>| css.as_deref().map(|css| parse(css)).transpose();

        Ok(Self {
            name: name.to_string(),
            url: Url::parse(url).map_err(|err| invalid(format!("bad url '{}': {}", url, err)))?,
            venue_name: venue_name.to_string(),
            venue_address: venue_address.to_string(),
            selectors: HtmlSelectors {
                card: parse(&selectors.card)?,
                title: parse(&selectors.title)?,
                date: parse(&selectors.date)?,
                start_time: parse_optional(&selectors.start_time)?,
                end_time: parse_optional(&selectors.end_time)?,
                description: parse_optional(&selectors.description)?,
                price: parse_optional(&selectors.price)?,
                link: parse_optional(&selectors.link)?,
                image: parse_optional(&selectors.image)?,
                ticket_link: parse_optional(&selectors.ticket_link)?,
            },
            client,
        })
    }

    /// Reads every card of a listing page. Cards missing fields are still
    /// returned; rejecting them is up to the normalizer.
    pub fn extract(&self, html: &str) -> Vec<RawEventFields> {
        let document = Html::parse_document(html);
        let selectors = &self.selectors;

        let records: Vec<RawEventFields> = document
            .select(&selectors.card)
            .map(|card| {
                let date = text_of(card, &selectors.date).unwrap_or_default();
                let start_time = match &selectors.start_time {
                    Some(selector) => text_of(card, selector).unwrap_or_default(),
                    None => date.clone(),
                };

                RawEventFields {
                    title: text_of(card, &selectors.title).unwrap_or_default(),
                    description: optional_text(card, &selectors.description).unwrap_or_default(),
                    date,
                    start_time,
                    end_time: optional_text(card, &selectors.end_time),
                    venue_name: self.venue_name.clone(),
                    venue_address: self.venue_address.clone(),
                    categories: None,
                    price: optional_text(card, &selectors.price),
                    source_url: self
                        .link_of(card, &selectors.link, "href")
                        .unwrap_or_else(|| self.url.to_string()),
                    image_url: self.link_of(card, &selectors.image, "src"),
                    ticket_url: self.link_of(card, &selectors.ticket_link, "href"),
                }
            })
            .collect();

        if records.is_empty() {
            warn!("No event cards found on {}", self.url);
        }

        debug!("Extracted {} cards", records.len());

        records
    }

    async fn fetch_listing(&self) -> Result<Vec<RawEventFields>, AdapterError> {
        let html = self.client.get_text(self.url.as_str()).await?;

        Ok(self.extract(&html))
    }

    fn link_of(
        &self,
        card: ElementRef,
        selector: &Option<Selector>,
        attribute: &str,
    ) -> Option<String> {
        let value = card
            .select(selector.as_ref()?)
            .next()?
            .value()
            .attr(attribute)?;

        match self.url.join(value.trim()) {
            Ok(url) => Some(url.to_string()),
            Err(err) => {
                warn!("Ignoring unresolvable link '{}': {}", value, err);
                None
            }
        }
    }
}

impl SourceAdapter for HtmlListingSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> BoxFuture<'_, Result<Vec<RawEventFields>, AdapterError>> {
        self.fetch_listing().boxed()
    }
}

fn text_of(card: ElementRef, selector: &Selector) -> Option<String> {
    let element = card.select(selector).next()?;
    let text = element.text().collect::<Vec<_>>().join(" ");
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn optional_text(card: ElementRef, selector: &Option<Selector>) -> Option<String> {
    text_of(card, selector.as_ref()?)
}
