use crate::error::AdapterError;
use crate::model::RawEventFields;
use crate::sources::adapter::SourceAdapter;
use futures::future::{self, BoxFuture};
use futures::FutureExt;

/// Serves a fixed list of records. Used for the built-in Kingston demo and
/// anywhere a source has to be stood in for.
pub struct StaticSource {
    name: String,
    records: Vec<RawEventFields>,
}

impl StaticSource {
    pub fn new(name: &str, records: Vec<RawEventFields>) -> Self {
        Self {
            name: name.to_string(),
            records,
        }
    }

    /// Sample listings for the Kingston venues, written the way listing pages
    /// phrase them so they go through the same parsing as scraped ones.
    pub fn kingston_demo() -> Vec<StaticSource> {
        vec![
            StaticSource::new("grand-theatre", grand_theatre()),
            StaticSource::new("leons-centre", leons_centre()),
            StaticSource::new("tourism-kingston", tourism_kingston()),
            StaticSource::new("local-pubs", local_pubs()),
        ]
    }
}

impl SourceAdapter for StaticSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> BoxFuture<'_, Result<Vec<RawEventFields>, AdapterError>> {
        future::ready(Ok(self.records.clone())).boxed()
    }
}

fn categories(names: &[&str]) -> Option<Vec<String>> {
    Some(names.iter().map(|name| name.to_string()).collect())
}

fn grand_theatre() -> Vec<RawEventFields> {
    let base_url = "https://kingstongrand.ca";

    vec![RawEventFields {
        title: "Kingston Symphony: Winter Concert".to_string(),
        description:
            "An evening of classical music featuring works by Tchaikovsky and Beethoven."
                .to_string(),
        date: "in 7 days".to_string(),
        start_time: "7:30 PM".to_string(),
        end_time: Some("9:30 PM".to_string()),
        venue_name: "The Grand Theatre".to_string(),
        venue_address: "218 Princess St, Kingston, ON".to_string(),
        categories: categories(&["concert", "theatre"]),
        price: Some("$35-75".to_string()),
        source_url: format!("{}/events/symphony-winter", base_url),
        image_url: None,
        ticket_url: Some(format!("{}/tickets/symphony-winter", base_url)),
    }]
}

fn leons_centre() -> Vec<RawEventFields> {
    let base_url = "https://leonscentre.com";

    vec![RawEventFields {
        title: "Kingston Frontenacs vs Oshawa Generals".to_string(),
        description: "OHL hockey action as the Frontenacs take on the Generals.".to_string(),
        date: "in 3 days".to_string(),
        start_time: "puck drops at 7pm".to_string(),
        end_time: Some("10pm".to_string()),
        venue_name: "Leon's Centre".to_string(),
        venue_address: "1 The Tragically Hip Way, Kingston, ON".to_string(),
        categories: categories(&["sports", "family"]),
        price: Some("$18-45".to_string()),
        source_url: format!("{}/events/frontenacs", base_url),
        image_url: None,
        ticket_url: Some(format!("{}/tickets/frontenacs", base_url)),
    }]
}

fn tourism_kingston() -> Vec<RawEventFields> {
    vec![RawEventFields {
        title: "Kingston Christmas Market".to_string(),
        description:
            "Annual holiday market featuring local artisans, food vendors, and live entertainment."
                .to_string(),
        date: "in 5 days".to_string(),
        start_time: "10:00".to_string(),
        end_time: Some("17:00".to_string()),
        venue_name: "Market Square".to_string(),
        venue_address: "216 Ontario St, Kingston, ON".to_string(),
        categories: categories(&["market", "festival", "family"]),
        price: Some("Free Admission".to_string()),
        source_url: "https://www.visitkingston.ca/events/christmas-market".to_string(),
        image_url: None,
        ticket_url: None,
    }]
}

// Pub listings rarely carry tags, so these are left to the classifier.
fn local_pubs() -> Vec<RawEventFields> {
    vec![
        RawEventFields {
            title: "Trivia Night at The Ale House".to_string(),
            description: "Weekly trivia night! Teams of up to 6. Prizes for top 3 teams."
                .to_string(),
            date: "in 2 days".to_string(),
            start_time: "7pm".to_string(),
            end_time: Some("10pm".to_string()),
            venue_name: "The Ale House".to_string(),
            venue_address: "393 Princess St, Kingston, ON".to_string(),
            categories: None,
            price: Some("Free".to_string()),
            source_url: "https://alehousekingston.com/events".to_string(),
            image_url: None,
            ticket_url: None,
        },
        RawEventFields {
            title: "Half-Price Wings Wednesday".to_string(),
            description: "All wings half price every Wednesday! Over 20 sauces available."
                .to_string(),
            date: "next Wednesday".to_string(),
            start_time: "11am".to_string(),
            end_time: Some("11pm".to_string()),
            venue_name: "The Toucan".to_string(),
            venue_address: "76 Princess St, Kingston, ON".to_string(),
            categories: None,
            price: Some("Half-Price Wings".to_string()),
            source_url: "https://toucankingston.com".to_string(),
            image_url: None,
            ticket_url: None,
        },
        RawEventFields {
            title: "Open Mic Night".to_string(),
            description: "Bring your guitar, voice, or poetry! Sign-up starts at 7pm.".to_string(),
            date: "next Thursday".to_string(),
            start_time: "8:00 pm".to_string(),
            end_time: Some("11:30 pm".to_string()),
            venue_name: "Kingston Brewing Company".to_string(),
            venue_address: "34 Clarence St, Kingston, ON".to_string(),
            categories: categories(&["concert", "nightlife"]),
            price: Some("Free".to_string()),
            source_url: "https://kingstonbrewing.ca/events".to_string(),
            image_url: None,
            ticket_url: None,
        },
    ]
}
