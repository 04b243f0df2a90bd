use crate::error::RecordError;
use chrono::{NaiveDate, NaiveTime};
use itertools::Itertools;
use serde::{Deserialize, Deserializer, Serialize};
use serde_either::SingleOrVec;

/// Canonical event, built once by the normalizer and never mutated afterwards.
/// Deserializing goes through `StoredEvent` so a snapshot cannot smuggle in
/// an event the normalizer would not have built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StoredEvent")]
pub struct Event {
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) date: NaiveDate,
    #[serde(serialize_with = "clock_time::serialize")]
    pub(crate) start_time: NaiveTime,
    #[serde(serialize_with = "optional_clock_time::serialize")]
    pub(crate) end_time: Option<NaiveTime>,
    pub(crate) venue_name: String,
    pub(crate) venue_address: String,
    pub(crate) categories: Vec<String>,
    pub(crate) price: Option<String>,
    pub(crate) source_url: String,
    pub(crate) image_url: Option<String>,
    pub(crate) ticket_url: Option<String>,
}

/// An event as written to a snapshot. Optional fields must be present,
/// written as `null` when absent.
#[derive(Deserialize)]
struct StoredEvent {
    title: String,
    description: String,
    date: NaiveDate,
    #[serde(deserialize_with = "clock_time::deserialize")]
    start_time: NaiveTime,
    #[serde(deserialize_with = "optional_clock_time::deserialize")]
    end_time: Option<NaiveTime>,
    venue_name: String,
    venue_address: String,
    categories: Vec<String>,
    #[serde(deserialize_with = "nullable")]
    price: Option<String>,
    source_url: String,
    #[serde(deserialize_with = "nullable")]
    image_url: Option<String>,
    #[serde(deserialize_with = "nullable")]
    ticket_url: Option<String>,
}

impl TryFrom<StoredEvent> for Event {
    type Error = RecordError;

    fn try_from(stored: StoredEvent) -> Result<Self, Self::Error> {
        if stored.title.trim().is_empty() {
            return Err(RecordError::MissingTitle);
        }
        if stored.categories.is_empty() {
            return Err(RecordError::MissingCategories);
        }
        if let Some(category) = stored.categories.iter().duplicates().next() {
            return Err(RecordError::DuplicateCategory(category.clone()));
        }

        Ok(Self {
            title: stored.title,
            description: stored.description,
            date: stored.date,
            start_time: stored.start_time,
            end_time: stored.end_time,
            venue_name: stored.venue_name,
            venue_address: stored.venue_address,
            categories: stored.categories,
            price: stored.price,
            source_url: stored.source_url,
            image_url: stored.image_url,
            ticket_url: stored.ticket_url,
        })
    }
}

impl Event {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn start_time(&self) -> NaiveTime {
        self.start_time
    }

    /// May be earlier than the start time for events running past midnight.
    pub fn end_time(&self) -> Option<NaiveTime> {
        self.end_time
    }

    pub fn venue_name(&self) -> &str {
        &self.venue_name
    }

    pub fn venue_address(&self) -> &str {
        &self.venue_address
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn price(&self) -> Option<&str> {
        self.price.as_deref()
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    pub fn ticket_url(&self) -> Option<&str> {
        self.ticket_url.as_deref()
    }
}

/// Unvalidated adapter output. Consumed by the normalizer and then dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RawEventFields {
    pub title: String,
    pub description: String,
    pub date: String,
    pub start_time: String,
    pub end_time: Option<String>,
    pub venue_name: String,
    pub venue_address: String,
    #[serde(deserialize_with = "deserialize_categories")]
    pub categories: Option<Vec<String>>,
    pub price: Option<String>,
    pub source_url: String,
    pub image_url: Option<String>,
    pub ticket_url: Option<String>,
}

// Feeds send either "concert" or ["concert", "theatre"]
fn deserialize_categories<'de, D>(d: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<SingleOrVec<String>>::deserialize(d)?.map(|categories| match categories {
            SingleOrVec::Single(category) => vec![category],
            SingleOrVec::Vec(vec) => vec,
        }),
    )
}

// A field with deserialize_with has no implicit default, so a missing key is an error
fn nullable<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Option::<String>::deserialize(d)
}

const CLOCK_FORMAT: &str = "%H:%M";
const CLOCK_FORMAT_WITH_SECONDS: &str = "%H:%M:%S";

fn parse_clock<E: serde::de::Error>(value: &str) -> Result<NaiveTime, E> {
    NaiveTime::parse_from_str(value, CLOCK_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(value, CLOCK_FORMAT_WITH_SECONDS))
        .map_err(E::custom)
}

mod clock_time {
    use super::{parse_clock, CLOCK_FORMAT};
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&time.format(CLOCK_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        parse_clock(&String::deserialize(d)?)
    }
}

mod optional_clock_time {
    use super::{parse_clock, CLOCK_FORMAT};
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &Option<NaiveTime>, s: S) -> Result<S::Ok, S::Error> {
        match time {
            Some(time) => s.collect_str(&time.format(CLOCK_FORMAT)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveTime>, D::Error> {
        Option::<String>::deserialize(d)?
            .map(|value| parse_clock(&value))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn should_deserialize_raw_fields_with_a_single_category() {
        let raw = serde_json::from_str::<RawEventFields>(
            r#"{ "title": "Open Mic Night", "date": "next Thursday", "categories": "concert" }"#,
        )
        .unwrap();

        assert_eq!(raw.title, "Open Mic Night");
        assert_eq!(raw.categories, Some(vec!["concert".to_string()]));
        assert_eq!(raw.end_time, None);
    }

    #[test_log::test]
    fn should_deserialize_raw_fields_with_a_category_list() {
        let raw = serde_json::from_str::<RawEventFields>(
            r#"{ "title": "Christmas Market", "categories": ["market", "family"] }"#,
        )
        .unwrap();

        assert_eq!(
            raw.categories,
            Some(vec!["market".to_string(), "family".to_string()])
        );
    }

    #[test_log::test]
    fn should_accept_clock_times_with_seconds() {
        let time: NaiveTime = parse_clock::<serde_json::Error>("19:30:00").unwrap();

        assert_eq!(time, NaiveTime::from_hms_opt(19, 30, 0).unwrap());
    }

    const STORED: &str = r#"{
      "title": "Frontenacs vs. Petes",
      "description": "OHL regular season game.",
      "date": "2024-03-08",
      "start_time": "19:05",
      "end_time": null,
      "venue_name": "Leon's Centre",
      "venue_address": "1 The Tragically Hip Way, Kingston, ON",
      "categories": ["sports"],
      "price": null,
      "source_url": "https://leonscentre.com/events",
      "image_url": null,
      "ticket_url": null
    }"#;

    #[test_log::test]
    fn should_deserialize_a_stored_event() {
        let event = serde_json::from_str::<Event>(STORED).unwrap();

        assert_eq!(event.title(), "Frontenacs vs. Petes");
        assert_eq!(event.start_time(), NaiveTime::from_hms_opt(19, 5, 0).unwrap());
        assert_eq!(event.categories(), ["sports"]);
        assert_eq!(event.ticket_url(), None);
    }

    #[test_log::test]
    fn when_an_optional_field_is_omitted_should_fail() {
        for field in ["end_time", "price", "image_url", "ticket_url"] {
            let mut json: serde_json::Value = serde_json::from_str(STORED).unwrap();
            json.as_object_mut().unwrap().remove(field);

            let error = serde_json::from_value::<Event>(json).unwrap_err();

            assert!(error.to_string().contains(field), "{}", error);
        }
    }

    #[test_log::test]
    fn should_reject_stored_events_the_normalizer_would_not_build() {
        let with = |field: &str, value: serde_json::Value| {
            let mut json: serde_json::Value = serde_json::from_str(STORED).unwrap();
            json[field] = value;
            serde_json::from_value::<Event>(json).unwrap_err().to_string()
        };

        assert!(with("title", " ".into()).contains("no title"));
        assert!(with("categories", serde_json::json!([])).contains("no categories"));
        assert!(with("categories", serde_json::json!(["sports", "sports"])).contains("'sports'"));
    }
}
