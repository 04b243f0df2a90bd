use crate::error::ExportError;
use crate::model::Event;
use chrono::{DateTime, FixedOffset, Local};
use itertools::Itertools;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::info;
use uuid::Uuid;

/// Events of one run, kept in the order they were added.
#[derive(Debug, Default)]
pub struct EventAggregator {
    events: Vec<Event>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    /// Descending count, ties in first-seen order.
    #[serde(serialize_with = "serialize_ordered_map")]
    pub by_category: Vec<(String, usize)>,
    /// Keyed by exact venue name.
    #[serde(serialize_with = "serialize_ordered_map")]
    pub by_venue: Vec<(String, usize)>,
}

/// Parsed form of an exported snapshot. `event_count` always equals `events.len()`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "StoredSnapshot")]
pub struct Snapshot {
    pub generated_at: DateTime<FixedOffset>,
    pub event_count: usize,
    pub events: Vec<Event>,
}

#[derive(Deserialize)]
struct StoredSnapshot {
    generated_at: DateTime<FixedOffset>,
    event_count: usize,
    events: Vec<Event>,
}

impl TryFrom<StoredSnapshot> for Snapshot {
    type Error = String;

    fn try_from(stored: StoredSnapshot) -> Result<Self, Self::Error> {
        if stored.event_count != stored.events.len() {
            return Err(format!(
                "event_count is {} but the snapshot holds {} events",
                stored.event_count,
                stored.events.len()
            ));
        }

        Ok(Self {
            generated_at: stored.generated_at,
            event_count: stored.event_count,
            events: stored.events,
        })
    }
}

#[derive(Serialize)]
struct SnapshotView<'a> {
    generated_at: DateTime<FixedOffset>,
    event_count: usize,
    events: &'a [Event],
}

impl EventAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, events: impl IntoIterator<Item = Event>) {
        self.events.extend(events);
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn summary(&self) -> Summary {
        Summary {
            total: self.events.len(),
            by_category: tally(
                self.events
                    .iter()
                    .flat_map(|event| event.categories.iter().map(String::as_str)),
            ),
            by_venue: tally(self.events.iter().map(|event| event.venue_name.as_str())),
        }
    }

    /// Writes the snapshot as pretty-printed JSON.
    pub fn export<W: Write>(&self, writer: W) -> Result<(), ExportError> {
        self.export_at(writer, Local::now().fixed_offset())
    }

    pub fn export_at<W: Write>(
        &self,
        mut writer: W,
        generated_at: DateTime<FixedOffset>,
    ) -> Result<(), ExportError> {
        let snapshot = SnapshotView {
            generated_at,
            event_count: self.events.len(),
            events: &self.events,
        };

        serde_json::to_writer_pretty(&mut writer, &snapshot)?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        Ok(())
    }

    /// Writes next to `path` first and renames into place, so a failed export
    /// leaves the previous snapshot intact.
    #[tracing::instrument(skip(self))]
    pub fn export_to_path(&self, path: &Path) -> Result<(), ExportError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "snapshot".to_string());
        let staging = path.with_file_name(format!(".{}.{}.tmp", file_name, Uuid::new_v4()));

        let written = self
            .write_file(&staging)
            .and_then(|()| fs::rename(&staging, path).map_err(ExportError::from));
        if let Err(err) = written {
            if staging.exists() {
                let _ = fs::remove_file(&staging);
            }
            return Err(err);
        }

        info!("Exported {} events to {}", self.events.len(), path.display());

        Ok(())
    }

    fn write_file(&self, path: &Path) -> Result<(), ExportError> {
        let file = File::create(path)?;
        self.export(BufWriter::new(&file))?;
        file.sync_all()?;

        Ok(())
    }
}

impl Snapshot {
    pub fn from_reader<R: io::Read>(reader: R) -> serde_json::Result<Self> {
        serde_json::from_reader(reader)
    }
}

pub fn load_snapshot(path: &Path) -> io::Result<Snapshot> {
    let file = File::open(path)?;

    Ok(Snapshot::from_reader(BufReader::new(file))?)
}

fn tally<'a>(keys: impl Iterator<Item = &'a str>) -> Vec<(String, usize)> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(String, usize)> = Vec::new();

    for key in keys {
        match positions.get(key) {
            Some(&position) => counts[position].1 += 1,
            None => {
                positions.insert(key, counts.len());
                counts.push((key.to_string(), 1));
            }
        }
    }

    // sorted_by is stable, so equal counts keep first-seen order
    counts
        .into_iter()
        .sorted_by(|(_, a), (_, b)| b.cmp(a))
        .collect()
}

fn serialize_ordered_map<S: Serializer>(
    entries: &[(String, usize)],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_map(entries.iter().map(|(key, count)| (key, count)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn event(title: &str, categories: &[&str], venue: &str) -> Event {
        Event {
            title: title.to_string(),
            description: String::new(),
            date: NaiveDate::from_ymd_opt(2024, 3, 6).unwrap(),
            start_time: NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
            end_time: None,
            venue_name: venue.to_string(),
            venue_address: String::new(),
            categories: categories.iter().map(|c| c.to_string()).collect(),
            price: None,
            source_url: format!("https://example.com/{}", title),
            image_url: None,
            ticket_url: None,
        }
    }

    fn entries(pairs: &[(&str, usize)]) -> Vec<(String, usize)> {
        pairs.iter().map(|(key, count)| (key.to_string(), *count)).collect()
    }

    #[test_log::test]
    fn should_count_categories_and_venues() {
        let mut aggregator = EventAggregator::new();
        aggregator.add(vec![
            event("one", &["a", "b"], "V1"),
            event("two", &["a"], "V1"),
            event("three", &["c"], "V2"),
        ]);

        let summary = aggregator.summary();

        assert_eq!(summary.total, 3);
        assert_eq!(summary.by_category, entries(&[("a", 2), ("b", 1), ("c", 1)]));
        assert_eq!(summary.by_venue, entries(&[("V1", 2), ("V2", 1)]));
    }

    #[test_log::test]
    fn should_break_ties_by_first_appearance() {
        let mut aggregator = EventAggregator::new();
        aggregator.add(vec![
            event("one", &["z"], "Later Venue"),
            event("two", &["y", "x"], "Earlier Venue"),
            event("three", &["x"], "Earlier Venue"),
            event("four", &["y"], "Later Venue"),
        ]);

        let summary = aggregator.summary();

        assert_eq!(summary.by_category, entries(&[("y", 2), ("x", 2), ("z", 1)]));
        assert_eq!(
            summary.by_venue,
            entries(&[("Later Venue", 2), ("Earlier Venue", 2)])
        );
    }

    #[test_log::test]
    fn when_empty_should_summarize_to_zero() {
        let summary = EventAggregator::new().summary();

        assert_eq!(summary, Summary::default());
        assert_eq!(
            serde_json::to_string(&summary).unwrap(),
            r#"{"total":0,"by_category":{},"by_venue":{}}"#
        );
    }

    #[test_log::test]
    fn should_serialize_the_summary_in_count_order() {
        let mut aggregator = EventAggregator::new();
        aggregator.add(vec![
            event("one", &["trivia"], "The Ale House"),
            event("two", &["concert"], "The Grand Theatre"),
            event("three", &["concert"], "The Grand Theatre"),
        ]);

        assert_eq!(
            serde_json::to_string(&aggregator.summary()).unwrap(),
            r#"{"total":3,"by_category":{"concert":2,"trivia":1},"by_venue":{"The Grand Theatre":2,"The Ale House":1}}"#
        );
    }

    #[test_log::test]
    fn should_write_absent_fields_as_null() {
        let mut aggregator = EventAggregator::new();
        aggregator.add(vec![event("one", &["a"], "V1")]);
        let generated_at = DateTime::parse_from_rfc3339("2024-03-01T08:00:00-05:00").unwrap();

        let mut buffer = Vec::new();
        aggregator.export_at(&mut buffer, generated_at).unwrap();

        let json: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(json["generated_at"], "2024-03-01T08:00:00-05:00");
        assert_eq!(json["event_count"], 1);
        assert_eq!(json["events"][0]["date"], "2024-03-06");
        assert_eq!(json["events"][0]["start_time"], "19:00");

        let event = json["events"][0].as_object().unwrap();
        for field in ["end_time", "price", "image_url", "ticket_url"] {
            assert_eq!(event.get(field), Some(&serde_json::Value::Null), "{}", field);
        }
    }
}
