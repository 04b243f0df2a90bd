use crate::classifier::CategoryClassifier;
use crate::config::model::DEFAULT_ADAPTER_TIMEOUT;
use crate::error::{AdapterError, RecordError};
use crate::model::{Event, RawEventFields};
use crate::parsing::date::parse_date_relative_to;
use crate::parsing::time::parse_time;
use crate::sources::adapter::SourceAdapter;
use chrono::{Local, NaiveDate};
use itertools::Itertools;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{error, info, warn};

/// Turns raw adapter output into canonical events.
pub struct EventNormalizer {
    classifier: CategoryClassifier,
    adapter_timeout: Duration,
    reference_date: Option<NaiveDate>,
}

#[derive(Debug)]
pub enum AdapterOutcome {
    Completed { accepted: usize, skipped: usize },
    Failed(AdapterError),
}

#[derive(Debug)]
pub struct AdapterReport {
    pub name: String,
    pub outcome: AdapterOutcome,
}

/// Result of one pass over the registered adapters.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Concatenated in adapter order.
    pub events: Vec<Event>,
    /// Only adapters that were actually invoked.
    pub adapters: Vec<AdapterReport>,
    pub cancelled: bool,
}

impl RunReport {
    pub fn failed_adapters(&self) -> impl Iterator<Item = &AdapterReport> {
        self.adapters
            .iter()
            .filter(|report| matches!(report.outcome, AdapterOutcome::Failed(_)))
    }

    pub fn skipped_records(&self) -> usize {
        self.adapters
            .iter()
            .map(|report| match report.outcome {
                AdapterOutcome::Completed { skipped, .. } => skipped,
                AdapterOutcome::Failed(_) => 0,
            })
            .sum()
    }

    pub fn all_adapters_failed(&self) -> bool {
        !self.adapters.is_empty() && self.failed_adapters().count() == self.adapters.len()
    }
}

impl EventNormalizer {
    pub fn new(classifier: CategoryClassifier) -> Self {
        Self {
            classifier,
            adapter_timeout: DEFAULT_ADAPTER_TIMEOUT,
            reference_date: None,
        }
    }

    pub fn with_adapter_timeout(mut self, adapter_timeout: Duration) -> Self {
        self.adapter_timeout = adapter_timeout;
        self
    }

    /// Pins the date relative expressions resolve against. Defaults to today.
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    pub fn normalize(&self, raw: RawEventFields) -> Result<Event, RecordError> {
        let title = raw.title.trim().to_string();
        if title.is_empty() {
            return Err(RecordError::MissingTitle);
        }

        let today = self
            .reference_date
            .unwrap_or_else(|| Local::now().date_naive());
        let date = parse_date_relative_to(&raw.date, today)
            .ok_or_else(|| RecordError::UnparsableDate(raw.date.clone()))?;
        let start_time = parse_time(&raw.start_time)
            .ok_or_else(|| RecordError::UnparsableStartTime(raw.start_time.clone()))?;
        let end_time = non_blank(raw.end_time).and_then(|text| {
            let time = parse_time(&text);
            if time.is_none() {
                warn!("Ignoring unparsable end time '{}' of '{}'", text, title);
            }
            time
        });

        let description = voca_rs::strip::strip_tags(&raw.description).trim().to_string();

        let categories = match raw.categories {
            Some(categories) if categories.iter().any(|c| !c.trim().is_empty()) => categories
                .into_iter()
                .filter(|category| !category.trim().is_empty())
                .unique()
                .collect(),
            _ => self
                .classifier
                .classify(&format!("{} {}", title, description)),
        };

        Ok(Event {
            title,
            description,
            date,
            start_time,
            end_time,
            venue_name: raw.venue_name.trim().to_string(),
            venue_address: raw.venue_address.trim().to_string(),
            categories,
            price: non_blank(raw.price),
            source_url: raw.source_url.trim().to_string(),
            image_url: non_blank(raw.image_url),
            ticket_url: non_blank(raw.ticket_url),
        })
    }

    pub async fn run(&self, adapters: &[Box<dyn SourceAdapter>]) -> RunReport {
        self.run_until_cancelled(adapters, &AtomicBool::new(false))
            .await
    }

    /// Visits the adapters one after another. `cancelled` is checked between
    /// adapters only, so an adapter's records are merged whole or not at all.
    #[tracing::instrument(skip_all, fields(adapters = adapters.len()))]
    pub async fn run_until_cancelled(
        &self,
        adapters: &[Box<dyn SourceAdapter>],
        cancelled: &AtomicBool,
    ) -> RunReport {
        let mut report = RunReport::default();

        for adapter in adapters {
            if cancelled.load(Ordering::SeqCst) {
                warn!(
                    "Run cancelled, skipping the remaining {} adapters",
                    adapters.len() - report.adapters.len()
                );
                report.cancelled = true;
                break;
            }

            let name = adapter.name();
            let outcome = match timeout(self.adapter_timeout, adapter.fetch()).await {
                Ok(Ok(records)) => {
                    let (events, skipped) = self.normalize_all(name, records);
                    info!("{}: Found {} events", name, events.len());

                    let accepted = events.len();
                    report.events.extend(events);

                    AdapterOutcome::Completed { accepted, skipped }
                }
                Ok(Err(err)) => {
                    error!("{} failed: {}", name, err);
                    AdapterOutcome::Failed(err)
                }
                Err(_) => {
                    error!("{} timed out after {:?}", name, self.adapter_timeout);
                    AdapterOutcome::Failed(AdapterError::Timeout(self.adapter_timeout))
                }
            };

            report.adapters.push(AdapterReport {
                name: name.to_string(),
                outcome,
            });
        }

        report
    }

    fn normalize_all(&self, source: &str, records: Vec<RawEventFields>) -> (Vec<Event>, usize) {
        let mut skipped = 0;
        let events = records
            .into_iter()
            .filter_map(|raw| {
                let title = raw.title.clone();
                match self.normalize(raw) {
                    Ok(event) => Some(event),
                    Err(err) => {
                        warn!("{}: Skipping record '{}': {}", source, title, err);
                        skipped += 1;
                        None
                    }
                }
            })
            .collect();

        (events, skipped)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
