use chrono::{NaiveDate, NaiveTime};
use futures::future::{self, BoxFuture};
use futures::FutureExt;
use kingston_happenings::classifier::CategoryClassifier;
use kingston_happenings::error::{AdapterError, FetchError};
use kingston_happenings::model::RawEventFields;
use kingston_happenings::normalizer::{AdapterOutcome, EventNormalizer};
use kingston_happenings::sources::adapter::SourceAdapter;
use kingston_happenings::sources::demo::StaticSource;
use kingston_happenings::sources::registry::demo_adapters;
use reqwest::StatusCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

struct FailingSource {
    name: String,
}

impl SourceAdapter for FailingSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> BoxFuture<'_, Result<Vec<RawEventFields>, AdapterError>> {
        future::ready(Err(AdapterError::Fetch(FetchError::Status {
            url: format!("https://{}.example.com", self.name),
            status: StatusCode::SERVICE_UNAVAILABLE,
        })))
        .boxed()
    }
}

struct StalledSource;

impl SourceAdapter for StalledSource {
    fn name(&self) -> &str {
        "stalled"
    }

    fn fetch(&self) -> BoxFuture<'_, Result<Vec<RawEventFields>, AdapterError>> {
        async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(vec![record("Never Arrives", "tomorrow", "8pm")])
        }
        .boxed()
    }
}

/// Requests cancellation while its own fetch is still in flight.
struct CancellingSource {
    cancelled: Arc<AtomicBool>,
}

impl SourceAdapter for CancellingSource {
    fn name(&self) -> &str {
        "cancelling"
    }

    fn fetch(&self) -> BoxFuture<'_, Result<Vec<RawEventFields>, AdapterError>> {
        self.cancelled.store(true, Ordering::SeqCst);
        future::ready(Ok(vec![record("Last Call", "tomorrow", "11pm")])).boxed()
    }
}

fn record(title: &str, date: &str, start_time: &str) -> RawEventFields {
    RawEventFields {
        title: title.to_string(),
        date: date.to_string(),
        start_time: start_time.to_string(),
        venue_name: "The Mansion".to_string(),
        source_url: format!("https://example.com/{}", title),
        ..Default::default()
    }
}

fn source(name: &str, records: Vec<RawEventFields>) -> Box<dyn SourceAdapter> {
    Box::new(StaticSource::new(name, records))
}

fn normalizer() -> EventNormalizer {
    EventNormalizer::new(CategoryClassifier::default())
        .with_reference_date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
}

fn titles(events: &[kingston_happenings::model::Event]) -> Vec<&str> {
    events.iter().map(|event| event.title()).collect()
}

#[test_log::test(tokio::test)]
async fn when_an_adapter_fails_should_keep_the_other_adapters_events() {
    let adapters = vec![
        source("a", vec![record("Jazz Brunch", "Sunday", "11am")]),
        Box::new(FailingSource {
            name: "b".to_string(),
        }) as Box<dyn SourceAdapter>,
        source("c", vec![record("Pub Quiz", "Mar 5", "8pm")]),
    ];

    let report = normalizer().run(&adapters).await;

    assert_eq!(titles(&report.events), vec!["Jazz Brunch", "Pub Quiz"]);
    assert_eq!(report.failed_adapters().count(), 1);
    assert_eq!(report.failed_adapters().next().unwrap().name, "b");
    assert!(matches!(
        report.adapters[1].outcome,
        AdapterOutcome::Failed(AdapterError::Fetch(_))
    ));
    assert!(!report.all_adapters_failed());
}

#[test_log::test(tokio::test)]
async fn when_a_record_is_unparsable_should_keep_its_siblings() {
    let adapters = vec![source(
        "pubs",
        vec![
            record("Trivia Night", "next Wednesday", "7pm"),
            record("Mystery Night", "date to be announced", "9pm"),
            record("Wing Night", "3/7", "no time yet"),
            record("Open Mic", "next Thursday", "8:00 pm"),
        ],
    )];

    let report = normalizer().run(&adapters).await;

    assert_eq!(titles(&report.events), vec!["Trivia Night", "Open Mic"]);
    assert_eq!(report.skipped_records(), 2);
    assert!(matches!(
        report.adapters[0].outcome,
        AdapterOutcome::Completed {
            accepted: 2,
            skipped: 2
        }
    ));
    assert_eq!(
        report.events[1].date(),
        NaiveDate::from_ymd_opt(2024, 3, 7).unwrap()
    );
    assert_eq!(
        report.events[1].start_time(),
        NaiveTime::from_hms_opt(20, 0, 0).unwrap()
    );
}

#[test_log::test(tokio::test)]
async fn when_an_adapter_stalls_should_time_it_out_and_continue() {
    let adapters = vec![
        Box::new(StalledSource) as Box<dyn SourceAdapter>,
        source("after", vec![record("Paint Night", "tomorrow", "6:30pm")]),
    ];

    let report = normalizer()
        .with_adapter_timeout(Duration::from_millis(50))
        .run(&adapters)
        .await;

    assert_eq!(titles(&report.events), vec!["Paint Night"]);
    assert!(matches!(
        report.adapters[0].outcome,
        AdapterOutcome::Failed(AdapterError::Timeout(_))
    ));
}

#[test_log::test(tokio::test)]
async fn when_every_adapter_fails_should_report_total_failure() {
    let adapters: Vec<Box<dyn SourceAdapter>> = vec![
        Box::new(FailingSource {
            name: "one".to_string(),
        }),
        Box::new(FailingSource {
            name: "two".to_string(),
        }),
    ];

    let report = normalizer().run(&adapters).await;

    assert!(report.events.is_empty());
    assert!(report.all_adapters_failed());
}

#[test_log::test(tokio::test)]
async fn when_there_are_no_adapters_should_not_count_as_failure() {
    let report = normalizer().run(&[]).await;

    assert!(report.events.is_empty());
    assert!(!report.all_adapters_failed());
}

#[test_log::test(tokio::test)]
async fn when_cancelled_should_finish_the_current_adapter_and_skip_the_rest() {
    let cancelled = Arc::new(AtomicBool::new(false));
    let adapters = vec![
        source("first", vec![record("Comedy Show", "tomorrow", "9pm")]),
        Box::new(CancellingSource {
            cancelled: cancelled.clone(),
        }) as Box<dyn SourceAdapter>,
        source("never", vec![record("Not Visited", "tomorrow", "9pm")]),
    ];

    let report = normalizer()
        .run_until_cancelled(&adapters, &cancelled)
        .await;

    assert!(report.cancelled);
    assert_eq!(titles(&report.events), vec!["Comedy Show", "Last Call"]);
    assert_eq!(report.adapters.len(), 2);
}

#[test_log::test(tokio::test)]
async fn should_normalize_every_demo_listing() {
    let report = normalizer().run(&demo_adapters()).await;

    assert_eq!(report.events.len(), 6);
    assert_eq!(report.skipped_records(), 0);

    let wings = report
        .events
        .iter()
        .find(|event| event.title() == "Half-Price Wings Wednesday")
        .unwrap();
    assert_eq!(wings.date(), NaiveDate::from_ymd_opt(2024, 3, 6).unwrap());
    assert_eq!(wings.categories(), ["food-deal"]);

    let symphony = &report.events[0];
    assert_eq!(symphony.date(), NaiveDate::from_ymd_opt(2024, 3, 8).unwrap());
    assert_eq!(
        symphony.start_time(),
        NaiveTime::from_hms_opt(19, 30, 0).unwrap()
    );
    assert_eq!(symphony.categories(), ["concert", "theatre"]);
}
