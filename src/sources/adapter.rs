use crate::error::AdapterError;
use crate::model::RawEventFields;
use futures::future::BoxFuture;

/// One venue or listing site. Implementations own their transport and markup
/// handling; callers only see the raw records.
pub trait SourceAdapter: Send + Sync {
    /// Name used to attribute logs and failures.
    fn name(&self) -> &str;

    /// Resolves to every record the source currently lists, or to nothing at all.
    fn fetch(&self) -> BoxFuture<'_, Result<Vec<RawEventFields>, AdapterError>>;
}
