//! Locale-aware ordering for navigation listings.
//!
//! Listing order groups documents for navigation, so it must match native
//! collation for the authoring language rather than byte order. The collator
//! is built once; construction failure falls back to plain string ordering.

use std::cmp::Ordering;
use std::sync::LazyLock;

use icu::collator::{options::CollatorOptions, Collator, CollatorBorrowed};
use icu::locale::locale;
use tracing::warn;

static COLLATOR: LazyLock<Option<CollatorBorrowed<'static>>> = LazyLock::new(|| {
    match Collator::try_new(locale!("zh").into(), CollatorOptions::default()) {
        Ok(collator) => Some(collator),
        Err(err) => {
            warn!(error = %err, "zh collator unavailable; falling back to byte order");
            None
        }
    }
});

/// Compare two slug keys with Chinese collation.
pub fn compare_slugs(a: &str, b: &str) -> Ordering {
    match COLLATOR.as_ref() {
        Some(collator) => collator.compare(a, b),
        None => a.cmp(b),
    }
}
