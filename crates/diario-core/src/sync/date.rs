//! Currently viewed calendar date.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tokio::sync::watch;

use crate::models::DateKey;

/// Shared handle to the selected date.
///
/// Clones observe the same value. Writers are expected to reload the sync
/// units afterwards; `Dashboard::select_date` does both.
#[derive(Clone)]
pub struct DateSelection {
    selected: Arc<watch::Sender<NaiveDate>>,
}

impl DateSelection {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            selected: Arc::new(watch::channel(date).0),
        }
    }

    /// Selection initialized to the current local date
    pub fn today() -> Self {
        Self::new(Local::now().date_naive())
    }

    pub fn current(&self) -> NaiveDate {
        *self.selected.borrow()
    }

    /// Date key derived from the selection at the point of use
    pub fn date_key(&self) -> DateKey {
        DateKey::new(self.current())
    }

    pub fn select(&self, date: NaiveDate) {
        let previous = self.selected.send_replace(date);
        if previous != date {
            tracing::debug!("Selected date changed from {} to {}", previous, date);
        }
    }

    /// Observe selection changes (for front ends that render a calendar).
    pub fn subscribe(&self) -> watch::Receiver<NaiveDate> {
        self.selected.subscribe()
    }
}

impl Default for DateSelection {
    fn default() -> Self {
        Self::today()
    }
}
