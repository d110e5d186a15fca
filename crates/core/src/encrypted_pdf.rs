// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A bounded, in-memory log of encrypted-PDF sightings. The upload path
//! can't index an encrypted PDF, but operators still want to know it was
//! seen; this is cleared on restart rather than persisted, since it's a
//! diagnostic aid rather than durable state.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct EncryptedPdfSighting {
    pub source_uri: String,
    pub seen_at: DateTime<Utc>,
}

pub struct EncryptedPdfLog {
    capacity: usize,
    sightings: Mutex<VecDeque<EncryptedPdfSighting>>,
}

impl EncryptedPdfLog {
    pub fn new(capacity: usize) -> Self {
        Self { capacity, sightings: Mutex::new(VecDeque::with_capacity(capacity)) }
    }

    /// Appends a sighting, evicting the oldest entry once at capacity.
    pub fn record(&self, source_uri: String, seen_at: DateTime<Utc>) {
        let mut sightings = self.sightings.lock();
        if sightings.len() == self.capacity {
            sightings.pop_front();
        }
        sightings.push_back(EncryptedPdfSighting { source_uri, seen_at });
    }

    /// Most recent sightings first.
    pub fn recent(&self) -> Vec<EncryptedPdfSighting> {
        self.sightings.lock().iter().rev().cloned().collect()
    }
}

impl Default for EncryptedPdfLog {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

const DEFAULT_CAPACITY: usize = 200;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_are_returned_most_recent_first() {
        let log = EncryptedPdfLog::new(10);
        log.record("/a.pdf".to_string(), Utc::now());
        log.record("/b.pdf".to_string(), Utc::now());
        let recent = log.recent();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].source_uri, "/b.pdf");
    }

    #[test]
    fn evicts_oldest_once_at_capacity() {
        let log = EncryptedPdfLog::new(2);
        log.record("/a.pdf".to_string(), Utc::now());
        log.record("/b.pdf".to_string(), Utc::now());
        log.record("/c.pdf".to_string(), Utc::now());
        let recent = log.recent();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].source_uri, "/c.pdf");
        assert_eq!(recent[1].source_uri, "/b.pdf");
    }
}
