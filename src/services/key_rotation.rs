//! Cyclic selection over the configured YouTube API keys.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use secrecy::SecretString;

use crate::errors::IngestError;

pub struct KeyRotator {
    keys: Vec<SecretString>,
    index: AtomicUsize,
}

impl KeyRotator {
    pub fn new(keys: Vec<SecretString>) -> Self {
        Self {
            keys,
            index: AtomicUsize::new(0),
        }
    }

    /// Parses a comma-separated key list, dropping blank entries.
    pub fn from_csv(raw: &str) -> Self {
        Self::new(
            raw.split(',')
                .map(str::trim)
                .filter(|key| !key.is_empty())
                .map(|key| SecretString::new(key.to_string()))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.index.load(Ordering::Acquire)
    }

    pub fn current(&self) -> Result<&SecretString, IngestError> {
        if self.keys.is_empty() {
            return Err(IngestError::Configuration(
                "no YouTube API keys configured".to_string(),
            ));
        }
        Ok(&self.keys[self.current_index() % self.keys.len()])
    }

    /// Advances to the next key, wrapping after the last one.
    pub fn rotate(&self) -> Result<&SecretString, IngestError> {
        let count = self.keys.len();
        if count == 0 {
            return Err(IngestError::Configuration(
                "no YouTube API keys configured".to_string(),
            ));
        }

        let previous = self
            .index
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |index| {
                Some((index + 1) % count)
            })
            .unwrap_or_else(|index| index);
        let next = (previous + 1) % count;

        tracing::warn!(key_index = next, key_count = count, "Switching to API key index: {}", next);
        Ok(&self.keys[next])
    }
}

impl fmt::Debug for KeyRotator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyRotator")
            .field("keys", &self.keys.len())
            .field("index", &self.current_index())
            .finish()
    }
}
