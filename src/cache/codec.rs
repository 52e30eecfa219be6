//! Persisted representation of a whole store.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::cache::CacheItem;
use crate::error::{CacheError, Result};

/// Whole key→item mapping, encoded as one JSON object.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct Snapshot {
    #[serde(rename = "Items", default)]
    pub(crate) items: HashMap<String, CacheItem>,
}

impl Snapshot {
    pub(crate) fn encode(items: &HashMap<String, CacheItem>) -> Result<Vec<u8>> {
        #[derive(Serialize)]
        struct Borrowed<'a> {
            #[serde(rename = "Items")]
            items: &'a HashMap<String, CacheItem>,
        }

        serde_json::to_vec(&Borrowed { items }).map_err(CacheError::Encode)
    }

    pub(crate) fn decode(data: &[u8]) -> Result<HashMap<String, CacheItem>> {
        let snapshot: Snapshot = serde_json::from_slice(data).map_err(CacheError::Decode)?;
        Ok(snapshot.items)
    }
}
