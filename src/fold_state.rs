use crate::session_storage::{SessionStorage, StorageError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Serialized fold state of one TOC widget.
///
/// `items` maps the pre-order index of a fold control to `true` when that
/// branch is collapsed. Expanded branches are never written.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct FoldSnapshot {
    #[serde(default)]
    pub collapsed: bool,
    #[serde(default)]
    pub items: BTreeMap<String, bool>,
}

impl FoldSnapshot {
    pub fn new(tree_collapsed: bool, collapsed_indices: impl IntoIterator<Item = usize>) -> Self {
        Self {
            collapsed: tree_collapsed,
            items: collapsed_indices
                .into_iter()
                .map(|index| (index.to_string(), true))
                .collect(),
        }
    }

    /// Indices recorded as collapsed; non-numeric keys and `false` entries are skipped
    pub fn collapsed_indices(&self) -> Vec<usize> {
        let mut indices: Vec<usize> = self
            .items
            .iter()
            .filter(|(_, collapsed)| **collapsed)
            .filter_map(|(key, _)| key.parse().ok())
            .collect();
        indices.sort_unstable();
        indices
    }

    pub fn to_json(&self) -> Result<String, StorageError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, StorageError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Read the snapshot stored under `key`.
///
/// Never fails: an absent entry, a storage error or unparsable JSON all
/// produce the default (expanded) state.
pub fn load_saved_state(storage: &dyn SessionStorage, key: &str) -> FoldSnapshot {
    let raw = match storage.get_item(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return FoldSnapshot::default(),
        Err(e) => {
            log::warn!("Could not read saved TOC state: {e}");
            return FoldSnapshot::default();
        }
    };

    FoldSnapshot::from_json(&raw).unwrap_or_else(|e| {
        log::warn!("Ignoring corrupt saved TOC state: {e}");
        FoldSnapshot::default()
    })
}

/// Write the snapshot under `key`
pub fn write_state(
    storage: &mut dyn SessionStorage,
    key: &str,
    snapshot: &FoldSnapshot,
) -> Result<(), StorageError> {
    let json = snapshot.to_json()?;
    storage.set_item(key, &json)
}
