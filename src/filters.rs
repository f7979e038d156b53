use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

/// File name of the durable slot inside the data directory.
pub const FILTER_SLOT: &str = "filter_store.json";

/// Query parameters scoping the launch and Starlink requests.
///
/// Serialized with camelCase keys, the convention the durable slot and the
/// API both use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filters {
    pub rocket_id: String,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
    pub limit: u32,
    pub page: u32,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            rocket_id: String::new(),
            start_year: None,
            end_year: None,
            limit: 100,
            page: 1,
        }
    }
}

/// Partial update for [`Filters`]. Fields left as `None` are untouched.
///
/// The year bounds are doubly optional so a stored `"startYear": null`
/// (clear the bound) is distinguishable from a missing key (keep whatever
/// the record already holds).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterPatch {
    pub rocket_id: Option<String>,
    #[serde(default, deserialize_with = "some_if_present")]
    pub start_year: Option<Option<i32>>,
    #[serde(default, deserialize_with = "some_if_present")]
    pub end_year: Option<Option<i32>>,
    pub limit: Option<u32>,
    pub page: Option<u32>,
}

fn some_if_present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl Filters {
    /// Dumb merge: provided fields overwrite, nothing is validated. A start
    /// year past the end year is accepted as-is and simply matches nothing.
    fn apply(&mut self, patch: FilterPatch) {
        if let Some(rocket_id) = patch.rocket_id {
            self.rocket_id = rocket_id;
        }
        if let Some(start_year) = patch.start_year {
            self.start_year = start_year;
        }
        if let Some(end_year) = patch.end_year {
            self.end_year = end_year;
        }
        if let Some(limit) = patch.limit {
            self.limit = limit;
        }
        if let Some(page) = patch.page {
            self.page = page;
        }
    }
}

/// Owns the current [`Filters`] record and mirrors every mutation to a JSON
/// file, so the last query scope survives restarts.
///
/// Persistence is off until [`FilterStore::init`] has run; after that each
/// mutator serializes the full record, one write per call.
pub struct FilterStore {
    filters: Filters,
    slot: PathBuf,
    write_through: bool,
}

impl FilterStore {
    pub fn new(slot: PathBuf) -> Self {
        Self {
            filters: Filters::default(),
            slot,
            write_through: false,
        }
    }

    /// Restores the record from the durable slot and enables write-through.
    ///
    /// A missing slot keeps the defaults silently; an unreadable or corrupt
    /// slot keeps the defaults with a warning. Never fails the caller.
    pub fn init(&mut self) {
        match fs::read_to_string(&self.slot) {
            Ok(raw) => match serde_json::from_str::<FilterPatch>(&raw) {
                Ok(stored) => self.filters.apply(stored),
                Err(err) => {
                    warn!(slot = %self.slot.display(), %err, "ignoring corrupt filter slot");
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => {
                warn!(slot = %self.slot.display(), %err, "could not read filter slot");
            }
        }
        self.write_through = true;
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    /// Merges `patch` into the record and persists the result.
    pub fn set_filters(&mut self, patch: FilterPatch) {
        self.filters.apply(patch);
        self.persist();
    }

    /// Back to defaults, durably.
    pub fn reset(&mut self) {
        self.filters = Filters::default();
        self.persist();
    }

    fn persist(&self) {
        if !self.write_through {
            return;
        }
        let payload = match serde_json::to_string(&self.filters) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(%err, "could not serialize filters");
                return;
            }
        };
        if let Some(parent) = self.slot.parent() {
            if let Err(err) = fs::create_dir_all(parent) {
                warn!(dir = %parent.display(), %err, "could not create data directory");
                return;
            }
        }
        if let Err(err) = fs::write(&self.slot, payload) {
            warn!(slot = %self.slot.display(), %err, "could not persist filters");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot_in(dir: &tempfile::TempDir) -> PathBuf {
        dir.path().join(FILTER_SLOT)
    }

    #[test]
    fn partial_merge_leaves_other_fields_untouched() {
        let mut filters = Filters {
            rocket_id: "a".into(),
            start_year: Some(2020),
            end_year: Some(2021),
            limit: 100,
            page: 1,
        };

        filters.apply(FilterPatch {
            page: Some(2),
            ..Default::default()
        });

        assert_eq!(
            filters,
            Filters {
                rocket_id: "a".into(),
                start_year: Some(2020),
                end_year: Some(2021),
                limit: 100,
                page: 2,
            }
        );
    }

    #[test]
    fn stored_null_clears_a_year_but_missing_key_keeps_it() {
        let mut filters = Filters {
            start_year: Some(2019),
            end_year: Some(2022),
            ..Filters::default()
        };

        let patch: FilterPatch = serde_json::from_str(r#"{"page":7}"#).unwrap();
        filters.apply(patch);
        assert_eq!(filters.start_year, Some(2019));
        assert_eq!(filters.page, 7);

        let patch: FilterPatch = serde_json::from_str(r#"{"startYear":null}"#).unwrap();
        filters.apply(patch);
        assert_eq!(filters.start_year, None);
        assert_eq!(filters.end_year, Some(2022));
    }

    #[test]
    fn round_trip_survives_a_restart() {
        let dir = tempfile::tempdir().unwrap();

        let mut store = FilterStore::new(slot_in(&dir));
        store.init();
        store.set_filters(FilterPatch {
            rocket_id: Some("falcon9".into()),
            limit: Some(50),
            ..Default::default()
        });
        drop(store);

        let mut store = FilterStore::new(slot_in(&dir));
        store.init();
        assert_eq!(store.filters().rocket_id, "falcon9");
        assert_eq!(store.filters().limit, 50);
        assert_eq!(store.filters().start_year, None);
        assert_eq!(store.filters().end_year, None);
        assert_eq!(store.filters().page, 1);
    }

    #[test]
    fn empty_slot_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();

        let mut store = FilterStore::new(slot_in(&dir));
        store.init();

        assert_eq!(store.filters(), &Filters::default());
        assert!(!slot_in(&dir).exists());
    }

    #[test]
    fn corrupt_slot_keeps_defaults_without_panicking() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(slot_in(&dir), "{not json").unwrap();

        let mut store = FilterStore::new(slot_in(&dir));
        store.init();

        assert_eq!(store.filters(), &Filters::default());
    }

    #[test]
    fn every_mutation_writes_the_full_record() {
        let dir = tempfile::tempdir().unwrap();

        let mut store = FilterStore::new(slot_in(&dir));
        store.init();

        store.set_filters(FilterPatch {
            rocket_id: Some("falconheavy".into()),
            ..Default::default()
        });
        let on_disk: Filters =
            serde_json::from_str(&fs::read_to_string(slot_in(&dir)).unwrap()).unwrap();
        assert_eq!(&on_disk, store.filters());

        store.set_filters(FilterPatch {
            page: Some(3),
            start_year: Some(Some(2018)),
            ..Default::default()
        });
        let on_disk: Filters =
            serde_json::from_str(&fs::read_to_string(slot_in(&dir)).unwrap()).unwrap();
        assert_eq!(&on_disk, store.filters());
        assert_eq!(on_disk.rocket_id, "falconheavy");
        assert_eq!(on_disk.page, 3);
    }

    #[test]
    fn mutations_before_init_do_not_write() {
        let dir = tempfile::tempdir().unwrap();

        let mut store = FilterStore::new(slot_in(&dir));
        store.set_filters(FilterPatch {
            page: Some(9),
            ..Default::default()
        });

        assert_eq!(store.filters().page, 9);
        assert!(!slot_in(&dir).exists());
    }

    #[test]
    fn reset_restores_defaults_and_persists() {
        let dir = tempfile::tempdir().unwrap();

        let mut store = FilterStore::new(slot_in(&dir));
        store.init();
        store.set_filters(FilterPatch {
            rocket_id: Some("starship".into()),
            end_year: Some(Some(2030)),
            ..Default::default()
        });

        store.reset();

        assert_eq!(store.filters(), &Filters::default());
        let on_disk: Filters =
            serde_json::from_str(&fs::read_to_string(slot_in(&dir)).unwrap()).unwrap();
        assert_eq!(on_disk, Filters::default());
    }
}
