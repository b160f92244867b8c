// Copyright (c) 2024 Mike Tsao

use crate::prelude::*;
use rustc_hash::FxHashMap;

/// Remembers the wet/dry balance last sent to each effect, so that the
/// synthesis collaborator hears about a change only once.
#[derive(Debug, Default, PartialEq)]
pub struct Humidifier {
    uid_to_humidity: FxHashMap<Uid, Normal>,
}
impl Humidifier {
    /// The effect's last known wetness. An effect that has never been wired
    /// is fully wet.
    pub fn get_humidity(&self, uid: &Uid) -> Normal {
        self.uid_to_humidity.get(uid).cloned().unwrap_or_default()
    }

    /// Records the effect's wetness. Returns true if it changed.
    pub fn set_humidity(&mut self, uid: Uid, humidity: Normal) -> bool {
        self.uid_to_humidity.insert(uid, humidity) != Some(humidity)
    }

    /// Forgets a disposed effect.
    pub fn remove(&mut self, uid: &Uid) {
        self.uid_to_humidity.remove(uid);
    }
}
