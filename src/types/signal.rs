// Copyright (c) 2024 Mike Tsao

use super::{MusicalTime, Normal, Note, Subdivision};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// A [Signal] is the ephemeral event an emitter sends to nearby receivers. It
/// has no identity and lives only for one propagation pass.
///
/// `time` is a scheduling token handed through to the synthesis collaborator.
/// Nothing in routing interprets it.
#[derive(Clone, Copy, Debug, Default, Builder, PartialEq, Serialize, Deserialize)]
#[builder(default)]
#[serde(rename_all = "kebab-case")]
pub struct Signal {
    #[allow(missing_docs)]
    pub time: MusicalTime,

    /// The note a pattern emitter asks for.
    #[builder(setter(strip_option))]
    pub note: Option<Note>,

    /// The subdivision a metronome fires on.
    #[builder(setter(strip_option))]
    pub frequency: Option<Subdivision>,

    /// Set by the receiver from its distance to the emitter.
    #[builder(setter(strip_option))]
    pub strength: Option<Normal>,
}
impl Signal {
    #[allow(missing_docs)]
    pub fn new_with_note(time: MusicalTime, note: Note) -> Self {
        Self {
            time,
            note: Some(note),
            ..Default::default()
        }
    }

    #[allow(missing_docs)]
    pub fn new_with_frequency(time: MusicalTime, frequency: Subdivision) -> Self {
        Self {
            time,
            frequency: Some(frequency),
            ..Default::default()
        }
    }

    /// Returns a copy of this signal with `strength` merged in.
    pub fn with_strength(&self, strength: Normal) -> Self {
        Self {
            strength: Some(strength),
            ..*self
        }
    }
}
