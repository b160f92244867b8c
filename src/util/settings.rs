// Copyright (c) 2024 Mike Tsao

//! Structs that hold configuration information about the patch bay. Intended
//! to be serialized.

use crate::{orchestration::TopologyPolicy, prelude::*};
use derivative::Derivative;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunes how proximity turns into routing and how signals sound when they
/// arrive.
#[derive(Clone, Debug, Derivative, Serialize, Deserialize)]
#[derivative(Default, PartialEq)]
#[serde(rename_all = "kebab-case", default)]
pub struct PatchBaySettings {
    /// Radius of a node's interactive handle. It's added to every proximity
    /// threshold as a margin.
    #[derivative(Default(value = "25.0"))]
    grip_radius: f64,

    /// How far an emitter reaches unless it says otherwise.
    #[derivative(Default(value = "100.0"))]
    emitter_range: f64,

    /// `k` in `wet = min(k / distance², 1)`.
    #[derivative(Default(value = "2000.0"))]
    wetness_constant: f64,

    /// What an instrument plays when a signal carries no note.
    #[derivative(Default(value = "Note::C3"))]
    default_note: Note,

    /// How long each triggered note sounds.
    #[derivative(Default(value = "Subdivision::Eighth"))]
    articulation: Subdivision,

    /// How long the visual acknowledgment of a received signal lasts.
    #[derivative(Default(value = "2000"))]
    pulse_duration_ms: u64,

    /// Which routing algorithm decides the topology.
    topology_policy: TopologyPolicy,

    /// When set, pattern emitters derive their seed from this value and their
    /// uid, so a scene generates the same patterns every time.
    pattern_seed: Option<u64>,

    #[serde(skip)]
    #[derivative(PartialEq = "ignore")]
    has_been_saved: bool,
}
impl HasSettings for PatchBaySettings {
    fn has_been_saved(&self) -> bool {
        self.has_been_saved
    }

    fn needs_save(&mut self) {
        self.has_been_saved = false;
    }

    fn mark_clean(&mut self) {
        self.has_been_saved = true;
    }
}
#[allow(missing_docs)]
impl PatchBaySettings {
    /// Parses settings from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        let mut settings: Self = serde_json::from_str(json)?;
        settings.mark_clean();
        Ok(settings)
    }

    /// Reads settings from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json_string(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Writes settings to a JSON file and marks them clean.
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> anyhow::Result<()> {
        std::fs::write(path, self.to_json_string()?)?;
        self.mark_clean();
        Ok(())
    }

    pub fn grip_radius(&self) -> f64 {
        self.grip_radius
    }

    pub fn set_grip_radius(&mut self, grip_radius: f64) {
        if grip_radius != self.grip_radius {
            self.grip_radius = grip_radius;
            self.needs_save();
        }
    }

    pub fn emitter_range(&self) -> f64 {
        self.emitter_range
    }

    pub fn set_emitter_range(&mut self, emitter_range: f64) {
        if emitter_range != self.emitter_range {
            self.emitter_range = emitter_range;
            self.needs_save();
        }
    }

    pub fn wetness_constant(&self) -> f64 {
        self.wetness_constant
    }

    pub fn set_wetness_constant(&mut self, wetness_constant: f64) {
        if wetness_constant != self.wetness_constant {
            self.wetness_constant = wetness_constant;
            self.needs_save();
        }
    }

    pub fn default_note(&self) -> Note {
        self.default_note
    }

    pub fn set_default_note(&mut self, note: Note) {
        if note != self.default_note {
            self.default_note = note;
            self.needs_save();
        }
    }

    pub fn articulation(&self) -> Subdivision {
        self.articulation
    }

    pub fn set_articulation(&mut self, articulation: Subdivision) {
        if articulation != self.articulation {
            self.articulation = articulation;
            self.needs_save();
        }
    }

    pub fn pulse_duration_ms(&self) -> u64 {
        self.pulse_duration_ms
    }

    pub fn topology_policy(&self) -> TopologyPolicy {
        self.topology_policy
    }

    pub fn set_topology_policy(&mut self, policy: TopologyPolicy) {
        if policy != self.topology_policy {
            self.topology_policy = policy;
            self.needs_save();
        }
    }

    pub fn pattern_seed(&self) -> Option<u64> {
        self.pattern_seed
    }

    pub fn set_pattern_seed(&mut self, seed: Option<u64>) {
        if seed != self.pattern_seed {
            self.pattern_seed = seed;
            self.needs_save();
        }
    }

    /// `wet = min(k / distance², 1)`. Coincident nodes are fully wet.
    pub fn wetness_for_distance_squared(&self, distance_squared: f64) -> Normal {
        if distance_squared <= 0.0 {
            Normal::maximum()
        } else {
            Normal::new((self.wetness_constant / distance_squared).min(1.0))
        }
    }
}
