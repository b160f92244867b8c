// Copyright (c) 2024 Mike Tsao

//! Signal sources that fire on musical time. Both cores compute their firing
//! times arithmetically from the requested [TimeRange], so consecutive,
//! non-overlapping ranges never produce the same firing twice.

use crate::prelude::*;
use serde::{Deserialize, Serialize};

/// Fires forever on a fixed [Subdivision], starting at time zero.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MetronomeCore {
    interval: Subdivision,
}
impl MetronomeCore {
    #[allow(missing_docs)]
    pub fn new_with(interval: Subdivision) -> Self {
        Self { interval }
    }

    #[allow(missing_docs)]
    pub fn interval(&self) -> Subdivision {
        self.interval
    }

    fn emit_in(&self, range: &TimeRange, emissions_fn: &mut EmissionsFn) {
        let step = self.interval.duration().total_units();
        if step == 0 {
            return;
        }
        let end = range.end().total_units();
        let mut t = range.start().total_units().div_ceil(step) * step;
        while t < end {
            emissions_fn(Signal::new_with_frequency(
                MusicalTime::new_with_units(t),
                self.interval,
            ));
            match t.checked_add(step) {
                Some(next) => t = next,
                None => break,
            }
        }
    }
}

/// A short looping sequence of `(offset, note)` steps.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PatternCore {
    steps: Vec<(MusicalTime, Note)>,
    loop_length: MusicalTime,
}
impl PatternCore {
    /// How many steps a generated pattern has.
    pub const STEP_COUNT: usize = 6;

    /// Generated notes come from the major pentatonic scale on C.
    pub const PITCH_CLASSES: [u8; 5] = [0, 2, 4, 7, 9];

    /// Generated notes come from these octaves.
    pub const OCTAVES: core::ops::RangeInclusive<i8> = 2..=3;

    /// Generates a random one-bar pattern. Each step lands on one of the
    /// first four quarter notes of the bar, nudged by zero to three
    /// sixteenths.
    pub fn new_with_rng(rng: &mut Rng) -> Self {
        let mut steps: Vec<(MusicalTime, Note)> = (0..Self::STEP_COUNT)
            .map(|_| {
                let quarters = rng.rand_inclusive(0, 3) as usize;
                let sixteenths = rng.rand_inclusive(0, 3) as usize;
                let offset = MusicalTime::new(
                    &TimeSignature::COMMON_TIME,
                    0,
                    quarters,
                    sixteenths * Subdivision::Sixteenth.duration().total_parts(),
                    0,
                );
                let pitch_class =
                    Self::PITCH_CLASSES[rng.rand_range(0..Self::PITCH_CLASSES.len() as u64) as usize];
                let octave = rng.rand_inclusive(
                    *Self::OCTAVES.start() as u64,
                    *Self::OCTAVES.end() as u64,
                ) as i8;
                (offset, Note::new_with(pitch_class, octave))
            })
            .collect();
        steps.sort_by_key(|(offset, _)| *offset);
        Self {
            steps,
            loop_length: MusicalTime::FOUR_FOUR_MEASURE,
        }
    }

    /// Builds a pattern from explicit steps. Offsets at or past
    /// `loop_length` never fire.
    pub fn new_with_steps(mut steps: Vec<(MusicalTime, Note)>, loop_length: MusicalTime) -> Self {
        steps.sort_by_key(|(offset, _)| *offset);
        Self { steps, loop_length }
    }

    #[allow(missing_docs)]
    pub fn steps(&self) -> &[(MusicalTime, Note)] {
        &self.steps
    }

    #[allow(missing_docs)]
    pub fn loop_length(&self) -> MusicalTime {
        self.loop_length
    }

    fn emit_in(&self, range: &TimeRange, emissions_fn: &mut EmissionsFn) {
        let length = self.loop_length.total_units();
        if length == 0 || self.steps.is_empty() {
            return;
        }
        let start = range.start().total_units();
        let end = range.end().total_units();
        let mut cycle = start / length;
        while let Some(base) = cycle.checked_mul(length) {
            if base >= end {
                break;
            }
            for (offset, note) in self.steps.iter() {
                if offset.total_units() >= length {
                    continue;
                }
                let Some(t) = base.checked_add(offset.total_units()) else {
                    continue;
                };
                if t >= start && t < end {
                    emissions_fn(Signal::new_with_note(MusicalTime::new_with_units(t), *note));
                }
            }
            cycle += 1;
        }
    }
}

/// What an emitter does when its time comes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmitterBehavior {
    #[allow(missing_docs)]
    Metronome(MetronomeCore),
    #[allow(missing_docs)]
    Pattern(PatternCore),
}

/// The emitter capability of a node.
#[derive(Debug)]
pub struct EmitterCore {
    behavior: EmitterBehavior,

    e: EmitterEphemerals,
}
#[derive(Debug, Default)]
struct EmitterEphemerals {
    time_range: TimeRange,
    is_performing: bool,
}
impl EmitterCore {
    #[allow(missing_docs)]
    pub fn new_with(behavior: EmitterBehavior) -> Self {
        Self {
            behavior,
            e: Default::default(),
        }
    }

    #[allow(missing_docs)]
    pub fn behavior(&self) -> &EmitterBehavior {
        &self.behavior
    }
}
impl Emits for EmitterCore {
    fn update_time_range(&mut self, time_range: &TimeRange) {
        self.e.time_range = time_range.clone();
    }

    fn work(&mut self, emissions_fn: &mut EmissionsFn) {
        if !self.e.is_performing {
            return;
        }
        match &self.behavior {
            EmitterBehavior::Metronome(core) => core.emit_in(&self.e.time_range, emissions_fn),
            EmitterBehavior::Pattern(core) => core.emit_in(&self.e.time_range, emissions_fn),
        }
    }

    fn play(&mut self) {
        self.e.is_performing = true;
    }

    fn stop(&mut self) {
        self.e.is_performing = false;
    }

    fn is_performing(&self) -> bool {
        self.e.is_performing
    }
}
