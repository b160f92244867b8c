// Copyright (c) 2024 Mike Tsao

use crate::prelude::*;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// [Transport] is the global clock that drives the emitters. It keeps track
/// of the current musical time and how fast it advances.
#[derive(Clone, Debug, Default, Builder, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Transport {
    /// The current global time signature.
    #[builder(default)]
    pub time_signature: TimeSignature,

    /// The current beats per minute.
    #[builder(default)]
    pub tempo: Tempo,

    #[builder(setter(skip))]
    #[serde(skip)]
    e: TransportEphemerals,
}
/// Parts of [Transport] that shouldn't be serialized.
#[derive(Debug, Clone, Default)]
pub struct TransportEphemerals {
    current_time: MusicalTime,

    current_frame: usize,

    sample_rate: SampleRate,

    is_performing: bool,
}

impl PartialEq for Transport {
    fn eq(&self, other: &Self) -> bool {
        self.time_signature == other.time_signature && self.tempo == other.tempo
    }
}
impl Transport {
    /// Advances the clock by the given number of frames. Returns the time range
    /// from the prior time to now.
    ///
    /// A stopped transport doesn't move, but it still reports the range that
    /// it would have covered.
    pub fn advance(&mut self, frames: usize) -> TimeRange {
        // The range can be empty if frames advance faster than MusicalTime
        // units.
        let new_frames = self.e.current_frame + frames;
        let new_time = MusicalTime::new_with_frames(self.tempo, self.e.sample_rate, new_frames);
        let end = if new_time >= self.e.current_time {
            new_time
        } else {
            self.e.current_time
        };
        let range = TimeRange::new_with_start_and_end(self.e.current_time, end);

        if self.e.is_performing {
            self.e.current_frame = new_frames;
            self.e.current_time = new_time;
        }
        range
    }

    #[allow(missing_docs)]
    pub fn current_time(&self) -> MusicalTime {
        self.e.current_time
    }

    #[allow(missing_docs)]
    pub fn is_performing(&self) -> bool {
        self.e.is_performing
    }

    #[allow(missing_docs)]
    pub fn play(&mut self) {
        self.e.is_performing = true;
    }

    /// Stopping when already stopped resets the time to start, which gives
    /// the stop button a convenient dual function.
    pub fn stop(&mut self) {
        if self.e.is_performing {
            self.e.is_performing = false;
        } else {
            self.skip_to_start();
        }
    }

    #[allow(missing_docs)]
    pub fn skip_to_start(&mut self) {
        self.e.current_time = MusicalTime::default();
        self.e.current_frame = Default::default();
    }
}
impl Configurable for Transport {
    fn sample_rate(&self) -> SampleRate {
        self.e.sample_rate
    }

    fn update_sample_rate(&mut self, sample_rate: SampleRate) {
        self.e.sample_rate = sample_rate;
    }

    fn tempo(&self) -> Tempo {
        self.tempo
    }

    fn update_tempo(&mut self, tempo: Tempo) {
        self.tempo = tempo;
    }

    fn time_signature(&self) -> TimeSignature {
        self.time_signature
    }

    fn update_time_signature(&mut self, time_signature: TimeSignature) {
        self.time_signature = time_signature;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advances_only_while_performing() {
        let mut t = Transport::default();
        let range = t.advance(44100);
        assert_eq!(t.current_time(), MusicalTime::START);
        assert_eq!(range.start(), MusicalTime::START);
        assert_eq!(
            range.end(),
            MusicalTime::new_with_beats(2),
            "one second at 120 BPM is two beats"
        );

        t.play();
        let first = t.advance(22050);
        let second = t.advance(22050);
        assert_eq!(first.end(), second.start(), "ranges should be contiguous");
        assert_eq!(t.current_time(), MusicalTime::new_with_beats(2));
    }

    #[test]
    fn double_stop_rewinds() {
        let mut t = TransportBuilder::default()
            .tempo(Tempo(60.0))
            .build()
            .unwrap();
        t.play();
        t.advance(44100);
        assert_eq!(t.current_time(), MusicalTime::ONE_BEAT);
        t.stop();
        assert!(!t.is_performing());
        assert_eq!(t.current_time(), MusicalTime::ONE_BEAT, "stop is a pause");
        t.stop();
        assert_eq!(t.current_time(), MusicalTime::START);
    }

    #[test]
    fn configurable() {
        let mut t = Transport::default();
        t.update_tempo(Tempo(90.0));
        t.update_sample_rate(SampleRate::new(48000));
        assert_eq!(t.tempo(), Tempo(90.0));
        assert_eq!(t.sample_rate(), SampleRate::new(48000));
        assert_eq!(Configurable::time_signature(&t), TimeSignature::COMMON_TIME);
    }
}
