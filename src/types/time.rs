// Copyright (c) 2024 Mike Tsao

//! Handles digital-audio and musical time.

use anyhow::{anyhow, Error};
use core::{
    fmt::{self, Display},
    ops::{Add, Div, Mul, Range},
    str::FromStr,
};
use derivative::Derivative;
use serde::{Deserialize, Serialize};
use strum_macros::{EnumIter, IntoStaticStr};
use synonym::Synonym;

/// Beats per minute.
#[derive(Synonym, Serialize, Deserialize, Derivative)]
#[derivative(Default)]
#[synonym(skip(Default, Display))]
#[serde(rename_all = "kebab-case")]
pub struct Tempo(#[derivative(Default(value = "120.0"))] pub f64);
impl fmt::Display for Tempo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("{:0.2} BPM", self.0))
    }
}
impl Tempo {
    /// Beats per second.
    pub fn bps(&self) -> f64 {
        self.0 / 60.0
    }
}

/// [TimeSignature] represents a music [time
/// signature](https://en.wikipedia.org/wiki/Time_signature).
///
/// The top number of a time signature tells how many beats are in a measure.
/// The bottom number tells the value of a beat. For example, if the bottom
/// number is 4, then a beat is a quarter-note.
#[derive(Clone, Copy, Debug, Derivative, Eq, PartialEq, Serialize, Deserialize)]
#[derivative(Default)]
#[serde(rename_all = "kebab-case")]
pub struct TimeSignature {
    /// The number of beats in a measure.
    #[derivative(Default(value = "4"))]
    pub top: usize,

    /// The value of a beat. Expressed as a reciprocal; for example, if it's 4,
    /// then the beat value is 1/4 or a quarter note.
    #[derivative(Default(value = "4"))]
    pub bottom: usize,
}
impl Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("{}/{}", self.top, self.bottom))
    }
}
impl TimeSignature {
    /// C time = common time = 4/4
    pub const COMMON_TIME: Self = TimeSignature { top: 4, bottom: 4 };

    /// Validates the parts of a time signature.
    pub fn new_with(top: usize, bottom: usize) -> anyhow::Result<Self, Error> {
        if top == 0 {
            Err(anyhow!("Time signature top can't be zero."))
        } else if bottom.is_power_of_two() {
            Ok(Self { top, bottom })
        } else {
            Err(anyhow!("Time signature bottom must be a power of two."))
        }
    }

    /// The length of one measure.
    pub fn duration(&self) -> MusicalTime {
        MusicalTime::new_with_bars(self, 1)
    }
}

/// [MusicalTime] is the universal unit of time. It is in terms of musical
/// beats. A "part" is a sixteenth of a beat, and a "unit" is 1/4096 of a part.
/// Thus, beats are divided into 65,536 units.
///
/// Signals carry a [MusicalTime] as an opaque scheduling token. Only the
/// transport and the emitters do arithmetic on it.
#[derive(Synonym, Serialize, Deserialize)]
#[synonym(skip(Display))]
pub struct MusicalTime(usize);

#[allow(missing_docs)]
impl MusicalTime {
    /// A part is a sixteenth of a beat.
    pub const PARTS_IN_BEAT: usize = 16;
    pub const UNITS_IN_PART: usize = 4096;
    pub const UNITS_IN_BEAT: usize = Self::PARTS_IN_BEAT * Self::UNITS_IN_PART;

    pub const ONE_BEAT: MusicalTime = Self::new_with_beats(1);
    pub const FOUR_FOUR_MEASURE: MusicalTime = Self::new_with_bars(&TimeSignature::COMMON_TIME, 1);

    pub const START: MusicalTime = Self::new_with_units(0);

    pub fn new(
        time_signature: &TimeSignature,
        bars: usize,
        beats: usize,
        parts: usize,
        units: usize,
    ) -> Self {
        MusicalTime(
            MusicalTime::bars_to_units(time_signature, bars)
                + Self::beats_to_units(beats)
                + Self::parts_to_units(parts)
                + units,
        )
    }

    pub fn total_beats(&self) -> usize {
        self.0 / Self::UNITS_IN_BEAT
    }

    pub fn total_parts(&self) -> usize {
        self.0 / Self::UNITS_IN_PART
    }

    /// The part within the current beat.
    pub fn parts(&self) -> usize {
        self.total_parts() % Self::PARTS_IN_BEAT
    }

    pub const fn total_units(&self) -> usize {
        self.0
    }

    pub const fn units(&self) -> usize {
        self.0 % Self::UNITS_IN_PART
    }

    pub const fn bars_to_units(time_signature: &TimeSignature, bars: usize) -> usize {
        Self::beats_to_units(time_signature.top * bars)
    }

    pub const fn beats_to_units(beats: usize) -> usize {
        beats * Self::UNITS_IN_BEAT
    }

    pub const fn parts_to_units(parts: usize) -> usize {
        parts * (Self::UNITS_IN_PART)
    }

    pub const fn new_with_bars(time_signature: &TimeSignature, bars: usize) -> Self {
        Self::new_with_beats(time_signature.top * bars)
    }

    pub const fn new_with_beats(beats: usize) -> Self {
        Self::new_with_units(beats * Self::UNITS_IN_BEAT)
    }

    pub const fn new_with_parts(parts: usize) -> Self {
        Self::new_with_units(parts * Self::UNITS_IN_PART)
    }

    pub const fn new_with_units(units: usize) -> Self {
        Self(units)
    }

    pub fn new_with_frames(tempo: Tempo, sample_rate: SampleRate, frames: usize) -> Self {
        Self::new_with_units(Self::frames_to_units(tempo, sample_rate, frames))
    }

    pub fn frames_to_units(tempo: Tempo, sample_rate: SampleRate, frames: usize) -> usize {
        let elapsed_beats = (frames as f64 / sample_rate.0 as f64) * tempo.bps();
        let elapsed_fractional_units =
            (elapsed_beats.fract() * Self::UNITS_IN_BEAT as f64 + 0.5) as usize;
        Self::beats_to_units(elapsed_beats.floor() as usize) + elapsed_fractional_units
    }

    /// Returns true if the value is zero. This is valid because we sometimes
    /// use [MusicalTime] to represent durations from time zero.
    pub const fn is_empty(&self) -> bool {
        self.0 == MusicalTime::START.0
    }
}
impl Display for MusicalTime {
    // Because MusicalTime doesn't know the time signature, it can't display the
    // number of bars here.
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{:5}.{:02}.{:05}",
            self.total_beats() + 1,
            self.parts(),
            self.units()
        )
    }
}
impl Add<usize> for MusicalTime {
    type Output = Self;

    fn add(self, rhs: usize) -> Self::Output {
        Self(self.0 + rhs)
    }
}
impl Mul<usize> for MusicalTime {
    type Output = Self;

    fn mul(self, rhs: usize) -> Self::Output {
        Self(self.0 * rhs)
    }
}
impl Div<usize> for MusicalTime {
    type Output = Self;

    fn div(self, rhs: usize) -> Self::Output {
        Self(self.0 / rhs)
    }
}

/// A [TimeRange] describes a half-open range of [MusicalTime]. Its principal
/// usage is to determine which time slice an emitter should handle during
/// [Emits::work()](crate::traits::Emits::work).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TimeRange(pub core::ops::Range<MusicalTime>);
impl TimeRange {
    /// Creates a new [TimeRange] with the given absolute start and end.
    pub fn new_with_start_and_end(start: MusicalTime, end: MusicalTime) -> Self {
        Self(start..end)
    }

    /// Creates a new [TimeRange] with the given absolute start and (relative)
    /// duration.
    pub fn new_with_start_and_duration(start: MusicalTime, duration: MusicalTime) -> Self {
        Self(start..(start + duration))
    }

    #[allow(missing_docs)]
    pub fn start(&self) -> MusicalTime {
        self.0.start
    }

    #[allow(missing_docs)]
    pub fn end(&self) -> MusicalTime {
        self.0.end
    }

    #[allow(missing_docs)]
    pub fn contains(&self, item: &MusicalTime) -> bool {
        self.0.contains(item)
    }
}
impl From<Range<MusicalTime>> for TimeRange {
    fn from(value: Range<MusicalTime>) -> Self {
        Self(value)
    }
}

/// Samples per second. Always a positive integer; cannot be zero.
#[derive(Synonym, Serialize, Deserialize, Derivative)]
#[derivative(Default)]
#[synonym(skip(Default))]
#[serde(rename_all = "kebab-case")]
pub struct SampleRate(#[derivative(Default(value = "44100"))] pub usize);
#[allow(missing_docs)]
impl SampleRate {
    pub const DEFAULT_SAMPLE_RATE: usize = 44100;
    pub const DEFAULT: SampleRate = SampleRate::new(Self::DEFAULT_SAMPLE_RATE);

    pub const fn new(value: usize) -> Self {
        if value != 0 {
            Self(value)
        } else {
            Self(Self::DEFAULT_SAMPLE_RATE)
        }
    }
}

/// A musical subdivision in the `"4n"` notation that transports and
/// synthesizers commonly accept. Durations assume that a beat is a quarter
/// note.
#[derive(
    Clone, Copy, Debug, Default, EnumIter, IntoStaticStr, PartialEq, Eq, Serialize, Deserialize,
)]
pub enum Subdivision {
    /// semibreve
    #[serde(rename = "1n")]
    #[strum(serialize = "1n")]
    Whole,
    /// minim
    #[serde(rename = "2n")]
    #[strum(serialize = "2n")]
    Half,
    /// crotchet
    #[default]
    #[serde(rename = "4n")]
    #[strum(serialize = "4n")]
    Quarter,
    /// quaver
    #[serde(rename = "8n")]
    #[strum(serialize = "8n")]
    Eighth,
    /// semiquaver
    #[serde(rename = "16n")]
    #[strum(serialize = "16n")]
    Sixteenth,
    /// demisemiquaver
    #[serde(rename = "32n")]
    #[strum(serialize = "32n")]
    ThirtySecond,
}
impl Subdivision {
    /// How many of this note value fit in a whole note.
    pub const fn divisor(&self) -> usize {
        match self {
            Subdivision::Whole => 1,
            Subdivision::Half => 2,
            Subdivision::Quarter => 4,
            Subdivision::Eighth => 8,
            Subdivision::Sixteenth => 16,
            Subdivision::ThirtySecond => 32,
        }
    }

    /// The length of one note of this value.
    pub fn duration(&self) -> MusicalTime {
        MusicalTime::new_with_parts(MusicalTime::PARTS_IN_BEAT * 4 / self.divisor())
    }
}
impl Display for Subdivision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: &'static str = self.into();
        f.write_str(s)
    }
}
impl FromStr for Subdivision {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1n" => Ok(Subdivision::Whole),
            "2n" => Ok(Subdivision::Half),
            "4n" => Ok(Subdivision::Quarter),
            "8n" => Ok(Subdivision::Eighth),
            "16n" => Ok(Subdivision::Sixteenth),
            "32n" => Ok(Subdivision::ThirtySecond),
            _ => Err(anyhow!("unrecognized subdivision {s:?}")),
        }
    }
}
