// Copyright (c) 2024 Mike Tsao

use anyhow::{anyhow, Error};
use core::{fmt::Display, str::FromStr};
use serde::{Deserialize, Serialize};

/// A pitch, stored as a MIDI key number.
///
/// There are two different mappings of piano notes to MIDI numbers. They both
/// agree that MIDI note 0 is a C, but they otherwise differ by an octave. We
/// use C4 = 60, so the lowest octave is octave -1.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct Note(pub u8);
impl Note {
    const NAMES: [&'static str; 12] = [
        "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
    ];

    /// C3, the note an instrument plays when a signal doesn't name one.
    pub const C3: Note = Note(48);
    /// Middle C.
    pub const C4: Note = Note(60);

    /// Builds a note from a semitone offset above C (0..12) and an octave
    /// number. Out-of-range results saturate at the ends of the MIDI range.
    pub fn new_with(pitch_class: u8, octave: i8) -> Self {
        let value = (octave as i16 + 1) * 12 + (pitch_class % 12) as i16;
        Self(value.clamp(0, 127) as u8)
    }

    /// Semitones above the C that starts this note's octave.
    pub fn pitch_class(&self) -> u8 {
        self.0 % 12
    }

    #[allow(missing_docs)]
    pub fn octave(&self) -> i8 {
        (self.0 / 12) as i8 - 1
    }

    /// The [scientific pitch notation](https://en.wikipedia.org/wiki/Scientific_pitch_notation) name, such as "C#3".
    pub fn note_name(&self) -> String {
        format!(
            "{}{}",
            Self::NAMES[self.pitch_class() as usize],
            self.octave()
        )
    }
}
impl Display for Note {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.note_name())
    }
}
impl FromStr for Note {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let mut chars = s.chars();
        let pitch_class: i16 = match chars.next().map(|c| c.to_ascii_uppercase()) {
            Some('C') => 0,
            Some('D') => 2,
            Some('E') => 4,
            Some('F') => 5,
            Some('G') => 7,
            Some('A') => 9,
            Some('B') => 11,
            _ => return Err(anyhow!("{s:?} doesn't start with a note letter")),
        };
        let rest = chars.as_str();
        let (accidental, octave) = if let Some(octave) = rest.strip_prefix('#') {
            (1, octave)
        } else if let Some(octave) = rest.strip_prefix('b') {
            (-1, octave)
        } else {
            (0, rest)
        };
        let octave: i16 = octave
            .parse()
            .map_err(|_| anyhow!("{s:?} doesn't end with an octave number"))?;
        let value = octave
            .checked_add(1)
            .and_then(|o| o.checked_mul(12))
            .and_then(|v| v.checked_add(pitch_class + accidental));
        match value {
            Some(value) if (0..=127).contains(&value) => Ok(Note(value as u8)),
            _ => Err(anyhow!("{s:?} is outside the MIDI note range")),
        }
    }
}

impl TryFrom<String> for Note {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
impl From<Note> for String {
    fn from(value: Note) -> Self {
        value.note_name()
    }
}
