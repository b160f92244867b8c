// Copyright (c) 2024 Mike Tsao

//! Common data types used throughout the system.

/// The most commonly used imports.
pub mod prelude {
    pub use super::{
        ChannelUid, MusicalTime, Normal, Note, Point, SampleRate, Signal, SignalBuilder,
        Subdivision, SubscriptionUid, Tempo, TimeRange, TimeSignature, Uid, UidFactory,
    };
}

pub use {
    geometry::{distance, distance_squared, within_range, Point},
    note::Note,
    ranges::{Normal, RangedF64},
    signal::{Signal, SignalBuilder},
    time::{MusicalTime, SampleRate, Subdivision, Tempo, TimeRange, TimeSignature},
    uid::{ChannelUid, IsUid, SubscriptionUid, Uid, UidFactory},
};

mod geometry;
mod note;
mod ranges;
mod signal;
mod time;
mod uid;
