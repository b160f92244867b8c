// Copyright (c) 2024 Mike Tsao

//! The traits that define the seams between the patch bay and the things it
//! drives: the synthesis engine, the drawing surface, and the emitters that
//! produce signals over time.

use crate::prelude::*;
use core::fmt::Debug;

/// Quick import of all important traits.
pub mod prelude {
    pub use super::{Configurable, Emits, EmissionsFn, HasSettings, Renders, Synthesizes};
}

/// The synthesis collaborator. The patch bay never looks inside a channel. It
/// only creates, wires, triggers, and disposes channels through this trait.
pub trait Synthesizes: Debug {
    /// Asks the engine for a new audio-processing unit. [None] means the
    /// channel isn't available yet; the node is still registered, but no edge
    /// can be wired to or from it.
    fn create_channel(&mut self, kind: &ChannelKind) -> Option<ChannelUid>;

    /// Releases a channel. The engine should drop any wiring that still
    /// touches it.
    fn dispose_channel(&mut self, channel: ChannelUid);

    /// Routes `src`'s output into `dst`.
    fn connect(&mut self, src: ChannelUid, dst: ChannelUid);

    /// Removes the route from `src` to `dst`, or every outgoing route from
    /// `src` if `dst` is [None].
    fn disconnect(&mut self, src: ChannelUid, dst: Option<ChannelUid>);

    /// Plays one note on `channel`.
    fn trigger_attack_release(
        &mut self,
        channel: ChannelUid,
        note: Note,
        duration: Subdivision,
        time: MusicalTime,
        velocity: Normal,
    );

    /// Sets an effect channel's wet/dry balance.
    fn set_wet(&mut self, channel: ChannelUid, wet: Normal);
}

/// The rendering collaborator. Every method has an empty default so that a
/// headless host needs to implement nothing.
#[allow(unused_variables)]
pub trait Renders: Debug {
    /// Draws a node's shape. Emitters also get a ring of radius `range`.
    fn draw_node(&mut self, uid: Uid, kind: NodeKind, position: Point, range: Option<f64>) {}

    /// Moves a node's shape.
    fn set_position(&mut self, uid: Uid, position: Point) {}

    /// Raises a node above its neighbors, usually because it's being dragged.
    fn bring_to_front(&mut self, uid: Uid) {}

    /// Draws (or redraws) the line from `from` to `to`. `offset` is `to`'s
    /// position relative to `from`.
    fn draw_edge(&mut self, from: Uid, to: Uid, offset: Point) {}

    #[allow(missing_docs)]
    fn clear_edge(&mut self, from: Uid, to: Uid) {}

    /// Shows the short-lived acknowledgment that a node received a signal. The
    /// renderer removes it after `duration_ms`.
    fn spawn_pulse(&mut self, uid: Uid, duration_ms: u64) {}

    /// Removes a disposed node's shape.
    fn remove_node(&mut self, uid: Uid) {}
}

/// Passed to [Emits::work()]. Call it once for each signal that fires in the
/// current time range.
pub type EmissionsFn<'a> = dyn FnMut(Signal) + 'a;

/// Something that produces [Signal]s as musical time passes. Modelled as a
/// performance that the transport starts and stops.
#[allow(unused_variables)]
pub trait Emits: Debug {
    /// Sets the range of [MusicalTime] to which the next [Emits::work()]
    /// applies.
    fn update_time_range(&mut self, time_range: &TimeRange) {}

    /// Reports every signal whose time falls in the current range, in time
    /// order.
    fn work(&mut self, emissions_fn: &mut EmissionsFn) {}

    #[allow(missing_docs)]
    fn play(&mut self) {}

    /// Stops the performance. A stopped emitter reports nothing from
    /// [Emits::work()].
    fn stop(&mut self) {}

    #[allow(missing_docs)]
    fn is_performing(&self) -> bool {
        false
    }
}

/// Shared time configuration.
pub trait Configurable {
    #[allow(missing_docs)]
    fn sample_rate(&self) -> SampleRate;
    #[allow(missing_docs)]
    fn update_sample_rate(&mut self, sample_rate: SampleRate);
    #[allow(missing_docs)]
    fn tempo(&self) -> Tempo;
    #[allow(missing_docs)]
    fn update_tempo(&mut self, tempo: Tempo);
    #[allow(missing_docs)]
    fn time_signature(&self) -> TimeSignature;
    #[allow(missing_docs)]
    fn update_time_signature(&mut self, time_signature: TimeSignature);
}

/// Something that keeps track of whether it has unsaved changes.
pub trait HasSettings {
    /// Whether the current state of this struct has been saved to disk.
    fn has_been_saved(&self) -> bool;
    /// Call this whenever the struct changes.
    fn needs_save(&mut self);
    /// Call this after a load() or a save().
    fn mark_clean(&mut self);
}
