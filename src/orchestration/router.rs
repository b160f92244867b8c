// Copyright (c) 2024 Mike Tsao

//! Delivers emitted signals to the instruments within reach.

use crate::{prelude::*, types::distance};
use log::trace;

/// The distance at which an emitter can no longer be heard. The grip radius
/// widens every emitter's reach by the size of a node's handle.
pub fn reception_limit(range: f64, grip_radius: f64) -> f64 {
    range + grip_radius
}

/// Linear falloff from 1.0 at the emitter to 0.0 at `limit`. A receiver at
/// or beyond the limit gets [None].
pub fn signal_strength(distance: f64, limit: f64) -> Option<Normal> {
    if limit > 0.0 && distance < limit {
        Some(Normal::new((limit - distance) / limit))
    } else {
        None
    }
}

impl PatchBay {
    /// Sends `signal` from `source` to every listener. Fails if `source`
    /// isn't a live emitter.
    pub fn emit(&mut self, source: Uid, signal: Signal) -> anyhow::Result<()> {
        let node = self
            .nodes
            .node(source)
            .ok_or(PatchBayError::UnknownNode(source))?;
        if !node.is_emitter() {
            return Err(PatchBayError::NotAnEmitter(source).into());
        }
        trace!("{source} emits {signal:?}");
        self.publish(PatchBayEvent::SignalEmitted { source, signal });
        Ok(())
    }

    /// The reaction of any node to a signal: a pulse on screen, and for an
    /// instrument, a note.
    pub fn receive_signal(&mut self, uid: Uid, signal: Signal) -> anyhow::Result<()> {
        if !self.nodes.contains(uid) {
            return Err(PatchBayError::UnknownNode(uid).into());
        }
        self.deliver(uid, signal);
        Ok(())
    }

    // Each instrument subscribes this to SignalEmitted when it's added.
    pub(crate) fn on_signal_emitted(&mut self, receiver: Uid, event: &PatchBayEvent) {
        let PatchBayEvent::SignalEmitted { source, signal } = event else {
            return;
        };
        if *source == receiver {
            return;
        }
        let (Some(r), Some(s)) = (self.nodes.node(receiver), self.nodes.node(*source)) else {
            return;
        };
        let limit = reception_limit(s.range(), self.settings.grip_radius());
        if let Some(strength) = signal_strength(distance(&r.position(), &s.position()), limit) {
            self.deliver(receiver, signal.with_strength(strength));
        }
    }

    pub(super) fn deliver(&mut self, uid: Uid, signal: Signal) {
        let Some(node) = self.nodes.node(uid) else {
            return;
        };
        let (kind, channel) = (node.kind(), node.channel());
        trace!("{uid} receives {signal:?}");
        self.renderer
            .spawn_pulse(uid, self.settings.pulse_duration_ms());
        if kind == NodeKind::Instrument {
            if let Some(channel) = channel {
                self.synthesizer.trigger_attack_release(
                    channel,
                    signal.note.unwrap_or(self.settings.default_note()),
                    self.settings.articulation(),
                    signal.time,
                    signal.strength.unwrap_or_default(),
                );
            }
        }
    }
}
