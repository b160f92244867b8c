// Copyright (c) 2024 Mike Tsao

//! Collaborators that record what the patch bay asks of them. Useful in tests
//! and for debugging a host integration.

use crate::prelude::*;
use std::sync::{Arc, RwLock};

/// One call to [Synthesizes].
#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs)]
pub enum SynthesizerCall {
    CreateChannel {
        kind: ChannelKind,
        channel: Option<ChannelUid>,
    },
    DisposeChannel(ChannelUid),
    Connect(ChannelUid, ChannelUid),
    Disconnect(ChannelUid, Option<ChannelUid>),
    TriggerAttackRelease {
        channel: ChannelUid,
        note: Note,
        duration: Subdivision,
        time: MusicalTime,
        velocity: Normal,
    },
    SetWet(ChannelUid, Normal),
}

/// What a [RecordingSynthesizer] has seen, plus the wiring it would have
/// now.
#[derive(Debug, Default)]
pub struct SynthesizerLog {
    /// Every call in order.
    pub calls: Vec<SynthesizerCall>,
    /// Channels created and not yet disposed.
    pub live_channels: Vec<ChannelUid>,
    /// Current `(src, dst)` routes.
    pub connections: Vec<(ChannelUid, ChannelUid)>,
}
impl SynthesizerLog {
    /// How many times `src` was connected to `dst`.
    pub fn connect_count(&self, src: ChannelUid, dst: ChannelUid) -> usize {
        self.calls
            .iter()
            .filter(|c| **c == SynthesizerCall::Connect(src, dst))
            .count()
    }

    /// Every note played on `channel`, with its velocity.
    pub fn notes_on(&self, channel: ChannelUid) -> Vec<(Note, Normal)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                SynthesizerCall::TriggerAttackRelease {
                    channel: ch,
                    note,
                    velocity,
                    ..
                } if *ch == channel => Some((*note, *velocity)),
                _ => None,
            })
            .collect()
    }

    /// The most recent wet value sent to `channel`.
    pub fn last_wet(&self, channel: ChannelUid) -> Option<Normal> {
        self.calls.iter().rev().find_map(|c| match c {
            SynthesizerCall::SetWet(ch, wet) if *ch == channel => Some(*wet),
            _ => None,
        })
    }

    /// Whether any live route starts or ends at `channel`.
    pub fn is_wired(&self, channel: ChannelUid) -> bool {
        self.connections
            .iter()
            .any(|(src, dst)| *src == channel || *dst == channel)
    }
}

/// A [Synthesizes] that makes no sound and writes everything down.
#[derive(Debug, Default)]
pub struct RecordingSynthesizer {
    uid_factory: UidFactory<ChannelUid>,
    withheld: Vec<ChannelKind>,
    tracker: Arc<RwLock<SynthesizerLog>>,
}
impl RecordingSynthesizer {
    #[allow(missing_docs)]
    pub fn new_with(tracker: Arc<RwLock<SynthesizerLog>>) -> Self {
        Self {
            tracker,
            ..Default::default()
        }
    }

    /// Makes [Synthesizes::create_channel()] return [None] for `kind`, as an
    /// engine would before it has finished loading.
    pub fn withholding(mut self, kind: ChannelKind) -> Self {
        self.withheld.push(kind);
        self
    }

    fn record(&self, f: impl FnOnce(&mut SynthesizerLog)) {
        if let Ok(mut log) = self.tracker.write() {
            f(&mut *log);
        }
    }
}
impl Synthesizes for RecordingSynthesizer {
    fn create_channel(&mut self, kind: &ChannelKind) -> Option<ChannelUid> {
        let channel = if self.withheld.contains(kind) {
            None
        } else {
            Some(self.uid_factory.mint_next())
        };
        self.record(|log| {
            log.calls.push(SynthesizerCall::CreateChannel {
                kind: kind.clone(),
                channel,
            });
            log.live_channels.extend(channel);
        });
        channel
    }

    fn dispose_channel(&mut self, channel: ChannelUid) {
        self.record(|log| {
            log.calls.push(SynthesizerCall::DisposeChannel(channel));
            log.live_channels.retain(|c| *c != channel);
            log.connections
                .retain(|(src, dst)| *src != channel && *dst != channel);
        });
    }

    fn connect(&mut self, src: ChannelUid, dst: ChannelUid) {
        self.record(|log| {
            log.calls.push(SynthesizerCall::Connect(src, dst));
            if !log.connections.contains(&(src, dst)) {
                log.connections.push((src, dst));
            }
        });
    }

    fn disconnect(&mut self, src: ChannelUid, dst: Option<ChannelUid>) {
        self.record(|log| {
            log.calls.push(SynthesizerCall::Disconnect(src, dst));
            log.connections
                .retain(|(s, d)| !(*s == src && dst.map_or(true, |dst| *d == dst)));
        });
    }

    fn trigger_attack_release(
        &mut self,
        channel: ChannelUid,
        note: Note,
        duration: Subdivision,
        time: MusicalTime,
        velocity: Normal,
    ) {
        self.record(|log| {
            log.calls.push(SynthesizerCall::TriggerAttackRelease {
                channel,
                note,
                duration,
                time,
                velocity,
            })
        });
    }

    fn set_wet(&mut self, channel: ChannelUid, wet: Normal) {
        self.record(|log| log.calls.push(SynthesizerCall::SetWet(channel, wet)));
    }
}

/// One call to [Renders].
#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs)]
pub enum RenderCall {
    DrawNode {
        uid: Uid,
        kind: NodeKind,
        position: Point,
        range: Option<f64>,
    },
    SetPosition(Uid, Point),
    BringToFront(Uid),
    DrawEdge {
        from: Uid,
        to: Uid,
        offset: Point,
    },
    ClearEdge {
        from: Uid,
        to: Uid,
    },
    SpawnPulse {
        uid: Uid,
        duration_ms: u64,
    },
    RemoveNode(Uid),
}

/// A [Renders] that draws nothing and writes everything down.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    tracker: Arc<RwLock<Vec<RenderCall>>>,
}
impl RecordingRenderer {
    #[allow(missing_docs)]
    pub fn new_with(tracker: Arc<RwLock<Vec<RenderCall>>>) -> Self {
        Self { tracker }
    }

    fn record(&self, call: RenderCall) {
        if let Ok(mut tracker) = self.tracker.write() {
            tracker.push(call);
        }
    }
}
impl Renders for RecordingRenderer {
    fn draw_node(&mut self, uid: Uid, kind: NodeKind, position: Point, range: Option<f64>) {
        self.record(RenderCall::DrawNode {
            uid,
            kind,
            position,
            range,
        });
    }

    fn set_position(&mut self, uid: Uid, position: Point) {
        self.record(RenderCall::SetPosition(uid, position));
    }

    fn bring_to_front(&mut self, uid: Uid) {
        self.record(RenderCall::BringToFront(uid));
    }

    fn draw_edge(&mut self, from: Uid, to: Uid, offset: Point) {
        self.record(RenderCall::DrawEdge { from, to, offset });
    }

    fn clear_edge(&mut self, from: Uid, to: Uid) {
        self.record(RenderCall::ClearEdge { from, to });
    }

    fn spawn_pulse(&mut self, uid: Uid, duration_ms: u64) {
        self.record(RenderCall::SpawnPulse { uid, duration_ms });
    }

    fn remove_node(&mut self, uid: Uid) {
        self.record(RenderCall::RemoveNode(uid));
    }
}

/// A patch bay wired to fresh recording collaborators, and the trackers to
/// inspect them with.
pub fn new_recording_patch_bay(
    settings: PatchBaySettings,
) -> (
    PatchBay,
    Arc<RwLock<SynthesizerLog>>,
    Arc<RwLock<Vec<RenderCall>>>,
) {
    let synth_tracker = Arc::new(RwLock::new(SynthesizerLog::default()));
    let render_tracker = Arc::new(RwLock::new(Vec::default()));
    let bay = PatchBay::new_with(
        settings,
        Box::new(RecordingSynthesizer::new_with(Arc::clone(&synth_tracker))),
        Box::new(RecordingRenderer::new_with(Arc::clone(&render_tracker))),
    );
    (bay, synth_tracker, render_tracker)
}
