// Copyright (c) 2024 Mike Tsao

use crate::prelude::*;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, IntoStaticStr};

/// A node's routing role.
///
/// A "male" node sends audio and a "female" node receives it. An
/// [NodeKind::Effect] is both. An [NodeKind::Emitter] takes no part in
/// routing at all, though emitting is a capability that an instrument or an
/// effect can carry too (see [Node::emitter]).
#[derive(
    Clone,
    Copy,
    Debug,
    Display,
    EnumIter,
    IntoStaticStr,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum NodeKind {
    /// The root of the routing graph.
    Master,
    #[allow(missing_docs)]
    Instrument,
    #[allow(missing_docs)]
    Effect,
    #[allow(missing_docs)]
    Emitter,
}
impl NodeKind {
    /// Whether this node can send audio downstream.
    pub fn is_male(&self) -> bool {
        matches!(self, NodeKind::Instrument | NodeKind::Effect)
    }

    /// Whether this node can accept audio from upstream.
    pub fn is_female(&self) -> bool {
        matches!(self, NodeKind::Master | NodeKind::Effect)
    }
}

/// Describes the audio-processing unit that the synthesis collaborator
/// should create for a node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChannelKind {
    /// The final output.
    Master,
    #[allow(missing_docs)]
    Synth,
    #[allow(missing_docs)]
    PluckSynth,
    #[allow(missing_docs)]
    BitCrusher {
        /// Bit depth
        bits: u8,
    },
    #[allow(missing_docs)]
    PitchShift {
        /// Transposition in semitones
        semitones: i8,
    },
    #[allow(missing_docs)]
    Chorus,
}

/// One entry in the node registry.
///
/// Topology state lives here but is written only by the topology builder.
/// `connected_to` is the single downstream edge. In the tree policy it's the
/// only edge a node has; in the mesh policy, effects and effect-less
/// instruments use it for their route to master, and `connected_effects`
/// holds an instrument's parallel effect sends.
#[derive(Debug)]
pub struct Node {
    pub(crate) uid: Uid,
    pub(crate) kind: NodeKind,
    pub(crate) position: Point,
    pub(crate) range: f64,
    pub(crate) channel: Option<ChannelUid>,
    pub(crate) emitter: Option<EmitterCore>,

    pub(crate) connected_to: Option<Uid>,
    pub(crate) connected_effects: Vec<Uid>,

    pub(crate) subscriptions: Vec<SubscriptionUid>,
}
impl Node {
    pub(crate) fn new_with(
        uid: Uid,
        kind: NodeKind,
        position: Point,
        range: f64,
        channel: Option<ChannelUid>,
        emitter: Option<EmitterCore>,
    ) -> Self {
        Self {
            uid,
            kind,
            position,
            range,
            channel,
            emitter,
            connected_to: None,
            connected_effects: Vec::default(),
            subscriptions: Vec::default(),
        }
    }

    #[allow(missing_docs)]
    pub fn uid(&self) -> Uid {
        self.uid
    }

    #[allow(missing_docs)]
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    #[allow(missing_docs)]
    pub fn position(&self) -> Point {
        self.position
    }

    /// The emission and sensing radius.
    pub fn range(&self) -> f64 {
        self.range
    }

    #[allow(missing_docs)]
    pub fn channel(&self) -> Option<ChannelUid> {
        self.channel
    }

    #[allow(missing_docs)]
    pub fn emitter(&self) -> Option<&EmitterCore> {
        self.emitter.as_ref()
    }

    #[allow(missing_docs)]
    pub fn is_emitter(&self) -> bool {
        self.emitter.is_some()
    }

    /// The single downstream target, if any.
    pub fn connected_to(&self) -> Option<Uid> {
        self.connected_to
    }

    /// The effects an instrument currently sends to in parallel (mesh
    /// policy only).
    pub fn connected_effects(&self) -> &[Uid] {
        &self.connected_effects
    }

    /// The event-bus subscriptions this node owns.
    pub fn subscriptions(&self) -> &[SubscriptionUid] {
        &self.subscriptions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles() {
        assert!(NodeKind::Instrument.is_male());
        assert!(!NodeKind::Instrument.is_female());
        assert!(NodeKind::Effect.is_male() && NodeKind::Effect.is_female());
        assert!(NodeKind::Master.is_female());
        assert!(!NodeKind::Master.is_male());
        assert!(!NodeKind::Emitter.is_male() && !NodeKind::Emitter.is_female());
    }

    #[test]
    fn kind_names() {
        assert_eq!(NodeKind::Instrument.to_string(), "instrument");
        let s: &'static str = NodeKind::Master.into();
        assert_eq!(s, "master");
    }
}
