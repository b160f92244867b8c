// Copyright (c) 2024 Mike Tsao

use crate::{orchestration::PatchBayError, prelude::*};
use anyhow::anyhow;
use derive_builder::Builder;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

/// Names a kind of node in the catalogue, such as a pluck synth or a
/// bit-crusher.
#[derive(
    Clone,
    Copy,
    Debug,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
#[allow(missing_docs)]
pub enum NodeKey {
    Master,
    Synth,
    PluckSynth,
    BitCrusher,
    PitchShift,
    Chorus,
    Metronome,
    Part,
}
impl NodeKey {
    /// Like `str::parse()`, but reports [PatchBayError::UnknownNodeKey].
    pub fn try_from_str(s: &str) -> anyhow::Result<Self> {
        s.parse()
            .map_err(|_| PatchBayError::UnknownNodeKey(s.to_string()).into())
    }
}

/// How a new node's emitter capability should be set up.
#[derive(Clone, Debug, PartialEq)]
pub enum EmitterSpec {
    /// A metronome on the given subdivision.
    Metronome(Subdivision),
    /// A freshly generated random pattern.
    RandomPattern,
    /// Exactly this behavior.
    Fixed(EmitterBehavior),
}

/// Everything the patch bay needs to know to create a node.
#[derive(Builder, Clone, Debug, PartialEq)]
pub struct NodeSpec {
    #[allow(missing_docs)]
    pub kind: NodeKind,

    /// The channel to ask the synthesis collaborator for. Pure emitters have
    /// none.
    #[builder(default, setter(strip_option))]
    pub channel: Option<ChannelKind>,

    #[allow(missing_docs)]
    #[builder(default, setter(strip_option))]
    pub emitter: Option<EmitterSpec>,

    /// Overrides the configured emitter range.
    #[builder(default, setter(strip_option))]
    pub range: Option<f64>,
}
#[allow(missing_docs)]
impl NodeSpec {
    pub fn master() -> Self {
        Self::new_with(NodeKind::Master, Some(ChannelKind::Master), None)
    }

    pub fn instrument(channel: ChannelKind) -> Self {
        Self::new_with(NodeKind::Instrument, Some(channel), None)
    }

    pub fn effect(channel: ChannelKind) -> Self {
        Self::new_with(NodeKind::Effect, Some(channel), None)
    }

    pub fn metronome(interval: Subdivision) -> Self {
        Self::new_with(
            NodeKind::Emitter,
            None,
            Some(EmitterSpec::Metronome(interval)),
        )
    }

    pub fn pattern() -> Self {
        Self::new_with(NodeKind::Emitter, None, Some(EmitterSpec::RandomPattern))
    }

    fn new_with(kind: NodeKind, channel: Option<ChannelKind>, emitter: Option<EmitterSpec>) -> Self {
        Self {
            kind,
            channel,
            emitter,
            range: None,
        }
    }

    /// Returns a copy with the given range.
    pub fn with_range(mut self, range: f64) -> Self {
        self.range = Some(range);
        self
    }
}

/// Produces a [NodeSpec] for a [NodeKey].
pub type NodeFactoryFn = fn() -> NodeSpec;

/// [NodeFactory] is the catalogue of node types that the patch bay can
/// create by name.
#[derive(Debug, Default)]
pub struct NodeFactory {
    specs: FxHashMap<NodeKey, NodeFactoryFn>,
    sorted_keys: Vec<NodeKey>,
}
impl NodeFactory {
    /// A factory that knows every built-in node type.
    pub fn with_built_ins() -> Self {
        let mut factory = Self::default();
        let built_ins: [(NodeKey, NodeFactoryFn); 8] = [
            (NodeKey::Master, NodeSpec::master),
            (NodeKey::Synth, || NodeSpec::instrument(ChannelKind::Synth)),
            (NodeKey::PluckSynth, || {
                NodeSpec::instrument(ChannelKind::PluckSynth)
            }),
            (NodeKey::BitCrusher, || {
                NodeSpec::effect(ChannelKind::BitCrusher { bits: 4 })
            }),
            (NodeKey::PitchShift, || {
                NodeSpec::effect(ChannelKind::PitchShift { semitones: -8 })
            }),
            (NodeKey::Chorus, || NodeSpec::effect(ChannelKind::Chorus)),
            (NodeKey::Metronome, || {
                NodeSpec::metronome(Subdivision::Quarter)
            }),
            (NodeKey::Part, NodeSpec::pattern),
        ];
        for (key, f) in built_ins {
            // Every key in the list is distinct.
            let _ = factory.register(key, f);
        }
        factory
    }

    /// Registers (or fails to re-register) the given key.
    pub fn register(&mut self, key: NodeKey, f: NodeFactoryFn) -> anyhow::Result<()> {
        if self.specs.contains_key(&key) {
            return Err(anyhow!("register({key}): duplicate key"));
        }
        self.specs.insert(key, f);
        self.sorted_keys.push(key);
        self.sorted_keys.sort();
        Ok(())
    }

    /// Returns the spec for `key`, or [None] if nobody registered it.
    pub fn new_spec(&self, key: &NodeKey) -> Option<NodeSpec> {
        self.specs.get(key).map(|f| f())
    }

    /// Every registered key in a stable order.
    pub fn sorted_keys(&self) -> &[NodeKey] {
        &self.sorted_keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn built_ins_cover_every_key() {
        let factory = NodeFactory::with_built_ins();
        assert_eq!(factory.sorted_keys().len(), NodeKey::iter().count());
        for key in NodeKey::iter() {
            assert!(factory.new_spec(&key).is_some(), "{key} is missing");
        }
    }

    #[test]
    fn catalogue_contents() {
        let factory = NodeFactory::with_built_ins();
        let crusher = factory.new_spec(&NodeKey::BitCrusher).unwrap();
        assert_eq!(crusher.kind, NodeKind::Effect);
        assert_eq!(crusher.channel, Some(ChannelKind::BitCrusher { bits: 4 }));

        let shift = factory.new_spec(&NodeKey::PitchShift).unwrap();
        assert_eq!(shift.channel, Some(ChannelKind::PitchShift { semitones: -8 }));

        let metronome = factory.new_spec(&NodeKey::Metronome).unwrap();
        assert_eq!(metronome.kind, NodeKind::Emitter);
        assert!(metronome.channel.is_none());
        assert_eq!(
            metronome.emitter,
            Some(EmitterSpec::Metronome(Subdivision::Quarter))
        );
    }

    #[test]
    fn keys_parse() {
        assert_eq!(NodeKey::try_from_str("pluck-synth").ok(), Some(NodeKey::PluckSynth));
        assert_eq!(NodeKey::BitCrusher.to_string(), "bit-crusher");
        let e = NodeKey::try_from_str("theremin").unwrap_err();
        assert!(matches!(
            e.downcast_ref::<PatchBayError>(),
            Some(PatchBayError::UnknownNodeKey(_))
        ));
    }

    #[test]
    fn duplicate_registration_fails() {
        let mut factory = NodeFactory::with_built_ins();
        assert!(factory.register(NodeKey::Synth, NodeSpec::pattern).is_err());
    }

    #[test]
    fn builder() {
        let spec = NodeSpecBuilder::default()
            .kind(NodeKind::Instrument)
            .channel(ChannelKind::Synth)
            .emitter(EmitterSpec::Metronome(Subdivision::Eighth))
            .build()
            .unwrap();
        assert!(spec.range.is_none());
        assert_eq!(spec.with_range(40.0).range, Some(40.0));
    }
}
