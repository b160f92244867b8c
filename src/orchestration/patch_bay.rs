// Copyright (c) 2024 Mike Tsao

use super::{topology, EventBus, Humidifier, NodeRepository, TopologyBuilder};
use crate::prelude::*;
use log::debug;

/// [PatchBay] is the spatial patch bay. It owns the node registry and the
/// event bus, keeps the routing graph in step with node positions, and sends
/// signals from emitters to the instruments around them.
///
/// All work happens synchronously on the caller's turn.
#[derive(Debug)]
pub struct PatchBay {
    pub(super) settings: PatchBaySettings,
    pub(super) nodes: NodeRepository,
    bus: EventBus<PatchBay>,
    humidifier: Humidifier,
    transport: Transport,
    factory: NodeFactory,
    pub(super) synthesizer: Box<dyn Synthesizes>,
    pub(super) renderer: Box<dyn Renders>,

    topology_subscriptions: Vec<SubscriptionUid>,
    dragging: Option<Uid>,
}
impl HasEventBus for PatchBay {
    fn event_bus(&self) -> &EventBus<Self> {
        &self.bus
    }
}
impl PatchBay {
    /// Creates an empty patch bay that drives the given collaborators.
    pub fn new_with(
        settings: PatchBaySettings,
        synthesizer: Box<dyn Synthesizes>,
        renderer: Box<dyn Renders>,
    ) -> Self {
        let mut r = Self {
            settings,
            nodes: Default::default(),
            bus: Default::default(),
            humidifier: Default::default(),
            transport: Default::default(),
            factory: NodeFactory::with_built_ins(),
            synthesizer,
            renderer,
            topology_subscriptions: Default::default(),
            dragging: None,
        };
        r.subscribe_topology();
        r
    }

    // Subscribed before any node handler, so the graph is current by the time
    // nodes redraw their lines.
    fn subscribe_topology(&mut self) {
        self.topology_subscriptions = match self.settings.topology_policy() {
            TopologyPolicy::Tree => vec![self
                .bus
                .subscribe(EventTopic::NodeMoved, |bay, _| bay.rebuild_topology())],
            TopologyPolicy::Mesh => [EventTopic::InstrumentMoved, EventTopic::EffectMoved]
                .into_iter()
                .map(|topic| {
                    self.bus.subscribe(topic, |bay, event| match event {
                        PatchBayEvent::InstrumentMoved { uid }
                        | PatchBayEvent::EffectMoved { uid } => bay.topology().refresh_mesh(*uid),
                        _ => {}
                    })
                })
                .collect(),
        };
    }

    pub(super) fn topology(&mut self) -> TopologyBuilder<'_> {
        TopologyBuilder {
            nodes: &mut self.nodes,
            humidifier: &mut self.humidifier,
            synthesizer: self.synthesizer.as_mut(),
            renderer: self.renderer.as_mut(),
            settings: &self.settings,
        }
    }

    #[allow(missing_docs)]
    pub fn settings(&self) -> &PatchBaySettings {
        &self.settings
    }

    /// The node registry.
    pub fn nodes(&self) -> &NodeRepository {
        &self.nodes
    }

    #[allow(missing_docs)]
    pub fn node(&self, uid: Uid) -> Option<&Node> {
        self.nodes.node(uid)
    }

    /// The catalogue used by [PatchBay::add_node_by_key()].
    pub fn factory(&self) -> &NodeFactory {
        &self.factory
    }

    #[allow(missing_docs)]
    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    #[allow(missing_docs)]
    pub fn transport_mut(&mut self) -> &mut Transport {
        &mut self.transport
    }

    /// Creates a node, registers it, wires its subscriptions, and brings the
    /// topology up to date.
    pub fn add_node(&mut self, spec: NodeSpec, position: Point) -> anyhow::Result<Uid> {
        if spec.kind == NodeKind::Master {
            if let Some(master) = self.nodes.master() {
                return Err(PatchBayError::DuplicateMaster(master).into());
            }
        }
        let uid = self.nodes.mint_node_uid();
        let range = spec.range.unwrap_or(self.settings.emitter_range());
        let emitter = match spec.emitter {
            Some(emitter_spec) => Some(self.new_emitter(uid, emitter_spec)?),
            None => None,
        };
        let channel = spec
            .channel
            .as_ref()
            .and_then(|kind| self.synthesizer.create_channel(kind));
        let node = Node::new_with(uid, spec.kind, position, range, channel, emitter);
        let has_ring = node.is_emitter();
        if let Err(e) = self.nodes.add_node(node) {
            if let Some(channel) = channel {
                self.synthesizer.dispose_channel(channel);
            }
            return Err(e);
        }

        let mut subscriptions = vec![self
            .bus
            .subscribe(EventTopic::NodeMoved, move |bay, event| {
                if let PatchBayEvent::NodeMoved { uid: moved } = event {
                    bay.topology().refresh_edges_of(uid, *moved);
                }
            })];
        if spec.kind == NodeKind::Instrument {
            subscriptions.push(
                self.bus
                    .subscribe(EventTopic::SignalEmitted, move |bay, event| {
                        bay.on_signal_emitted(uid, event)
                    }),
            );
        }
        if let Some(node) = self.nodes.node_mut(uid) {
            node.subscriptions = subscriptions;
        }

        self.renderer
            .draw_node(uid, spec.kind, position, has_ring.then_some(range));
        debug!("added {} node {uid} at {position}", spec.kind);
        self.rebuild_topology();
        Ok(uid)
    }

    /// Like [PatchBay::add_node()], but looks the node up in the catalogue.
    pub fn add_node_by_key(&mut self, key: NodeKey, position: Point) -> anyhow::Result<Uid> {
        let spec = self
            .factory
            .new_spec(&key)
            .ok_or_else(|| PatchBayError::UnknownNodeKey(key.to_string()))?;
        self.add_node(spec, position)
    }

    fn new_emitter(&self, uid: Uid, spec: EmitterSpec) -> anyhow::Result<EmitterCore> {
        let behavior = match spec {
            EmitterSpec::Metronome(interval) => {
                EmitterBehavior::Metronome(MetronomeCore::new_with(interval))
            }
            EmitterSpec::RandomPattern => {
                let mut rng = match self.settings.pattern_seed() {
                    Some(seed) => Rng::new_with_seed(seed as u128 + uid.0 as u128),
                    None => Rng::new_from_entropy()?,
                };
                EmitterBehavior::Pattern(PatternCore::new_with_rng(&mut rng))
            }
            EmitterSpec::Fixed(behavior) => behavior,
        };
        let mut emitter = EmitterCore::new_with(behavior);
        if self.transport.is_performing() {
            emitter.play();
        }
        Ok(emitter)
    }

    /// Writes a node's new position and announces the move. Every node
    /// kind publishes [PatchBayEvent::NodeMoved]; instruments and effects
    /// follow it with their role-specific event.
    pub fn move_node(&mut self, uid: Uid, position: Point) -> anyhow::Result<()> {
        let node = self
            .nodes
            .node_mut(uid)
            .ok_or(PatchBayError::UnknownNode(uid))?;
        node.position = position;
        let kind = node.kind();
        self.renderer.set_position(uid, position);
        self.publish(PatchBayEvent::NodeMoved { uid });
        match kind {
            NodeKind::Instrument => self.publish(PatchBayEvent::InstrumentMoved { uid }),
            NodeKind::Effect => self.publish(PatchBayEvent::EffectMoved { uid }),
            NodeKind::Master | NodeKind::Emitter => {}
        }
        Ok(())
    }

    /// The renderer reports that the user grabbed a node.
    pub fn drag_start(&mut self, uid: Uid) -> anyhow::Result<()> {
        if !self.nodes.contains(uid) {
            return Err(PatchBayError::UnknownNode(uid).into());
        }
        self.renderer.bring_to_front(uid);
        self.dragging = Some(uid);
        Ok(())
    }

    /// The renderer reports a drag frame.
    pub fn drag_move(&mut self, uid: Uid, position: Point) -> anyhow::Result<()> {
        self.move_node(uid, position)
    }

    /// The renderer reports that the user let go.
    pub fn drag_end(&mut self, uid: Uid) {
        if self.dragging == Some(uid) {
            self.dragging = None;
        }
    }

    /// The node currently being dragged, if any.
    pub fn dragging(&self) -> Option<Uid> {
        self.dragging
    }

    /// Removes a node and everything that refers to it: its subscriptions,
    /// its emitter's performance, every edge in or out, and its channel.
    /// Disposing a node that's already gone does nothing.
    pub fn dispose_node(&mut self, uid: Uid) {
        let Some(node) = self.nodes.node_mut(uid) else {
            return;
        };
        let subscriptions = std::mem::take(&mut node.subscriptions);
        if let Some(emitter) = node.emitter.as_mut() {
            emitter.stop();
        }
        for subscription in subscriptions {
            self.bus.unsubscribe(subscription);
        }
        self.topology().detach(uid);
        if let Ok(node) = self.nodes.remove_node(uid) {
            if let Some(channel) = node.channel() {
                self.synthesizer.dispose_channel(channel);
            }
        }
        self.humidifier.remove(&uid);
        if self.dragging == Some(uid) {
            self.dragging = None;
        }
        self.renderer.remove_node(uid);
        debug!("disposed node {uid}");
        self.publish(PatchBayEvent::NodeDisposed { uid });
        self.rebuild_topology();
    }

    /// Recomputes the routing graph under the current policy.
    pub fn rebuild_topology(&mut self) {
        self.topology().rebuild();
    }

    /// Switches routing algorithms. The old graph is torn down and the new
    /// one built from scratch.
    pub fn set_topology_policy(&mut self, policy: TopologyPolicy) {
        if policy == self.settings.topology_policy() {
            return;
        }
        self.topology().clear();
        for subscription in std::mem::take(&mut self.topology_subscriptions) {
            self.bus.unsubscribe(subscription);
        }
        self.settings.set_topology_policy(policy);
        self.subscribe_topology();
        debug!("topology policy is now {policy:?}");
        self.rebuild_topology();
    }

    /// The current routing edges.
    pub fn edges(&self) -> Vec<Edge> {
        topology::edges(&self.nodes, &self.settings)
    }

    /// Adds an outside listener to the bus.
    pub fn subscribe(
        &mut self,
        topic: EventTopic,
        handler: impl Fn(&mut PatchBay, &PatchBayEvent) + 'static,
    ) -> SubscriptionUid {
        self.bus.subscribe(topic, handler)
    }

    /// Removes a listener. Removing one twice is harmless.
    pub fn unsubscribe(&mut self, uid: SubscriptionUid) {
        self.bus.unsubscribe(uid);
    }

    /// Starts the transport and every emitter.
    pub fn play(&mut self) {
        self.transport.play();
        for uid in self.nodes.uids().to_vec() {
            if let Some(emitter) = self.nodes.node_mut(uid).and_then(|n| n.emitter.as_mut()) {
                emitter.play();
            }
        }
    }

    /// Stops the transport and every emitter. Stopping twice rewinds.
    pub fn stop(&mut self) {
        self.transport.stop();
        for uid in self.nodes.uids().to_vec() {
            if let Some(emitter) = self.nodes.node_mut(uid).and_then(|n| n.emitter.as_mut()) {
                emitter.stop();
            }
        }
    }

    /// Moves the transport forward by `frames` and performs whatever fires
    /// in that span.
    pub fn advance(&mut self, frames: usize) -> TimeRange {
        let range = self.transport.advance(frames);
        if self.transport.is_performing() {
            self.perform(&range);
        }
        range
    }

    /// Fires every emitter's signals in `range`, earliest first. Firings at
    /// the same time go in registry order. Each firing is its own turn: an
    /// emitter first pulses itself, then the signal goes out to listeners.
    pub fn perform(&mut self, range: &TimeRange) {
        let mut firings: Vec<(Uid, Signal)> = Vec::default();
        for uid in self.nodes.uids().to_vec() {
            if let Some(emitter) = self.nodes.node_mut(uid).and_then(|n| n.emitter.as_mut()) {
                emitter.update_time_range(range);
                emitter.work(&mut |signal| firings.push((uid, signal)));
            }
        }
        firings.sort_by_key(|(_, signal)| signal.time);

        for (uid, signal) in firings {
            // An earlier turn may have disposed this emitter.
            if !self.nodes.node(uid).is_some_and(|n| n.is_emitter()) {
                continue;
            }
            self.deliver(uid, signal);
            self.publish(PatchBayEvent::SignalEmitted {
                source: uid,
                signal,
            });
        }
    }

    /// Lays out a sample scene: a master, two
    /// instruments, three effects, two metronomes, and two random parts.
    pub fn build_demo_scene(&mut self) -> anyhow::Result<Vec<Uid>> {
        let layout = [
            (NodeSpec::master(), (100.0, 100.0)),
            (NodeSpec::instrument(ChannelKind::Synth), (150.0, 200.0)),
            (NodeSpec::instrument(ChannelKind::PluckSynth), (200.0, 100.0)),
            (NodeSpec::effect(ChannelKind::Chorus), (410.0, 350.0)),
            (
                NodeSpec::effect(ChannelKind::PitchShift { semitones: -8 }),
                (500.0, 350.0),
            ),
            (
                NodeSpec::effect(ChannelKind::BitCrusher { bits: 4 }),
                (350.0, 350.0),
            ),
            (NodeSpec::metronome(Subdivision::Quarter), (300.0, 300.0)),
            (NodeSpec::metronome(Subdivision::Half), (600.0, 300.0)),
            (NodeSpec::pattern(), (600.0, 100.0)),
            (NodeSpec::pattern(), (500.0, 100.0)),
        ];
        layout
            .into_iter()
            .map(|(spec, position)| self.add_node(spec, position.into()))
            .collect()
    }
}
