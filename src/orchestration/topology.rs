// Copyright (c) 2024 Mike Tsao

use super::{Humidifier, NodeRepository};
use crate::{
    prelude::*,
    types::{distance_squared, within_range},
};
use log::debug;
use serde::{Deserialize, Serialize};

/// Which algorithm turns positions into routing edges.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TopologyPolicy {
    /// Every move rebuilds a single tree rooted at master. Each male node
    /// has at most one downstream edge.
    #[default]
    Tree,
    /// Each instrument or effect move toggles the instrument→effect sends
    /// near it. An instrument can feed several effects in parallel.
    Mesh,
}

/// A directed routing edge, as reported by
/// [PatchBay::edges()](crate::orchestration::PatchBay::edges).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Edge {
    /// The sender.
    pub from: Uid,
    /// The receiver.
    pub to: Uid,
    /// The wet/dry balance that the edge's length implies, if the edge
    /// carries one.
    pub wetness: Option<Normal>,
}

/// Applies one of the [TopologyPolicy] algorithms to the registry, and
/// issues the matching channel and drawing calls.
///
/// This is the only code that writes a node's topology state.
pub struct TopologyBuilder<'a> {
    pub(crate) nodes: &'a mut NodeRepository,
    pub(crate) humidifier: &'a mut Humidifier,
    pub(crate) synthesizer: &'a mut dyn Synthesizes,
    pub(crate) renderer: &'a mut dyn Renders,
    pub(crate) settings: &'a PatchBaySettings,
}
impl<'a> TopologyBuilder<'a> {
    /// Recomputes the whole graph under the configured policy.
    pub fn rebuild(&mut self) {
        match self.settings.topology_policy() {
            TopologyPolicy::Tree => self.rebuild_tree(),
            TopologyPolicy::Mesh => self.rebuild_mesh(),
        }
    }

    /// Greedy tree build. Males are visited in order of their distance to
    /// master, and each connects to the nearest female that's already part of
    /// the tree. A connected effect then becomes a candidate for later males.
    pub fn rebuild_tree(&mut self) {
        let Some(master) = self.nodes.master() else {
            debug!("no master; dropping all tree edges");
            for uid in self.nodes.uids().to_vec() {
                self.disconnect(uid);
            }
            return;
        };
        let Some(master_position) = self.position(master) else {
            return;
        };

        let mut males: Vec<(Uid, Point)> = self
            .nodes
            .iter()
            .filter(|n| n.kind().is_male())
            .map(|n| (n.uid(), n.position()))
            .collect();
        // sort_by is stable, so ties keep registry order.
        males.sort_by(|a, b| {
            distance_squared(&a.1, &master_position)
                .total_cmp(&distance_squared(&b.1, &master_position))
        });

        let mut females: Vec<(Uid, Point)> = vec![(master, master_position)];
        for (male, position) in males {
            // min_by returns the first of several equal minimums.
            let Some((target, _)) = females.iter().copied().min_by(|a, b| {
                distance_squared(&a.1, &position).total_cmp(&distance_squared(&b.1, &position))
            }) else {
                continue;
            };
            let is_connected = self.connect(male, target);
            let is_female = self
                .nodes
                .node(male)
                .map(|n| n.kind().is_female())
                .unwrap_or_default();
            if is_female && is_connected {
                females.push((male, position));
            }
        }
        debug!("rebuilt tree over {} node(s)", self.nodes.len());
    }

    /// Sets `from`'s single downstream edge to `to`, replacing any other.
    /// Returns whether the edge exists afterward. If either side lacks a
    /// channel, the old edge is still removed but no new one is recorded.
    pub fn connect(&mut self, from: Uid, to: Uid) -> bool {
        let (Some(from_node), Some(to_node)) = (self.nodes.node(from), self.nodes.node(to)) else {
            return false;
        };
        if from_node.connected_to() == Some(to) {
            return true;
        }
        let channels = (from_node.channel(), to_node.channel());
        self.disconnect(from);
        let (Some(src), Some(dst)) = channels else {
            debug!("{from} -> {to}: skipping connect, channel not ready");
            return false;
        };
        self.synthesizer.connect(src, dst);
        if let Some(node) = self.nodes.node_mut(from) {
            node.connected_to = Some(to);
        }
        debug!("connected {from} -> {to}");
        self.refresh_edge(from, to);
        true
    }

    /// Removes `from`'s downstream edge, if it has one.
    pub fn disconnect(&mut self, from: Uid) {
        let Some(node) = self.nodes.node_mut(from) else {
            return;
        };
        let Some(to) = node.connected_to.take() else {
            return;
        };
        let src = node.channel();
        let dst = self.nodes.node(to).and_then(|n| n.channel());
        if let Some(src) = src {
            self.synthesizer.disconnect(src, dst);
        }
        self.renderer.clear_edge(from, to);
        debug!("disconnected {from} -> {to}");
    }

    /// Local mesh update after `moved` changed position. Effects test every
    /// instrument against their own reach, and instruments test every
    /// effect.
    pub fn refresh_mesh(&mut self, moved: Uid) {
        let Some(kind) = self.nodes.node(moved).map(|n| n.kind()) else {
            return;
        };
        match kind {
            NodeKind::Effect => {
                for instrument in self.nodes.uids_where(|n| n.kind() == NodeKind::Instrument) {
                    self.toggle_effect(instrument, moved);
                }
            }
            NodeKind::Instrument => {
                for effect in self.nodes.uids_where(|n| n.kind() == NodeKind::Effect) {
                    self.toggle_effect(moved, effect);
                }
            }
            NodeKind::Master | NodeKind::Emitter => {}
        }
    }

    /// Full mesh evaluation: effects feed master, and each instrument feeds
    /// the effects it's near, or master if there are none.
    pub fn rebuild_mesh(&mut self) {
        for effect in self.nodes.uids_where(|n| n.kind() == NodeKind::Effect) {
            self.route_to_master(effect);
        }
        let effects = self.nodes.uids_where(|n| n.kind() == NodeKind::Effect);
        for instrument in self.nodes.uids_where(|n| n.kind() == NodeKind::Instrument) {
            for effect in effects.iter() {
                self.toggle_effect(instrument, *effect);
            }
            if self.effects_of(instrument).is_empty() {
                self.route_to_master(instrument);
            }
        }
        debug!("rebuilt mesh over {} node(s)", self.nodes.len());
    }

    fn toggle_effect(&mut self, instrument: Uid, effect: Uid) {
        let (Some(i), Some(e)) = (self.nodes.node(instrument), self.nodes.node(effect)) else {
            return;
        };
        let reach = e.range() + self.settings.grip_radius();
        if within_range(&i.position(), &e.position(), reach) {
            self.connect_effect(instrument, effect);
        } else {
            self.disconnect_effect(instrument, effect);
        }
    }

    /// Adds `effect` to `instrument`'s parallel sends. Connecting a pair
    /// that's already connected issues no channel calls; it only refreshes
    /// the line and the wetness.
    pub fn connect_effect(&mut self, instrument: Uid, effect: Uid) -> bool {
        let (Some(i), Some(e)) = (self.nodes.node(instrument), self.nodes.node(effect)) else {
            return false;
        };
        if i.connected_effects().contains(&effect) {
            self.draw_edge(instrument, effect);
            self.update_mesh_wetness(effect);
            return true;
        }
        let (Some(src), Some(dst)) = (i.channel(), e.channel()) else {
            debug!("{instrument} -> {effect}: skipping connect, channel not ready");
            return false;
        };
        let was_dry = i.connected_effects().is_empty();
        if was_dry {
            self.disconnect(instrument);
        }
        self.synthesizer.connect(src, dst);
        if let Some(node) = self.nodes.node_mut(instrument) {
            node.connected_effects.push(effect);
        }
        debug!("connected {instrument} -> effect {effect}");
        self.draw_edge(instrument, effect);
        self.update_mesh_wetness(effect);
        true
    }

    /// Removes `effect` from `instrument`'s sends. An instrument left with
    /// no sends goes straight to master.
    pub fn disconnect_effect(&mut self, instrument: Uid, effect: Uid) {
        if !self.remove_effect_edge(instrument, effect) {
            return;
        }
        self.update_mesh_wetness(effect);
        if self.effects_of(instrument).is_empty() {
            self.route_to_master(instrument);
        }
    }

    fn remove_effect_edge(&mut self, instrument: Uid, effect: Uid) -> bool {
        let Some(node) = self.nodes.node_mut(instrument) else {
            return false;
        };
        let before = node.connected_effects.len();
        node.connected_effects.retain(|e| *e != effect);
        if node.connected_effects.len() == before {
            return false;
        }
        let src = node.channel();
        let dst = self.nodes.node(effect).and_then(|n| n.channel());
        if let (Some(src), Some(dst)) = (src, dst) {
            self.synthesizer.disconnect(src, Some(dst));
        }
        self.renderer.clear_edge(instrument, effect);
        debug!("disconnected {instrument} -> effect {effect}");
        true
    }

    fn route_to_master(&mut self, uid: Uid) {
        match self.nodes.master() {
            Some(master) if master != uid => {
                self.connect(uid, master);
            }
            _ => self.disconnect(uid),
        }
    }

    fn effects_of(&self, instrument: Uid) -> Vec<Uid> {
        self.nodes
            .node(instrument)
            .map(|n| n.connected_effects().to_vec())
            .unwrap_or_default()
    }

    /// Removes every edge that touches `uid`, in either direction, without
    /// rerouting anything. Used before a node leaves the registry.
    pub fn detach(&mut self, uid: Uid) {
        for other in self.nodes.uids().to_vec() {
            if other == uid {
                continue;
            }
            if self.nodes.node(other).and_then(|n| n.connected_to()) == Some(uid) {
                self.disconnect(other);
            }
            self.remove_effect_edge(other, uid);
        }
        self.disconnect(uid);
        for effect in self.effects_of(uid) {
            self.remove_effect_edge(uid, effect);
            self.update_mesh_wetness(effect);
        }
    }

    /// Removes every edge in the graph.
    pub fn clear(&mut self) {
        for uid in self.nodes.uids().to_vec() {
            self.disconnect(uid);
            for effect in self.effects_of(uid) {
                self.remove_effect_edge(uid, effect);
            }
        }
    }

    /// Redraws whichever of `owner`'s outgoing edges `moved` is an end of.
    pub fn refresh_edges_of(&mut self, owner: Uid, moved: Uid) {
        let Some(node) = self.nodes.node(owner) else {
            return;
        };
        let target = node.connected_to();
        let effects = node.connected_effects().to_vec();
        if let Some(to) = target {
            if owner == moved || to == moved {
                self.refresh_edge(owner, to);
            }
        }
        for effect in effects {
            if owner == moved || effect == moved {
                self.draw_edge(owner, effect);
                self.update_mesh_wetness(effect);
            }
        }
    }

    fn refresh_edge(&mut self, from: Uid, to: Uid) {
        self.draw_edge(from, to);
        if self.settings.topology_policy() != TopologyPolicy::Tree {
            return;
        }
        let (Some(f), Some(t)) = (self.nodes.node(from), self.nodes.node(to)) else {
            return;
        };
        if f.kind() == NodeKind::Effect {
            let wetness = self
                .settings
                .wetness_for_distance_squared(distance_squared(&f.position(), &t.position()));
            self.apply_wetness(from, wetness);
        }
    }

    fn draw_edge(&mut self, from: Uid, to: Uid) {
        if let (Some(f), Some(t)) = (self.position(from), self.position(to)) {
            self.renderer.draw_edge(from, to, f.offset_to(&t));
        }
    }

    // An effect channel has one wet control, so it takes the closest coupling
    // among the instruments feeding it.
    fn update_mesh_wetness(&mut self, effect: Uid) {
        let Some(effect_position) = self.position(effect) else {
            return;
        };
        let wetness = self
            .nodes
            .iter()
            .filter(|n| n.connected_effects().contains(&effect))
            .map(|n| {
                self.settings
                    .wetness_for_distance_squared(distance_squared(&n.position(), &effect_position))
            })
            .max_by(|a, b| a.0.total_cmp(&b.0));
        if let Some(wetness) = wetness {
            self.apply_wetness(effect, wetness);
        }
    }

    fn apply_wetness(&mut self, effect: Uid, wetness: Normal) {
        if self.humidifier.set_humidity(effect, wetness) {
            if let Some(channel) = self.nodes.node(effect).and_then(|n| n.channel()) {
                self.synthesizer.set_wet(channel, wetness);
            }
        }
    }

    fn position(&self, uid: Uid) -> Option<Point> {
        self.nodes.node(uid).map(|n| n.position())
    }
}

/// The current edges in registry order. Tree edges out of effects, and every
/// instrument→effect edge in the mesh, carry the wetness their length
/// implies.
pub fn edges(nodes: &NodeRepository, settings: &PatchBaySettings) -> Vec<Edge> {
    let wetness_between = |a: &Point, b: &Point| -> Normal {
        settings.wetness_for_distance_squared(distance_squared(a, b))
    };
    let mut edges = Vec::default();
    for node in nodes.iter() {
        if let Some(to) = node.connected_to().and_then(|to| nodes.node(to)) {
            let wetness = (settings.topology_policy() == TopologyPolicy::Tree
                && node.kind() == NodeKind::Effect)
                .then(|| wetness_between(&node.position(), &to.position()));
            edges.push(Edge {
                from: node.uid(),
                to: to.uid(),
                wetness,
            });
        }
        for effect in node
            .connected_effects()
            .iter()
            .filter_map(|uid| nodes.node(*uid))
        {
            edges.push(Edge {
                from: node.uid(),
                to: effect.uid(),
                wetness: Some(wetness_between(&node.position(), &effect.position())),
            });
        }
    }
    edges
}
