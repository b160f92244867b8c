// Copyright (c) 2024 Mike Tsao

use float_cmp::approx_eq;
use patchbay::{
    prelude::*,
    testing::{new_recording_patch_bay, RecordingRenderer, RecordingSynthesizer, SynthesizerLog},
};
use std::sync::{Arc, RwLock};

fn channel_of(bay: &PatchBay, uid: Uid) -> ChannelUid {
    bay.node(uid).and_then(|n| n.channel()).unwrap()
}

fn pairs(bay: &PatchBay) -> Vec<(Uid, Uid)> {
    bay.edges().iter().map(|e| (e.from, e.to)).collect()
}

fn mesh_settings() -> PatchBaySettings {
    let mut settings = PatchBaySettings::default();
    settings.set_topology_policy(TopologyPolicy::Mesh);
    settings
}

#[test]
fn lone_instrument_connects_to_master() {
    let (mut bay, synth, _) = new_recording_patch_bay(PatchBaySettings::default());
    let master = bay
        .add_node(NodeSpec::master(), Point::new(100.0, 100.0))
        .unwrap();
    let instrument = bay
        .add_node(
            NodeSpec::instrument(ChannelKind::Synth),
            Point::new(150.0, 200.0),
        )
        .unwrap();

    assert_eq!(
        bay.edges(),
        vec![Edge {
            from: instrument,
            to: master,
            wetness: None
        }]
    );
    assert_eq!(bay.node(instrument).unwrap().connected_to(), Some(master));

    let (src, dst) = (channel_of(&bay, instrument), channel_of(&bay, master));
    let log = synth.read().unwrap();
    assert_eq!(log.connect_count(src, dst), 1);
    assert_eq!(log.connections, vec![(src, dst)]);
}

#[test]
fn reconnecting_the_same_pair_is_a_no_op() {
    let (mut bay, synth, _) = new_recording_patch_bay(PatchBaySettings::default());
    let master = bay
        .add_node(NodeSpec::master(), Point::new(100.0, 100.0))
        .unwrap();
    let instrument = bay
        .add_node(
            NodeSpec::instrument(ChannelKind::Synth),
            Point::new(150.0, 200.0),
        )
        .unwrap();
    for x in [160.0, 170.0, 180.0] {
        assert!(bay.move_node(instrument, Point::new(x, 200.0)).is_ok());
    }
    bay.rebuild_topology();

    let (src, dst) = (channel_of(&bay, instrument), channel_of(&bay, master));
    assert_eq!(
        synth.read().unwrap().connect_count(src, dst),
        1,
        "the channel should have been wired exactly once"
    );
}

#[test]
fn effects_extend_the_tree() {
    let (mut bay, synth, _) = new_recording_patch_bay(PatchBaySettings::default());
    let master = bay
        .add_node(NodeSpec::master(), Point::new(100.0, 100.0))
        .unwrap();
    let chorus = bay
        .add_node(NodeSpec::effect(ChannelKind::Chorus), Point::new(200.0, 100.0))
        .unwrap();
    let instrument = bay
        .add_node(
            NodeSpec::instrument(ChannelKind::Synth),
            Point::new(300.0, 100.0),
        )
        .unwrap();

    assert_eq!(pairs(&bay), vec![(chorus, master), (instrument, chorus)]);
    let edges = bay.edges();
    assert!(approx_eq!(
        f64,
        edges[0].wetness.unwrap().0,
        0.2,
        epsilon = 0.000001
    ));
    assert!(edges[1].wetness.is_none(), "instrument edges carry no wetness");
    assert!(approx_eq!(
        f64,
        synth
            .read()
            .unwrap()
            .last_wet(channel_of(&bay, chorus))
            .unwrap()
            .0,
        0.2,
        epsilon = 0.000001
    ));

    // Now closer to master than to the chorus.
    assert!(bay.move_node(instrument, Point::new(100.0, 180.0)).is_ok());
    assert_eq!(pairs(&bay), vec![(chorus, master), (instrument, master)]);

    let log = synth.read().unwrap();
    let (i, c, m) = (
        channel_of(&bay, instrument),
        channel_of(&bay, chorus),
        channel_of(&bay, master),
    );
    assert!(log.connections.contains(&(i, m)));
    assert!(
        !log.connections.contains(&(i, c)),
        "the old edge should have been unwired before the new one"
    );
}

#[test]
fn moving_an_effect_updates_its_wetness() {
    let (mut bay, synth, _) = new_recording_patch_bay(PatchBaySettings::default());
    bay.add_node(NodeSpec::master(), Point::new(0.0, 0.0))
        .unwrap();
    let chorus = bay
        .add_node(NodeSpec::effect(ChannelKind::Chorus), Point::new(20.0, 0.0))
        .unwrap();
    let channel = channel_of(&bay, chorus);
    assert_eq!(
        synth.read().unwrap().last_wet(channel),
        Some(Normal::maximum()),
        "close coupling is fully wet"
    );

    assert!(bay.move_node(chorus, Point::new(200.0, 0.0)).is_ok());
    assert!(approx_eq!(
        f64,
        synth.read().unwrap().last_wet(channel).unwrap().0,
        0.05,
        epsilon = 0.000001
    ));
}

#[test]
fn effect_without_a_channel_is_skipped() {
    let synth = Arc::new(RwLock::new(SynthesizerLog::default()));
    let mut bay = PatchBay::new_with(
        PatchBaySettings::default(),
        Box::new(
            RecordingSynthesizer::new_with(Arc::clone(&synth)).withholding(ChannelKind::Chorus),
        ),
        Box::new(RecordingRenderer::default()),
    );
    let master = bay
        .add_node(NodeSpec::master(), Point::new(100.0, 100.0))
        .unwrap();
    let chorus = bay
        .add_node(NodeSpec::effect(ChannelKind::Chorus), Point::new(200.0, 100.0))
        .unwrap();
    let instrument = bay
        .add_node(
            NodeSpec::instrument(ChannelKind::Synth),
            Point::new(300.0, 100.0),
        )
        .unwrap();

    assert!(bay.node(chorus).unwrap().channel().is_none());
    assert!(bay.node(chorus).unwrap().connected_to().is_none());
    assert_eq!(
        pairs(&bay),
        vec![(instrument, master)],
        "an unconnected effect can't be a target"
    );
}

#[test]
fn no_master_means_no_edges() {
    let (mut bay, _, _) = new_recording_patch_bay(PatchBaySettings::default());
    let instrument = bay
        .add_node(
            NodeSpec::instrument(ChannelKind::Synth),
            Point::new(150.0, 200.0),
        )
        .unwrap();
    assert!(bay.edges().is_empty());

    let master = bay
        .add_node(NodeSpec::master(), Point::new(100.0, 100.0))
        .unwrap();
    assert_eq!(pairs(&bay), vec![(instrument, master)]);
}

#[test]
fn only_one_master() {
    let (mut bay, synth, _) = new_recording_patch_bay(PatchBaySettings::default());
    let master = bay.add_node(NodeSpec::master(), Point::default()).unwrap();
    let channels_before = synth.read().unwrap().live_channels.len();
    let e = bay
        .add_node(NodeSpec::master(), Point::new(5.0, 5.0))
        .unwrap_err();
    assert_eq!(
        e.downcast_ref::<PatchBayError>(),
        Some(&PatchBayError::DuplicateMaster(master))
    );
    assert_eq!(bay.nodes().len(), 1);
    assert_eq!(
        synth.read().unwrap().live_channels.len(),
        channels_before,
        "a rejected node shouldn't leave a channel behind"
    );
}

#[test]
fn mesh_toggles_effect_sends() {
    let (mut bay, synth, _) = new_recording_patch_bay(mesh_settings());
    let master = bay
        .add_node(NodeSpec::master(), Point::new(100.0, 100.0))
        .unwrap();
    let instrument = bay
        .add_node(
            NodeSpec::instrument(ChannelKind::Synth),
            Point::new(300.0, 300.0),
        )
        .unwrap();
    let chorus = bay
        .add_node(NodeSpec::effect(ChannelKind::Chorus), Point::new(600.0, 600.0))
        .unwrap();
    assert_eq!(
        pairs(&bay),
        vec![(instrument, master), (chorus, master)],
        "out of reach, the instrument goes straight to master"
    );

    // Reach is range 100 plus grip 25.
    assert!(bay.move_node(chorus, Point::new(350.0, 300.0)).is_ok());
    assert_eq!(pairs(&bay), vec![(instrument, chorus), (chorus, master)]);
    let edges = bay.edges();
    assert!(approx_eq!(
        f64,
        edges[0].wetness.unwrap().0,
        0.8,
        epsilon = 0.000001
    ));

    let (i, c, m) = (
        channel_of(&bay, instrument),
        channel_of(&bay, chorus),
        channel_of(&bay, master),
    );
    {
        let log = synth.read().unwrap();
        assert!(log.connections.contains(&(i, c)));
        assert!(!log.connections.contains(&(i, m)));
        assert!(approx_eq!(
            f64,
            log.last_wet(c).unwrap().0,
            0.8,
            epsilon = 0.000001
        ));
    }

    // Still in reach: no second connect.
    assert!(bay.move_node(chorus, Point::new(340.0, 300.0)).is_ok());
    assert_eq!(synth.read().unwrap().connect_count(i, c), 1);

    // A second effect in reach fans out in parallel.
    let crusher = bay
        .add_node(
            NodeSpec::effect(ChannelKind::BitCrusher { bits: 4 }),
            Point::new(300.0, 340.0),
        )
        .unwrap();
    assert_eq!(
        bay.node(instrument).unwrap().connected_effects(),
        &[chorus, crusher]
    );
    assert!(bay.node(instrument).unwrap().connected_to().is_none());

    // Walking away drops both sends and falls back to master.
    assert!(bay.move_node(instrument, Point::new(1000.0, 1000.0)).is_ok());
    assert!(bay.node(instrument).unwrap().connected_effects().is_empty());
    assert_eq!(
        pairs(&bay),
        vec![(instrument, master), (chorus, master), (crusher, master)]
    );
    let log = synth.read().unwrap();
    assert!(log.connections.contains(&(i, m)));
    assert!(!log.connections.contains(&(i, c)));
}

#[test]
fn mesh_moves_of_other_kinds_change_nothing() {
    let (mut bay, synth, _) = new_recording_patch_bay(mesh_settings());
    bay.add_node(NodeSpec::master(), Point::new(100.0, 100.0))
        .unwrap();
    bay.add_node(
        NodeSpec::instrument(ChannelKind::Synth),
        Point::new(300.0, 300.0),
    )
    .unwrap();
    let metronome = bay
        .add_node(
            NodeSpec::metronome(Subdivision::Quarter),
            Point::new(0.0, 0.0),
        )
        .unwrap();
    let before = synth.read().unwrap().calls.len();
    assert!(bay.move_node(metronome, Point::new(310.0, 300.0)).is_ok());
    assert_eq!(synth.read().unwrap().calls.len(), before);
}

#[test]
fn switching_policies_rebuilds_from_scratch() {
    let (mut bay, synth, _) = new_recording_patch_bay(PatchBaySettings::default());
    let master = bay
        .add_node(NodeSpec::master(), Point::new(100.0, 100.0))
        .unwrap();
    let chorus = bay
        .add_node(NodeSpec::effect(ChannelKind::Chorus), Point::new(200.0, 100.0))
        .unwrap();
    let instrument = bay
        .add_node(
            NodeSpec::instrument(ChannelKind::Synth),
            Point::new(300.0, 100.0),
        )
        .unwrap();
    assert_eq!(pairs(&bay), vec![(chorus, master), (instrument, chorus)]);

    bay.set_topology_policy(TopologyPolicy::Mesh);
    assert_eq!(bay.settings().topology_policy(), TopologyPolicy::Mesh);
    let edges = bay.edges();
    assert_eq!(pairs(&bay), vec![(chorus, master), (instrument, chorus)]);
    assert!(edges[0].wetness.is_none());
    assert!(approx_eq!(
        f64,
        edges[1].wetness.unwrap().0,
        0.2,
        epsilon = 0.000001
    ));

    // Mesh updates now follow role-specific moves.
    assert!(bay.move_node(instrument, Point::new(900.0, 900.0)).is_ok());
    assert_eq!(pairs(&bay), vec![(chorus, master), (instrument, master)]);

    // From (900, 900) the chorus is a little nearer than master.
    bay.set_topology_policy(TopologyPolicy::Tree);
    assert_eq!(pairs(&bay), vec![(chorus, master), (instrument, chorus)]);
    let log = synth.read().unwrap();
    let i = channel_of(&bay, instrument);
    assert_eq!(
        log.connections.iter().filter(|(src, _)| *src == i).count(),
        1,
        "the instrument should have exactly one live route"
    );
}
