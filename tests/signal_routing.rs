// Copyright (c) 2024 Mike Tsao

use float_cmp::approx_eq;
use patchbay::{
    prelude::*,
    testing::{new_recording_patch_bay, RenderCall, SynthesizerCall},
};

fn wide_grip() -> PatchBaySettings {
    let mut settings = PatchBaySettings::default();
    settings.set_grip_radius(50.0);
    settings
}

fn channel_of(bay: &PatchBay, uid: Uid) -> ChannelUid {
    bay.node(uid).and_then(|n| n.channel()).unwrap()
}

fn tick() -> Signal {
    Signal::new_with_frequency(MusicalTime::START, Subdivision::Quarter)
}

#[test]
fn strength_falls_off_with_distance() {
    let (mut bay, synth, renders) = new_recording_patch_bay(wide_grip());
    let metronome = bay
        .add_node(
            NodeSpec::metronome(Subdivision::Quarter),
            Point::new(300.0, 300.0),
        )
        .unwrap();
    let near = bay
        .add_node(
            NodeSpec::instrument(ChannelKind::Synth),
            Point::new(380.0, 300.0),
        )
        .unwrap();
    let far = bay
        .add_node(
            NodeSpec::instrument(ChannelKind::PluckSynth),
            Point::new(460.0, 300.0),
        )
        .unwrap();
    let edge = bay
        .add_node(
            NodeSpec::instrument(ChannelKind::Synth),
            Point::new(450.0, 300.0),
        )
        .unwrap();

    assert!(bay.emit(metronome, tick()).is_ok());

    let log = synth.read().unwrap();
    let notes = log.notes_on(channel_of(&bay, near));
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].0, Note::C3, "a signal with no note plays the default");
    assert!(approx_eq!(
        f64,
        notes[0].1 .0,
        70.0 / 150.0,
        epsilon = 0.000001
    ));
    assert!(log.notes_on(channel_of(&bay, far)).is_empty());
    assert!(
        log.notes_on(channel_of(&bay, edge)).is_empty(),
        "exactly at the limit is out of reach"
    );

    let renders = renders.read().unwrap();
    assert!(renders.contains(&RenderCall::SpawnPulse {
        uid: near,
        duration_ms: 2000
    }));
    assert!(!renders.iter().any(|c| matches!(
        c,
        RenderCall::SpawnPulse { uid, .. } if *uid == far || *uid == edge
    )));
}

#[test]
fn notes_and_timing_pass_through() {
    let (mut bay, synth, _) = new_recording_patch_bay(wide_grip());
    let part = bay
        .add_node(
            NodeSpec::metronome(Subdivision::Quarter),
            Point::new(0.0, 0.0),
        )
        .unwrap();
    let instrument = bay
        .add_node(NodeSpec::instrument(ChannelKind::Synth), Point::new(0.0, 0.0))
        .unwrap();

    let when = MusicalTime::new_with_beats(3);
    assert!(bay.emit(part, Signal::new_with_note(when, Note::C4)).is_ok());

    let log = synth.read().unwrap();
    let played: Vec<_> = log
        .calls
        .iter()
        .filter_map(|c| match c {
            SynthesizerCall::TriggerAttackRelease {
                channel,
                note,
                duration,
                time,
                velocity,
            } => Some((*channel, *note, *duration, *time, *velocity)),
            _ => None,
        })
        .collect();
    assert_eq!(
        played,
        vec![(
            channel_of(&bay, instrument),
            Note::C4,
            Subdivision::Eighth,
            when,
            Normal::maximum()
        )]
    );
}

#[test]
fn only_emitters_can_emit() {
    let (mut bay, _, _) = new_recording_patch_bay(PatchBaySettings::default());
    let instrument = bay
        .add_node(NodeSpec::instrument(ChannelKind::Synth), Point::default())
        .unwrap();
    let e = bay.emit(instrument, tick()).unwrap_err();
    assert_eq!(
        e.downcast_ref::<PatchBayError>(),
        Some(&PatchBayError::NotAnEmitter(instrument))
    );

    let e = bay.emit(Uid(999), tick()).unwrap_err();
    assert_eq!(
        e.downcast_ref::<PatchBayError>(),
        Some(&PatchBayError::UnknownNode(Uid(999)))
    );
}

#[test]
fn an_emitting_instrument_does_not_hear_itself() {
    let (mut bay, synth, _) = new_recording_patch_bay(wide_grip());
    let spec = NodeSpecBuilder::default()
        .kind(NodeKind::Instrument)
        .channel(ChannelKind::Synth)
        .emitter(EmitterSpec::Metronome(Subdivision::Half))
        .build()
        .unwrap();
    let source = bay.add_node(spec, Point::new(300.0, 300.0)).unwrap();
    let listener = bay
        .add_node(
            NodeSpec::instrument(ChannelKind::PluckSynth),
            Point::new(330.0, 300.0),
        )
        .unwrap();
    assert!(bay.node(source).unwrap().is_emitter());

    assert!(bay.emit(source, tick()).is_ok());

    let log = synth.read().unwrap();
    assert!(log.notes_on(channel_of(&bay, source)).is_empty());
    assert_eq!(log.notes_on(channel_of(&bay, listener)).len(), 1);
}

#[test]
fn range_override_narrows_reach() {
    let (mut bay, synth, _) = new_recording_patch_bay(PatchBaySettings::default());
    let metronome = bay
        .add_node(
            NodeSpec::metronome(Subdivision::Quarter).with_range(10.0),
            Point::new(0.0, 0.0),
        )
        .unwrap();
    let close = bay
        .add_node(NodeSpec::instrument(ChannelKind::Synth), Point::new(30.0, 0.0))
        .unwrap();
    let beyond = bay
        .add_node(NodeSpec::instrument(ChannelKind::Synth), Point::new(80.0, 0.0))
        .unwrap();
    assert_eq!(bay.node(metronome).unwrap().range(), 10.0);

    assert!(bay.emit(metronome, tick()).is_ok());

    let log = synth.read().unwrap();
    let notes = log.notes_on(channel_of(&bay, close));
    assert_eq!(notes.len(), 1);
    assert!(approx_eq!(f64, notes[0].1 .0, 5.0 / 35.0, epsilon = 0.000001));
    assert!(log.notes_on(channel_of(&bay, beyond)).is_empty());
}

#[test]
fn effects_and_master_only_pulse() {
    let (mut bay, synth, renders) = new_recording_patch_bay(PatchBaySettings::default());
    let master = bay.add_node(NodeSpec::master(), Point::default()).unwrap();
    let chorus = bay
        .add_node(NodeSpec::effect(ChannelKind::Chorus), Point::new(10.0, 0.0))
        .unwrap();
    let before = synth.read().unwrap().calls.len();

    assert!(bay.receive_signal(master, tick()).is_ok());
    assert!(bay.receive_signal(chorus, tick()).is_ok());
    assert!(bay.receive_signal(Uid(999), tick()).is_err());

    assert_eq!(synth.read().unwrap().calls.len(), before);
    let pulses = renders
        .read()
        .unwrap()
        .iter()
        .filter(|c| matches!(c, RenderCall::SpawnPulse { .. }))
        .count();
    assert_eq!(pulses, 2);
}

#[test]
fn listeners_can_watch_signals() {
    let (mut bay, _, _) = new_recording_patch_bay(PatchBaySettings::default());
    let metronome = bay
        .add_node(NodeSpec::metronome(Subdivision::Quarter), Point::default())
        .unwrap();
    let seen = std::rc::Rc::new(std::cell::RefCell::new(Vec::default()));
    let seen_clone = std::rc::Rc::clone(&seen);
    let subscription = bay.subscribe(EventTopic::SignalEmitted, move |_, event| {
        if let PatchBayEvent::SignalEmitted { source, .. } = event {
            seen_clone.borrow_mut().push(*source);
        }
    });

    assert!(bay.emit(metronome, tick()).is_ok());
    bay.unsubscribe(subscription);
    assert!(bay.emit(metronome, tick()).is_ok());

    assert_eq!(*seen.borrow(), vec![metronome]);
}
