// Copyright (c) 2024 Mike Tsao

//! The `headless-scene` demo lays out the demo scene, performs a few bars,
//! and logs what a synthesis engine would have been asked to do. Run with
//! `RUST_LOG=info`. Pass a settings JSON file to override the defaults.

use patchbay::prelude::*;

#[derive(Debug, Default)]
struct LoggingSynthesizer {
    uid_factory: UidFactory<ChannelUid>,
}
impl Synthesizes for LoggingSynthesizer {
    fn create_channel(&mut self, kind: &ChannelKind) -> Option<ChannelUid> {
        let channel = self.uid_factory.mint_next();
        log::info!("create {kind:?} as channel {channel}");
        Some(channel)
    }

    fn dispose_channel(&mut self, channel: ChannelUid) {
        log::info!("dispose channel {channel}");
    }

    fn connect(&mut self, src: ChannelUid, dst: ChannelUid) {
        log::info!("connect {src} -> {dst}");
    }

    fn disconnect(&mut self, src: ChannelUid, dst: Option<ChannelUid>) {
        log::info!("disconnect {src} -> {dst:?}");
    }

    fn trigger_attack_release(
        &mut self,
        channel: ChannelUid,
        note: Note,
        duration: Subdivision,
        time: MusicalTime,
        velocity: Normal,
    ) {
        log::info!("{time}: channel {channel} plays {note} for {duration} at {:.2}", velocity.0);
    }

    fn set_wet(&mut self, channel: ChannelUid, wet: Normal) {
        log::info!("channel {channel} wet {:.2}", wet.0);
    }
}

#[derive(Debug, Default)]
struct HeadlessRenderer {}
impl Renders for HeadlessRenderer {}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let settings = match std::env::args().nth(1) {
        Some(path) => PatchBaySettings::load(path)?,
        None => PatchBaySettings::default(),
    };
    let mut bay = PatchBay::new_with(
        settings,
        Box::new(LoggingSynthesizer::default()),
        Box::new(HeadlessRenderer::default()),
    );
    let uids = bay.build_demo_scene()?;
    for edge in bay.edges() {
        println!("{} -> {}", edge.from, edge.to);
    }

    bay.play();
    let sample_rate = bay.transport().sample_rate();
    for _ in 0..4 {
        bay.advance(sample_rate.0);
    }

    // Drag the pluck synth across the canvas and watch the tree follow.
    if let Some(pluck) = uids.get(2).copied() {
        bay.drag_start(pluck)?;
        for step in 0..=10 {
            let step = step as f64;
            bay.drag_move(pluck, Point::new(200.0 + step * 30.0, 100.0 + step * 25.0))?;
        }
        bay.drag_end(pluck);
    }
    for _ in 0..4 {
        bay.advance(sample_rate.0);
    }
    bay.stop();

    println!("{} node(s), {} edge(s)", bay.nodes().len(), bay.edges().len());
    Ok(())
}
