// Copyright (c) 2024 Mike Tsao

#![deny(missing_docs, unused_imports, unused_variables)]
#![allow(rustdoc::private_intra_doc_links)]

//! Patchbay is the routing core of a spatial audio patch bay. Nodes sit on a
//! 2D canvas: a master output, instruments, effects, and emitters that make
//! them play. Proximity decides the routing, and moving a node re-routes the
//! audio live.
//!
//! The core never draws or makes sound itself. A host supplies a
//! [Synthesizes](traits::Synthesizes) implementation for audio and a
//! [Renders](traits::Renders) implementation for the canvas, then drives a
//! [PatchBay] with node positions and transport ticks.
//!
//! * *Quickest start*: [PatchBay::build_demo_scene()] lays out a complete
//! scene, and [PatchBay::play()] plus [PatchBay::advance()] performs it.
//! * *More control*: Add nodes one by one with [PatchBay::add_node()], move
//! them with [PatchBay::move_node()] or the drag callbacks, and fire signals
//! with [PatchBay::emit()].
//! * *Pieces only*: The [orchestration::EventBus], the
//! [orchestration::TopologyBuilder], and the emitter cores in [nodes] are
//! usable on their own.

/// A collection of imports that are useful to users of this crate. `use
/// patchbay::prelude::*;` for easier onboarding.
pub mod prelude {
    pub use super::{
        elements::prelude::*, nodes::prelude::*, orchestration::prelude::*, traits::prelude::*,
        types::prelude::*, util::prelude::*,
    };
}

pub use orchestration::PatchBay;

pub mod elements;
pub mod nodes;
pub mod orchestration;
pub mod testing;
pub mod traits;
pub mod types;
pub mod util;
