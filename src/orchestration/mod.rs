// Copyright (c) 2024 Mike Tsao

//! The moving parts: the event bus, the node registry, the topology builder,
//! signal routing, and the [PatchBay] that brings them together.

/// The most commonly used imports.
pub mod prelude {
    pub use super::{
        Edge, EventTopic, HasEventBus, PatchBay, PatchBayError, PatchBayEvent, TopologyPolicy,
    };
}

pub use {
    bus::{EventBus, EventHandler, EventTopic, HasEventBus, PatchBayEvent},
    error::PatchBayError,
    humidity::Humidifier,
    patch_bay::PatchBay,
    repositories::NodeRepository,
    router::{reception_limit, signal_strength},
    topology::{edges, Edge, TopologyBuilder, TopologyPolicy},
};

mod bus;
mod error;
mod humidity;
mod patch_bay;
mod repositories;
mod router;
mod topology;
