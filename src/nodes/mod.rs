// Copyright (c) 2024 Mike Tsao

//! Nodes are the things on the canvas: the master output, instruments,
//! effects, and the emitters that make them play.

/// The most commonly used imports.
pub mod prelude {
    pub use super::{
        ChannelKind, EmitterBehavior, EmitterCore, EmitterSpec, MetronomeCore, Node, NodeFactory,
        NodeKey, NodeKind, NodeSpec, NodeSpecBuilder, PatternCore,
    };
}

pub use {
    emitters::{EmitterBehavior, EmitterCore, MetronomeCore, PatternCore},
    factory::{EmitterSpec, NodeFactory, NodeFactoryFn, NodeKey, NodeSpec, NodeSpecBuilder},
    node::{ChannelKind, Node, NodeKind},
};

mod emitters;
mod factory;
mod node;
