// Copyright (c) 2024 Mike Tsao

use crate::prelude::*;
use thiserror::Error;

/// Caller mistakes that the patch bay refuses to paper over. They arrive
/// wrapped in [anyhow::Error]; use `downcast_ref::<PatchBayError>()` to
/// inspect them.
#[derive(Debug, Error, PartialEq)]
pub enum PatchBayError {
    /// The uid doesn't name a live node.
    #[error("node {0} is not in the registry")]
    UnknownNode(Uid),

    /// Only nodes with the emitter capability can emit.
    #[error("node {0} can't emit signals")]
    NotAnEmitter(Uid),

    /// The graph has exactly one root.
    #[error("node {0} is already the master")]
    DuplicateMaster(Uid),

    /// Nothing in the catalogue goes by this name.
    #[error("unknown node key: {0}")]
    UnknownNodeKey(String),
}
