// Copyright (c) 2024 Mike Tsao

//! System utilities.

/// Commonly used imports.
pub mod prelude {
    pub use super::{rng::Rng, settings::PatchBaySettings};
}

pub use {rng::Rng, settings::PatchBaySettings};

mod rng;
mod settings;
