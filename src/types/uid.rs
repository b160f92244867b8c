// Copyright (c) 2024 Mike Tsao

//! Unique identifiers for nodes, bus subscriptions, and audio channels, and
//! factories that help ensure they are in fact unique.

use core::sync::atomic::Ordering;
use core::{hash::Hash, marker::PhantomData, sync::atomic::AtomicUsize};
use serde::{Deserialize, Serialize};
use synonym::Synonym;

/// Identifies a node for as long as it lives in the registry.
#[derive(Synonym, Serialize, Deserialize, Eq, PartialEq)]
// See
// https://doc.rust-lang.org/stable/std/marker/trait.StructuralPartialEq.html
// for explanation why we derive PartialEq rather than letting Synonym do it.
#[synonym(skip(PartialEq))]
#[serde(rename_all = "kebab-case")]
pub struct Uid(pub usize);
impl IsUid for Uid {
    fn as_usize(&self) -> usize {
        self.0
    }
}

/// Identifies one handler registered with the
/// [EventBus](crate::orchestration::EventBus).
#[derive(Synonym, Serialize, Deserialize, Eq, PartialEq)]
#[synonym(skip(PartialEq))]
#[serde(rename_all = "kebab-case")]
pub struct SubscriptionUid(pub usize);
impl IsUid for SubscriptionUid {
    fn as_usize(&self) -> usize {
        self.0
    }
}

/// An opaque handle to an audio-processing unit owned by the synthesis
/// collaborator. The core never looks inside; it only passes it back.
#[derive(Synonym, Serialize, Deserialize, Eq, PartialEq)]
#[synonym(skip(PartialEq))]
#[serde(rename_all = "kebab-case")]
pub struct ChannelUid(pub usize);
impl IsUid for ChannelUid {
    fn as_usize(&self) -> usize {
        self.0
    }
}

/// An optional Uid trait.
pub trait IsUid: Eq + Hash + Clone + From<usize> {
    /// Returns the raw uid.
    fn as_usize(&self) -> usize;
}

/// Generates unique uids.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct UidFactory<U: IsUid> {
    pub(crate) next_uid_value: AtomicUsize,
    #[serde(skip)]
    pub(crate) _phantom: PhantomData<U>,
}
impl<U: IsUid> Default for UidFactory<U> {
    // Zero is reserved so that a default-constructed uid never collides with a
    // minted one.
    fn default() -> Self {
        Self::new(1)
    }
}
impl<U: IsUid> UidFactory<U> {
    /// Creates a new [UidFactory] starting with the given value.
    pub fn new(first_uid: usize) -> Self {
        Self {
            next_uid_value: AtomicUsize::new(first_uid),
            _phantom: Default::default(),
        }
    }

    /// Generates the next unique uid.
    pub fn mint_next(&self) -> U {
        let uid_value = self.next_uid_value.fetch_add(1, Ordering::Relaxed);
        U::from(uid_value)
    }

    /// Notifies the factory that a uid exists that might have been created
    /// elsewhere. This gives the factory an opportunity to adjust
    /// `next_uid_value` to stay consistent with all known uids.
    pub fn notify_externally_minted_uid(&self, uid: U) {
        if uid.as_usize() >= self.next_uid_value.load(Ordering::Relaxed) {
            self.next_uid_value
                .store(uid.as_usize() + 1, Ordering::Relaxed);
        }
    }
}
impl<U: IsUid> PartialEq for UidFactory<U> {
    fn eq(&self, other: &Self) -> bool {
        self.next_uid_value.load(Ordering::Relaxed) == other.next_uid_value.load(Ordering::Relaxed)
    }
}
