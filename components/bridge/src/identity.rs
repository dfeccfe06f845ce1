//! Identity caches.
//!
//! [`IdentityMap`] lives as long as the bridge and pairs every live wrapper
//! with its counterpart, so that an object crossing the boundary twice comes
//! back as the same object. [`HostSeen`] and [`GuestSeen`] are scoped to one
//! top-level conversion and preserve sharing and cycles inside a single
//! value graph.

use core_types::ObjectId;
use host_runtime::{HostRef, WeakHostRef};
use std::collections::HashMap;

/// Bridge-lifetime map between host cell addresses and guest objects.
///
/// Host-origin wrappers are found from the guest side through the guest
/// object's host data; guest-origin wrappers are found through `by_guest`.
#[derive(Debug, Default)]
pub struct IdentityMap {
    by_host: HashMap<usize, ObjectId>,
    by_guest: HashMap<ObjectId, WeakHostRef>,
}

impl IdentityMap {
    /// Records a host-origin wrapper.
    pub fn register_host_origin(&mut self, address: usize, guest: ObjectId) {
        self.by_host.insert(address, guest);
    }

    /// Records a guest-origin wrapper attached to `host`.
    pub fn register_guest_origin(&mut self, host: &HostRef, guest: ObjectId) {
        self.by_host.insert(host.address(), guest);
        self.by_guest.insert(guest, host.downgrade());
    }

    /// Guest counterpart of the host cell at `address`.
    pub fn guest_for(&self, address: usize) -> Option<ObjectId> {
        self.by_host.get(&address).copied()
    }

    /// Host counterpart of a guest object with a guest-origin wrapper.
    pub fn host_for(&self, guest: ObjectId) -> Option<HostRef> {
        self.by_guest.get(&guest)?.upgrade()
    }

    /// Removes the pairing of `address` and `guest`. Entries pointing
    /// elsewhere belong to a newer wrapper and are kept.
    pub fn unregister(&mut self, address: usize, guest: ObjectId) {
        if self.by_host.get(&address) == Some(&guest) {
            self.by_host.remove(&address);
        }
        self.by_guest.remove(&guest);
    }

    /// Number of host addresses with a live wrapper.
    pub fn len(&self) -> usize {
        self.by_host.len()
    }

    /// Whether no wrapper is registered.
    pub fn is_empty(&self) -> bool {
        self.by_host.is_empty()
    }
}

/// Host cells already converted during one host-to-guest pass.
#[derive(Debug, Default)]
pub struct HostSeen {
    objects: HashMap<usize, ObjectId>,
}

impl HostSeen {
    /// Guest object recorded for the cell at `address`.
    pub fn lookup(&self, address: usize) -> Option<ObjectId> {
        self.objects.get(&address).copied()
    }

    /// Records the guest object created for the cell at `address`.
    pub fn record(&mut self, address: usize, guest: ObjectId) {
        self.objects.insert(address, guest);
    }
}

/// Guest objects already converted during one guest-to-host pass.
///
/// Keyed by identity hash; hashes may collide, so each bucket is scanned
/// for the exact object.
#[derive(Debug, Default)]
pub struct GuestSeen {
    buckets: HashMap<u32, Vec<(ObjectId, HostRef)>>,
}

impl GuestSeen {
    /// Host cell recorded for `guest`.
    pub fn lookup(&self, hash: u32, guest: ObjectId) -> Option<HostRef> {
        self.buckets
            .get(&hash)?
            .iter()
            .find(|(id, _)| *id == guest)
            .map(|(_, host)| host.clone())
    }

    /// Records the host cell created for `guest`.
    pub fn record(&mut self, hash: u32, guest: ObjectId, host: HostRef) {
        self.buckets.entry(hash).or_default().push((guest, host));
    }
}
