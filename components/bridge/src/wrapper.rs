//! Wrapper lifecycle.
//!
//! A [`HostOriginWrapper`] is stored as host data of the guest object that
//! represents a host value. It holds the host value strongly and is dropped
//! by the guest collector once the guest object becomes unreachable.
//!
//! A [`GuestOriginWrapper`] is attached as magic to the host cell that
//! represents a guest value. It roots the guest value and is dropped when the
//! last host reference to the cell goes away.
//!
//! Both deregister from the bridge's identity map when dropped. Neither holds
//! the bridge itself strongly, so a dropped bridge simply leaves them inert.

use crate::context::BridgeInner;
use core_types::{ObjectId, Value};
use host_runtime::HostRef;
use memory_manager::RootId;
use std::rc::Weak;
use tracing::trace;

/// External memory charged to the guest heap per host-origin wrapper.
pub const WRAPPER_EXTERNAL_BYTES: i64 = 1000;

/// What a guest-callable stub invokes on the host side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallTarget {
    /// The wrapped host code value, called with the converted arguments
    Function,
    /// A method, dispatched by name on the converted receiver
    Method(String),
}

/// Pairs a host value with the guest object standing in for it.
pub(crate) struct HostOriginWrapper {
    context: Weak<BridgeInner>,
    host: Option<HostRef>,
    guest: ObjectId,
    target: Option<CallTarget>,
    charged: i64,
}

impl HostOriginWrapper {
    /// Attaches a wrapper to `guest`. With a host value the pairing is
    /// registered for identity lookups and external memory is charged.
    pub(crate) fn attach(
        inner: &BridgeInner,
        guest: ObjectId,
        host: Option<HostRef>,
        target: Option<CallTarget>,
    ) {
        let charged = match &host {
            Some(host) => {
                inner
                    .identity
                    .borrow_mut()
                    .register_host_origin(host.address(), guest);
                inner.vm.adjust_external_memory(WRAPPER_EXTERNAL_BYTES);
                WRAPPER_EXTERNAL_BYTES
            }
            None => 0,
        };
        let wrapper = HostOriginWrapper {
            context: inner.me.clone(),
            host,
            guest,
            target,
            charged,
        };
        inner.vm.set_host_data(guest, Box::new(wrapper));
    }

    pub(crate) fn host(&self) -> Option<HostRef> {
        self.host.clone()
    }

    pub(crate) fn target(&self) -> Option<CallTarget> {
        self.target.clone()
    }
}

impl Drop for HostOriginWrapper {
    fn drop(&mut self) {
        let Some(inner) = self.context.upgrade() else {
            return;
        };
        if let Some(host) = &self.host {
            trace!(address = host.address(), guest = ?self.guest, "host-origin wrapper released");
            inner
                .identity
                .borrow_mut()
                .unregister(host.address(), self.guest);
        }
        if self.charged != 0 {
            inner.vm.adjust_external_memory(-self.charged);
        }
    }
}

/// Pairs a guest value with the host cell standing in for it.
pub(crate) struct GuestOriginWrapper {
    context: Weak<BridgeInner>,
    root: RootId,
    guest: ObjectId,
    address: usize,
    returns_list: bool,
}

impl GuestOriginWrapper {
    /// Roots `guest` and attaches the wrapper to `host`.
    pub(crate) fn attach(inner: &BridgeInner, host: &HostRef, guest: ObjectId, returns_list: bool) {
        let root = inner.vm.add_root(Value::HeapObject(guest));
        inner.identity.borrow_mut().register_guest_origin(host, guest);
        host.attach_magic(Box::new(GuestOriginWrapper {
            context: inner.me.clone(),
            root,
            guest,
            address: host.address(),
            returns_list,
        }));
    }

    pub(crate) fn context(&self) -> Weak<BridgeInner> {
        self.context.clone()
    }

    pub(crate) fn root(&self) -> RootId {
        self.root
    }

    pub(crate) fn returns_list(&self) -> bool {
        self.returns_list
    }
}

impl Drop for GuestOriginWrapper {
    fn drop(&mut self) {
        let Some(inner) = self.context.upgrade() else {
            return;
        };
        trace!(address = self.address, guest = ?self.guest, "guest-origin wrapper released");
        inner.identity.borrow_mut().unregister(self.address, self.guest);
        inner.vm.release_root(self.root);
    }
}
