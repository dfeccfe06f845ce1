//! Graph conversion between host and guest values.
//!
//! Arrays and hashes are copied element by element. Every top-level
//! conversion keeps its own seen-table so that shared sub-structures stay
//! shared and cycles terminate. Code values, blessed references and guest
//! functions are wrapped instead of copied and keep their identity across
//! conversions for as long as the wrapper lives.

use crate::call::{call_guest_function, invoke_host};
use crate::codec::{primitive_to_host, scalar_to_guest};
use crate::context::BridgeInner;
use crate::identity::{GuestSeen, HostSeen};
use crate::wrapper::{CallTarget, GuestOriginWrapper, HostOriginWrapper};
use crate::{HOST_PACKAGE, HOST_RETURNS_LIST};
use core_types::{ObjectId, Value};
use host_runtime::{HostCode, HostKind, HostRef, HostValue};
use std::collections::HashMap;
use tracing::warn;

impl BridgeInner {
    /// Converts a host value into the guest.
    pub(crate) fn to_guest(&self, value: &HostValue) -> Value {
        let _scope = self.vm.handle_scope();
        let mut seen = HostSeen::default();
        self.host_to_guest(value, &mut seen)
    }

    /// Converts a guest value into the host.
    pub(crate) fn to_host(&self, value: &Value) -> HostValue {
        let _scope = self.vm.handle_scope();
        let mut seen = GuestSeen::default();
        self.guest_to_host(value, &mut seen)
    }

    fn host_to_guest(&self, value: &HostValue, seen: &mut HostSeen) -> Value {
        let reference = match value {
            HostValue::Ref(reference) => reference,
            scalar => return scalar_to_guest(scalar).unwrap_or(Value::Undefined),
        };
        let address = reference.address();
        if let Some(guest) = self.live_guest_for(address) {
            return Value::HeapObject(guest);
        }
        if let Some(guest) = seen.lookup(address) {
            return Value::HeapObject(guest);
        }
        if let Some(class) = reference.blessed() {
            return self.blessed_to_guest(reference, &class);
        }
        match reference.kind() {
            HostKind::Array => {
                let array = self.vm.new_array(Vec::new());
                seen.record(address, array);
                let elements: Vec<Value> = reference
                    .array_elements()
                    .unwrap_or_default()
                    .iter()
                    .map(|element| self.host_to_guest(element, seen))
                    .collect();
                if let Some(slot) = self
                    .vm
                    .heap_mut()
                    .get_mut(array)
                    .and_then(|object| object.elements_mut())
                {
                    *slot = elements;
                }
                Value::HeapObject(array)
            }
            HostKind::Hash => {
                let object = self.vm.new_object();
                seen.record(address, object);
                for (key, entry) in reference.hash_entries().unwrap_or_default() {
                    let entry = self.host_to_guest(&entry, seen);
                    self.vm.define_own(object, &key, entry, true);
                }
                Value::HeapObject(object)
            }
            HostKind::Code => Value::HeapObject(self.code_to_guest(reference)),
            HostKind::Scalar => {
                warn!(%value, "scalar references have no guest counterpart");
                Value::Undefined
            }
        }
    }

    fn live_guest_for(&self, address: usize) -> Option<ObjectId> {
        let guest = self.identity.borrow().guest_for(address)?;
        self.vm.heap().is_valid(guest).then_some(guest)
    }

    /// A guest function forwarding its calls to a host code value.
    pub(crate) fn code_to_guest(&self, code: &HostRef) -> ObjectId {
        let name = code.code().and_then(|c| c.name).unwrap_or_default();
        let context = self.me.clone();
        let function = self
            .vm
            .create_native_function(&name, move |vm, call| invoke_host(&context, vm, call));
        HostOriginWrapper::attach(self, function, Some(code.clone()), Some(CallTarget::Function));
        function
    }

    fn guest_to_host(&self, value: &Value, seen: &mut GuestSeen) -> HostValue {
        if let Some(primitive) = primitive_to_host(value) {
            return primitive;
        }
        let Some(id) = value.as_object() else {
            return HostValue::Undef;
        };
        let Some(hash) = self.vm.identity_hash(id) else {
            warn!(?id, "conversion of a collected object");
            return HostValue::Undef;
        };
        if let Some(host) = self.live_host_for(id) {
            return HostValue::Ref(host);
        }
        if self.vm.is_callable(value) {
            return HostValue::Ref(self.function_to_host(id));
        }
        if let Some(host) = seen.lookup(hash, id) {
            return HostValue::Ref(host);
        }
        if let Some(elements) = self.vm.array_elements(value) {
            let array = HostRef::new_array(Vec::with_capacity(elements.len()));
            seen.record(hash, id, array.clone());
            for element in &elements {
                let element = self.guest_to_host(element, seen);
                array.array_push(element);
            }
            return HostValue::Ref(array);
        }
        if self.config.borrow().enable_blessing && self.vm.has_property(id, HOST_PACKAGE) {
            return match self.object_to_instance(id) {
                Ok(instance) => HostValue::Ref(instance),
                Err(message) => {
                    self.record_error(message);
                    HostValue::Undef
                }
            };
        }
        let hash_ref = HostRef::new_hash(HashMap::new());
        seen.record(hash, id, hash_ref.clone());
        for key in self.vm.enumerable_keys_with_prototypes(id) {
            let entry = self.vm.object_property(id, &key);
            let entry = self.guest_to_host(&entry, seen);
            hash_ref.hash_insert(key, entry);
        }
        HostValue::Ref(hash_ref)
    }

    fn live_host_for(&self, id: ObjectId) -> Option<HostRef> {
        if let Some(Some(host)) = self
            .vm
            .with_host_data::<HostOriginWrapper, _>(id, HostOriginWrapper::host)
        {
            return Some(host);
        }
        self.identity.borrow().host_for(id)
    }

    /// A host code value calling the guest function `id`.
    fn function_to_host(&self, id: ObjectId) -> HostRef {
        let returns_list = self.vm.has_property(id, HOST_RETURNS_LIST);
        let mut code = HostCode::new(call_guest_function);
        if let Some(name) = self.vm.function_name(id).filter(|name| !name.is_empty()) {
            code = code.named(name);
        }
        let cell = HostRef::new_code(code);
        GuestOriginWrapper::attach(self, &cell, id, returns_list);
        cell
    }
}
