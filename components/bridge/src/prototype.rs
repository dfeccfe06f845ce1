//! Guest proxies of blessed host references.
//!
//! Every host class gets one guest prototype per context. It carries a stub
//! for each method the class and its ancestors declare; calling a stub
//! dispatches the method on the host object behind the receiver. A class
//! may declare `to_js`, returning guest source of a function that builds the
//! guest representation of an instance.

use crate::call::invoke_host;
use crate::context::BridgeInner;
use crate::error::{exception_message, DEFAULT_ORIGIN};
use crate::wrapper::{CallTarget, HostOriginWrapper};
use crate::TO_JS;
use core_types::{ObjectId, Value};
use host_runtime::HostRef;
use tracing::debug;

impl BridgeInner {
    /// Guest proxy of a blessed host reference.
    pub(crate) fn blessed_to_guest(&self, reference: &HostRef, class: &str) -> Value {
        let prototype = self.prototype_for(class);
        let object = self.vm.new_object_with_prototype(Some(prototype));
        HostOriginWrapper::attach(self, object, Some(reference.clone()), None);
        let proxy = Value::HeapObject(object);

        let to_js = match self.vm.get_property(&proxy, TO_JS) {
            Ok(to_js) => to_js,
            Err(exception) => {
                self.record_error(exception_message(&self.vm, &exception));
                return proxy;
            }
        };
        if !self.vm.is_callable(&to_js) || self.is_host_stub(&to_js) {
            return proxy;
        }
        match self.vm.call(&to_js, &proxy, &[]) {
            Ok(replacement @ Value::HeapObject(_)) => {
                let wrapper = self.vm.heap_mut().take_host_data(object);
                drop(wrapper);
                replacement
            }
            Ok(_) => proxy,
            Err(exception) => {
                self.record_error(exception_message(&self.vm, &exception));
                proxy
            }
        }
    }

    fn is_host_stub(&self, value: &Value) -> bool {
        value.as_object().is_some_and(|id| {
            self.vm
                .with_host_data::<HostOriginWrapper, _>(id, |_| ())
                .is_some()
        })
    }

    /// The cached prototype of `class`, built on first use.
    pub(crate) fn prototype_for(&self, class: &str) -> ObjectId {
        let cached = self.prototypes.borrow().get(class).copied();
        if let Some(Value::HeapObject(prototype)) = cached.and_then(|root| self.vm.get_root(root)) {
            return prototype;
        }
        let prototype = self.vm.new_object();
        let root = self.vm.add_root(Value::HeapObject(prototype));
        if let Some(stale) = self.prototypes.borrow_mut().insert(class.to_string(), root) {
            self.vm.release_root(stale);
        }
        self.fill_prototype(prototype, class);
        self.specialize_to_js(prototype, class);
        debug!(class, "built guest prototype");
        prototype
    }

    fn fill_prototype(&self, prototype: ObjectId, class: &str) {
        for ancestor in self.host.linear_isa(class) {
            for name in self.host.declared_methods(&ancestor) {
                if self.vm.has_own_property(prototype, &name) {
                    continue;
                }
                let function = if name == TO_JS {
                    match self.host.declared_method(&ancestor, &name) {
                        Some(code) => self.code_to_guest(&code),
                        None => continue,
                    }
                } else {
                    self.method_stub(&name)
                };
                self.vm
                    .define_own(prototype, &name, Value::HeapObject(function), false);
            }
        }
    }

    fn method_stub(&self, name: &str) -> ObjectId {
        let context = self.me.clone();
        let stub = self
            .vm
            .create_native_function(name, move |vm, call| invoke_host(&context, vm, call));
        HostOriginWrapper::attach(self, stub, None, Some(CallTarget::Method(name.to_string())));
        stub
    }

    /// Replaces the host `to_js` stub with the guest function its result
    /// compiles to.
    fn specialize_to_js(&self, prototype: ObjectId, class: &str) {
        if !self.vm.has_own_property(prototype, TO_JS) {
            return;
        }
        let compiled = self
            .vm
            .get_property(&Value::HeapObject(prototype), TO_JS)
            .and_then(|to_js| self.vm.call(&to_js, &self.global(), &[]))
            .and_then(|source| self.vm.to_string_value(&source))
            .and_then(|source| self.vm.eval(&source, DEFAULT_ORIGIN));
        match compiled {
            Ok(function) if self.vm.is_callable(&function) => {
                self.vm.define_own(prototype, TO_JS, function, false);
            }
            Ok(_) => debug!(class, "to_js did not produce a function"),
            Err(exception) => self.record_error(exception_message(&self.vm, &exception)),
        }
    }
}
