//! Host instances of guest objects.
//!
//! With blessing enabled, a guest object whose prototype chain defines
//! `__hostPackage` crosses into the host as an instance of a synthesized
//! class instead of a hash copy. The class is named after the package and
//! the context, and its methods call the guest functions found on the
//! object's prototype.

use crate::context::BridgeInner;
use crate::error::exception_message;
use crate::wrapper::GuestOriginWrapper;
use crate::HOST_PACKAGE;
use core_types::{ObjectId, Value};
use host_runtime::{HostRef, HostValue};
use tracing::debug;

impl BridgeInner {
    /// Name of the host class synthesized for `package`.
    pub(crate) fn class_name(&self, package: &str) -> String {
        format!(
            "{}{}::N{}",
            self.config.borrow().bless_prefix,
            package,
            self.instance
        )
    }

    pub(crate) fn object_to_instance(&self, id: ObjectId) -> Result<HostRef, String> {
        let object = Value::HeapObject(id);
        let package = self
            .vm
            .get_property(&object, HOST_PACKAGE)
            .and_then(|package| self.vm.to_string_value(&package))
            .map_err(|exception| exception_message(&self.vm, &exception))?;
        let class = self.class_name(&package);
        if !self.host.has_class(&class) {
            self.define_guest_class(&class, id)?;
        }
        let instance = HostRef::new_scalar(HostValue::Undef);
        self.host.bless(&instance, &class);
        GuestOriginWrapper::attach(self, &instance, id, false);
        Ok(instance)
    }

    fn define_guest_class(&self, class: &str, id: ObjectId) -> Result<(), String> {
        self.host.define_class(class, &[]);
        let Some(prototype) = self.vm.prototype_of(id) else {
            return Ok(());
        };
        let prototype_value = Value::HeapObject(prototype);
        for key in self.vm.own_enumerable_keys(prototype) {
            let method = self
                .vm
                .get_property(&prototype_value, &key)
                .map_err(|exception| exception_message(&self.vm, &exception))?;
            if !self.vm.is_callable(&method) {
                continue;
            }
            if let HostValue::Ref(code) = self.to_host(&method) {
                self.host.add_method(class, &key, code);
            }
        }
        debug!(class, "synthesized host class");
        Ok(())
    }
}
