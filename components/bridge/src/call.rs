//! Calls across the boundary.

use crate::context::BridgeInner;
use crate::error::{exception_message, CONTEXT_GONE};
use crate::wrapper::{CallTarget, GuestOriginWrapper, HostOriginWrapper};
use core_types::{ErrorKind, Value};
use host_runtime::{CallContext, HostCall, HostError, HostRuntime, HostValue};
use interpreter::{Exception, NativeCall, VM};
use memory_manager::RootId;
use std::rc::Weak;
use tracing::trace;

/// Native body of guest stubs for host code and host methods.
pub(crate) fn invoke_host(context: &Weak<BridgeInner>, vm: &VM, call: NativeCall<'_>) -> Result<Value, Exception> {
    match context.upgrade() {
        Some(inner) => inner.invoke_host(call),
        None => Err(vm.throw_error(ErrorKind::Error, CONTEXT_GONE)),
    }
}

/// Host body of code values wrapping a guest function.
pub(crate) fn call_guest_function(_runtime: &HostRuntime, call: HostCall) -> Result<Vec<HostValue>, HostError> {
    let wrapper = call
        .callee
        .with_magic::<GuestOriginWrapper, _>(|w| (w.context(), w.root(), w.returns_list()));
    let Some((context, root, returns_list)) = wrapper else {
        return Err(HostError::die("Not a guest function"));
    };
    let inner = context.upgrade().ok_or_else(|| HostError::die(CONTEXT_GONE))?;
    inner.call_guest(root, returns_list, call)
}

impl BridgeInner {
    fn invoke_host(&self, call: NativeCall<'_>) -> Result<Value, Exception> {
        let _lock = self.lock.lock();
        let target = self
            .vm
            .with_host_data::<HostOriginWrapper, _>(call.callee, |w| w.target().map(|t| (t, w.host())))
            .flatten();
        let Some((target, host)) = target else {
            return Err(self.vm.throw_error(ErrorKind::TypeError, "Illegal invocation"));
        };
        let args: Vec<HostValue> = call.args.iter().map(|arg| self.to_host(arg)).collect();
        let outcome = match (&target, host) {
            (CallTarget::Function, Some(code)) => {
                trace!(name = ?code.code().and_then(|c| c.name), "guest calls host function");
                self.host.call(&HostValue::Ref(code), args, CallContext::Scalar)
            }
            (CallTarget::Function, None) => {
                return Err(self.vm.throw_error(ErrorKind::TypeError, "Illegal invocation"));
            }
            (CallTarget::Method(name), _) => {
                trace!(%name, "guest calls host method");
                let invocant = self.to_host(&call.this);
                self.host.call_method(&invocant, name, args, CallContext::Scalar)
            }
        };
        match outcome {
            Ok(results) => Ok(self.to_guest(&results.into_iter().last().unwrap_or_default())),
            Err(err) => {
                self.vm.check_interrupt()?;
                Err(self.vm.throw_error(ErrorKind::Error, err.trimmed()))
            }
        }
    }

    fn call_guest(&self, root: RootId, returns_list: bool, call: HostCall) -> Result<Vec<HostValue>, HostError> {
        let _lock = self.lock.lock();
        let _scope = self.vm.handle_scope();
        let function = self.vm.get_root(root).ok_or_else(|| HostError::die(CONTEXT_GONE))?;
        let mut args = call.args.iter();
        let this = if call.method {
            args.next()
                .map(|invocant| self.to_guest(invocant))
                .unwrap_or(Value::Undefined)
        } else {
            self.global()
        };
        let args: Vec<Value> = args.map(|arg| self.to_guest(arg)).collect();
        let result = self
            .vm
            .call(&function, &this, &args)
            .map_err(|exception| HostError::die(exception_message(&self.vm, &exception)))?;
        if returns_list {
            if let Some(elements) = self.vm.array_elements(&result) {
                return Ok(match call.context {
                    CallContext::List => elements.iter().map(|element| self.to_host(element)).collect(),
                    CallContext::Scalar => vec![HostValue::Int(elements.len() as i64)],
                });
            }
        }
        Ok(vec![self.to_host(&result)])
    }
}
