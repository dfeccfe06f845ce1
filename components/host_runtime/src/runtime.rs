//! Class registry and call dispatch.
//!
//! Classes are named packages with an ordered parent list and a table of
//! methods. Method resolution walks the linearized ancestor list depth
//! first, left to right, each class visited once.

use crate::cell::{CallContext, HostCall, HostCode, HostRef};
use crate::error::{HostError, HostResult};
use crate::value::HostValue;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use tracing::trace;

#[derive(Debug, Default)]
struct ClassInfo {
    parents: Vec<String>,
    methods: Vec<(String, HostRef)>,
}

/// The host runtime: class registry plus function and method calls.
#[derive(Debug, Default)]
pub struct HostRuntime {
    classes: RefCell<HashMap<String, ClassInfo>>,
}

impl HostRuntime {
    /// Creates a runtime with no classes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares `name` with the given parents, replacing earlier parents.
    /// Methods already defined are kept.
    pub fn define_class(&self, name: &str, parents: &[&str]) {
        let mut classes = self.classes.borrow_mut();
        let class = classes.entry(name.to_string()).or_default();
        class.parents = parents.iter().map(|p| p.to_string()).collect();
    }

    /// Whether `name` has been declared, explicitly or by adding a method.
    pub fn has_class(&self, name: &str) -> bool {
        self.classes.borrow().contains_key(name)
    }

    /// Installs `code` as method `name` of `class`, creating the class on
    /// demand. A later definition replaces an earlier one.
    pub fn add_method(&self, class: &str, name: &str, code: HostRef) {
        let mut classes = self.classes.borrow_mut();
        let methods = &mut classes.entry(class.to_string()).or_default().methods;
        match methods.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = code,
            None => methods.push((name.to_string(), code)),
        }
    }

    /// Convenience for [`HostRuntime::add_method`] with a closure.
    pub fn define_method<F>(&self, class: &str, name: &str, f: F) -> HostRef
    where
        F: Fn(&HostRuntime, HostCall) -> Result<Vec<HostValue>, HostError> + 'static,
    {
        let code = HostRef::new_code(HostCode::new(f).named(format!("{}::{}", class, name)));
        self.add_method(class, name, code.clone());
        code
    }

    /// Blesses `reference` into `class`, declaring the class if needed.
    pub fn bless(&self, reference: &HostRef, class: &str) {
        self.classes
            .borrow_mut()
            .entry(class.to_string())
            .or_default();
        reference.bless(class);
    }

    /// The class followed by its ancestors in resolution order.
    pub fn linear_isa(&self, class: &str) -> Vec<String> {
        let classes = self.classes.borrow();
        let mut order = Vec::new();
        let mut seen = HashSet::new();
        let mut stack = vec![class.to_string()];
        while let Some(name) = stack.pop() {
            if !seen.insert(name.clone()) {
                continue;
            }
            if let Some(info) = classes.get(&name) {
                stack.extend(info.parents.iter().rev().cloned());
            }
            order.push(name);
        }
        order
    }

    /// Names of methods declared directly in `class`, in definition order.
    pub fn declared_methods(&self, class: &str) -> Vec<String> {
        self.classes
            .borrow()
            .get(class)
            .map(|info| info.methods.iter().map(|(n, _)| n.clone()).collect())
            .unwrap_or_default()
    }

    /// Method `name` declared directly in `class`.
    pub fn declared_method(&self, class: &str, name: &str) -> Option<HostRef> {
        self.classes
            .borrow()
            .get(class)?
            .methods
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, code)| code.clone())
    }

    /// Resolves `name` through the ancestors of `class`.
    pub fn resolve_method(&self, class: &str, name: &str) -> Option<HostRef> {
        self.linear_isa(class)
            .iter()
            .find_map(|c| self.declared_method(c, name))
    }

    /// Calls a code value. Errors raised by the callee are returned, never
    /// propagated as panics.
    pub fn call(&self, code: &HostValue, args: Vec<HostValue>, context: CallContext) -> HostResult<Vec<HostValue>> {
        let callee = match code {
            HostValue::Ref(r) => r.clone(),
            _ => return Err(HostError::die("Not a CODE reference")),
        };
        self.invoke(callee, args, context, false)
    }

    /// Calls method `name` on `invocant`, a blessed reference or a class
    /// name. The invocant is passed as the first argument.
    pub fn call_method(
        &self,
        invocant: &HostValue,
        name: &str,
        args: Vec<HostValue>,
        context: CallContext,
    ) -> HostResult<Vec<HostValue>> {
        let class = match invocant {
            HostValue::Ref(r) => r.blessed().ok_or_else(|| {
                HostError::die(format!("Can't call method \"{}\" on unblessed reference", name))
            })?,
            HostValue::Undef => {
                return Err(HostError::die(format!(
                    "Can't call method \"{}\" on an undefined value",
                    name
                )))
            }
            other => other.to_display_string(),
        };
        let code = self.resolve_method(&class, name).ok_or_else(|| {
            HostError::die(format!(
                "Can't locate object method \"{}\" via package \"{}\"",
                name, class
            ))
        })?;
        let mut full = Vec::with_capacity(args.len() + 1);
        full.push(invocant.clone());
        full.extend(args);
        self.invoke(code, full, context, true)
    }

    fn invoke(
        &self,
        callee: HostRef,
        args: Vec<HostValue>,
        context: CallContext,
        method: bool,
    ) -> HostResult<Vec<HostValue>> {
        let code = callee
            .code()
            .ok_or_else(|| HostError::die("Not a CODE reference"))?;
        trace!(name = ?code.name, args = args.len(), ?context, "host call");
        let results = (code.func)(
            self,
            HostCall {
                callee,
                args,
                context,
                method,
            },
        )?;
        Ok(match context {
            CallContext::List => results,
            CallContext::Scalar => vec![results.into_iter().last().unwrap_or_default()],
        })
    }
}
