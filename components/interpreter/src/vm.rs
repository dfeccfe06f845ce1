//! Virtual machine state and the embedding surface.
//!
//! A [`VM`] owns a guest heap, the intrinsic objects and the call stack. All
//! entry points take `&self`: native functions receive the VM and may call
//! back into it, so the heap sits in a `RefCell` and is only ever borrowed for
//! the duration of a single heap operation.
//!
//! Collection only happens while no script is running (call depth zero).
//! Values that live only on the Rust stack during execution are therefore
//! never swept; embedders holding values across entry points must root them
//! with [`VM::add_root`].

use crate::builtins;
use crate::call_frame::CallFrame;
use crate::exception::{Exception, ThrowSite};
use crate::exec::Env;
use crate::flags::EngineFlags;
use crate::interrupt::{InterruptHandle, InterruptToken};
use crate::realm::Realm;
use core_types::{ErrorKind, JsError, ObjectId, SourcePosition, Value};
use memory_manager::{
    FunctionCode, FunctionData, GcStats, Heap, JsObject, ObjectKind, RootId, Scope,
};
use parser::FunctionNode;
use std::any::Any;
use std::cell::{Cell, Ref, RefCell, RefMut};
use std::rc::Rc;

/// Growth of external memory that triggers a collection at the next entry.
const EXTERNAL_MEMORY_STEP: i64 = 32 * 1024 * 1024;

/// Signature of native functions.
pub type NativeFn = Rc<dyn Fn(&VM, NativeCall<'_>) -> Result<Value, Exception>>;

/// Arguments of a native function invocation.
#[derive(Debug)]
pub struct NativeCall<'a> {
    /// The function object being called
    pub callee: ObjectId,
    /// Receiver; for `new` the freshly allocated instance
    pub this: Value,
    /// Call arguments
    pub args: &'a [Value],
    /// Whether the function was invoked with `new`
    pub construct: bool,
}

impl NativeCall<'_> {
    /// Argument `index`, `undefined` when missing.
    pub fn arg(&self, index: usize) -> Value {
        self.args.get(index).cloned().unwrap_or(Value::Undefined)
    }
}

/// Payload of native function objects.
pub(crate) struct NativeFunction(pub(crate) NativeFn);

impl NativeFunction {
    pub(crate) fn new<F>(f: F) -> Self
    where
        F: Fn(&VM, NativeCall<'_>) -> Result<Value, Exception> + 'static,
    {
        Self(Rc::new(f))
    }
}

/// Payload of script function objects.
pub(crate) struct ScriptFunction {
    pub(crate) node: Rc<FunctionNode>,
    pub(crate) source: Rc<str>,
}

/// The script engine.
pub struct VM {
    heap: RefCell<Heap>,
    realm: Realm,
    frames: RefCell<Vec<CallFrame>>,
    flags: RefCell<EngineFlags>,
    interrupt: InterruptToken,
    interrupt_handle: InterruptHandle,
    pending_releases: RefCell<Vec<RootId>>,
    gc_requested: Cell<bool>,
    external_at_last_gc: Cell<i64>,
    handle_scopes: Cell<usize>,
}

/// Defers collection while alive, so that embedders may hold unrooted
/// values across calls that re-enter the engine.
///
/// Created by [`VM::handle_scope`]. Nested scopes are allowed.
#[derive(Debug)]
pub struct HandleScope<'a> {
    vm: &'a VM,
}

impl Drop for HandleScope<'_> {
    fn drop(&mut self) {
        self.vm.handle_scopes.set(self.vm.handle_scopes.get() - 1);
    }
}

impl VM {
    /// Create an engine with default flags.
    pub fn new() -> Self {
        Self::with_flags(EngineFlags::default())
    }

    /// Create an engine with the given flags.
    pub fn with_flags(flags: EngineFlags) -> Self {
        let mut heap = Heap::new();
        let realm = Realm::bootstrap(&mut heap);
        let (interrupt, interrupt_handle) = InterruptToken::new();
        let vm = Self {
            heap: RefCell::new(heap),
            realm,
            frames: RefCell::new(Vec::new()),
            flags: RefCell::new(flags),
            interrupt,
            interrupt_handle,
            pending_releases: RefCell::new(Vec::new()),
            gc_requested: Cell::new(false),
            external_at_last_gc: Cell::new(0),
            handle_scopes: Cell::new(0),
        };
        builtins::install(&vm);
        vm
    }

    /// Intrinsic objects.
    pub fn realm(&self) -> &Realm {
        &self.realm
    }

    /// The global object.
    pub fn global_object(&self) -> ObjectId {
        self.realm.global
    }

    /// Borrows the heap. The borrow must be released before calling back
    /// into the engine.
    pub fn heap(&self) -> Ref<'_, Heap> {
        self.heap.borrow()
    }

    /// Mutably borrows the heap. Same caveat as [`VM::heap`].
    pub fn heap_mut(&self) -> RefMut<'_, Heap> {
        self.heap.borrow_mut()
    }

    /// Current flags.
    pub fn flags(&self) -> EngineFlags {
        self.flags.borrow().clone()
    }

    /// Applies a flag string such as `"--stack-limit=32 --expose-gc"`.
    pub fn set_flags_from_string(&self, flags: &str) {
        self.flags.borrow_mut().apply(flags);
        if self.flags.borrow().expose_gc {
            builtins::install_gc(self);
        }
    }

    /// Handle that terminates running script from any thread.
    pub fn interrupt_handle(&self) -> InterruptHandle {
        self.interrupt_handle.clone()
    }

    /// Clears a pending termination request.
    pub fn reset_interrupt(&self) {
        self.interrupt.reset();
    }

    /// Number of active frames; zero when no script is running.
    pub fn stack_depth(&self) -> usize {
        self.frames.borrow().len()
    }

    // ----- entry points -----

    /// Compiles and runs `source`, returning its completion value.
    ///
    /// Syntax errors surface as a thrown `SyntaxError` located at `origin`.
    pub fn eval(&self, source: &str, origin: &str) -> Result<Value, Exception> {
        let top = self.enter(&[]);
        let origin: Rc<str> = Rc::from(origin);
        let result = match parser::parse(source) {
            Ok(program) => self.run_program(&program, origin),
            Err(err) => Err(self.syntax_exception(&err, origin)),
        };
        self.leave(top, &result);
        result
    }

    /// Calls `callee` with `this` and `args`.
    pub fn call(&self, callee: &Value, this: &Value, args: &[Value]) -> Result<Value, Exception> {
        let mut live = vec![callee.clone(), this.clone()];
        live.extend_from_slice(args);
        let top = self.enter(&live);
        let result = self.call_function(callee, this.clone(), args);
        self.leave(top, &result);
        result
    }

    /// Invokes `callee` as a constructor.
    pub fn construct(&self, callee: &Value, args: &[Value]) -> Result<Value, Exception> {
        let mut live = vec![callee.clone()];
        live.extend_from_slice(args);
        let top = self.enter(&live);
        let result = self.construct_value(callee, args, "value");
        self.leave(top, &result);
        result
    }

    /// Opens a scope during which no collection runs.
    pub fn handle_scope(&self) -> HandleScope<'_> {
        self.handle_scopes.set(self.handle_scopes.get() + 1);
        HandleScope { vm: self }
    }

    fn collection_blocked(&self) -> bool {
        self.stack_depth() > 0 || self.handle_scopes.get() > 0
    }

    fn enter(&self, live: &[Value]) -> bool {
        let top = self.stack_depth() == 0;
        if top {
            self.maybe_collect(live);
        }
        top
    }

    fn leave(&self, top: bool, result: &Result<Value, Exception>) {
        if !top {
            return;
        }
        let live = match result {
            Ok(value) => vec![value.clone()],
            Err(exception) => exception.value().cloned().into_iter().collect(),
        };
        self.maybe_collect(&live);
    }

    fn run_program(&self, program: &parser::Program, origin: Rc<str>) -> Result<Value, Exception> {
        self.check_stack()?;
        self.frames
            .borrow_mut()
            .push(CallFrame::script("", origin.clone(), 1));
        let env = Env {
            scope: self.realm.global_scope,
            this: Value::HeapObject(self.realm.global),
            source: origin,
        };
        let result = self.run_top_level(program, &env);
        self.frames.borrow_mut().pop();
        result
    }

    fn run_top_level(&self, program: &parser::Program, env: &Env) -> Result<Value, Exception> {
        let global = self.realm.global;
        for name in &program.var_names {
            if !self.has_property(global, name) {
                self.define_own(global, name, Value::Undefined, true);
            }
        }
        self.instantiate_functions(&program.body, env, true)?;
        let mut last = Value::Undefined;
        for statement in &program.body {
            match self.exec_statement(statement, env)? {
                crate::exec::Completion::Normal(Some(value)) => last = value,
                crate::exec::Completion::Normal(None) => {}
                crate::exec::Completion::Return(value) => return Ok(value),
                crate::exec::Completion::Break | crate::exec::Completion::Continue => break,
            }
        }
        Ok(last)
    }

    // ----- calls -----

    /// Fails with a termination when an interrupt is pending. Natives that
    /// swallow errors of nested calls use this to keep termination
    /// uncatchable.
    pub fn check_interrupt(&self) -> Result<(), Exception> {
        if self.interrupt.is_interrupted() {
            return Err(Exception::Terminated {
                site: self.throw_site(),
            });
        }
        Ok(())
    }

    fn check_stack(&self) -> Result<(), Exception> {
        if self.stack_depth() >= self.flags.borrow().stack_limit {
            return Err(self.throw_error(ErrorKind::RangeError, "Maximum call stack size exceeded"));
        }
        Ok(())
    }

    fn function_data(&self, callee: &Value) -> Option<(ObjectId, FunctionData)> {
        let id = callee.as_object()?;
        let heap = self.heap.borrow();
        let data = heap.get(id)?.function()?.clone();
        Some((id, data))
    }

    /// Calls a function value; `describe` names the callee in errors.
    pub(crate) fn call_function(
        &self,
        callee: &Value,
        this: Value,
        args: &[Value],
    ) -> Result<Value, Exception> {
        self.call_described(callee, this, args, None)
    }

    pub(crate) fn call_described(
        &self,
        callee: &Value,
        this: Value,
        args: &[Value],
        describe: Option<&str>,
    ) -> Result<Value, Exception> {
        let Some((id, data)) = self.function_data(callee) else {
            let name = match describe {
                Some(name) => name.to_string(),
                None => self.to_display_string(callee),
            };
            return Err(self.throw_error(ErrorKind::TypeError, format!("{} is not a function", name)));
        };
        self.invoke(id, &data, this, args, false)
    }

    fn invoke(
        &self,
        id: ObjectId,
        data: &FunctionData,
        this: Value,
        args: &[Value],
        construct: bool,
    ) -> Result<Value, Exception> {
        self.check_interrupt()?;
        self.check_stack()?;
        match &data.code {
            FunctionCode::Native(code) => {
                let Some(native) = code.downcast_ref::<NativeFunction>() else {
                    return Err(self.throw_error(ErrorKind::InternalError, "unknown native code"));
                };
                let f = native.0.clone();
                self.frames
                    .borrow_mut()
                    .push(CallFrame::native(data.name.clone()));
                let result = f(
                    self,
                    NativeCall {
                        callee: id,
                        this,
                        args,
                        construct,
                    },
                );
                self.frames.borrow_mut().pop();
                result
            }
            FunctionCode::Script(code) => {
                let Some(script) = code.downcast_ref::<ScriptFunction>() else {
                    return Err(self.throw_error(ErrorKind::InternalError, "unknown script code"));
                };
                self.call_script(data, script, this, args)
            }
        }
    }

    fn call_script(
        &self,
        data: &FunctionData,
        script: &ScriptFunction,
        this: Value,
        args: &[Value],
    ) -> Result<Value, Exception> {
        let node = &script.node;
        let this = if this.is_nullish() {
            Value::HeapObject(self.realm.global)
        } else {
            this
        };
        let arguments = self.new_array(args.to_vec());
        let scope = {
            let mut scope = Scope::new(data.scope, true);
            for name in &node.var_names {
                scope.bindings.insert(name.clone(), binding(Value::Undefined, true));
            }
            scope
                .bindings
                .insert("arguments".to_string(), binding(Value::HeapObject(arguments), true));
            for (i, param) in node.params.iter().enumerate() {
                let value = args.get(i).cloned().unwrap_or(Value::Undefined);
                scope.bindings.insert(param.clone(), binding(value, true));
            }
            self.heap.borrow_mut().allocate_scope(scope)
        };
        let line = node.position.map_or(1, |p| p.line);
        self.frames
            .borrow_mut()
            .push(CallFrame::script(data.name.clone(), script.source.clone(), line));
        let env = Env {
            scope,
            this,
            source: script.source.clone(),
        };
        let result = self.run_function_body(&node.body, &env);
        self.frames.borrow_mut().pop();
        result
    }

    fn run_function_body(&self, body: &[parser::Statement], env: &Env) -> Result<Value, Exception> {
        self.instantiate_functions(body, env, false)?;
        for statement in body {
            match self.exec_statement(statement, env)? {
                crate::exec::Completion::Return(value) => return Ok(value),
                crate::exec::Completion::Normal(_) => {}
                crate::exec::Completion::Break | crate::exec::Completion::Continue => break,
            }
        }
        Ok(Value::Undefined)
    }

    pub(crate) fn construct_value(
        &self,
        callee: &Value,
        args: &[Value],
        describe: &str,
    ) -> Result<Value, Exception> {
        let data = match self.function_data(callee) {
            Some((id, data)) if data.constructor => (id, data),
            _ => {
                return Err(self.throw_error(
                    ErrorKind::TypeError,
                    format!("{} is not a constructor", describe),
                ))
            }
        };
        let proto = self
            .get_property(callee, "prototype")?
            .as_object()
            .unwrap_or(self.realm.object_prototype);
        let instance = Value::HeapObject(self.new_object_with_prototype(Some(proto)));
        let result = self.invoke(data.0, &data.1, instance.clone(), args, true)?;
        Ok(match result {
            Value::HeapObject(_) => result,
            _ => instance,
        })
    }

    // ----- allocation -----

    /// Allocates an object.
    pub fn alloc(&self, object: JsObject) -> ObjectId {
        self.heap.borrow_mut().allocate(object)
    }

    /// A new plain object inheriting from `Object.prototype`.
    pub fn new_object(&self) -> ObjectId {
        self.new_object_with_prototype(Some(self.realm.object_prototype))
    }

    /// A new plain object with the given prototype.
    pub fn new_object_with_prototype(&self, prototype: Option<ObjectId>) -> ObjectId {
        self.alloc(JsObject::new(ObjectKind::Ordinary, prototype))
    }

    /// A new array holding `elements`.
    pub fn new_array(&self, elements: Vec<Value>) -> ObjectId {
        self.alloc(JsObject::new(
            ObjectKind::Array(elements),
            Some(self.realm.array_prototype),
        ))
    }

    /// A new error object of `kind` with `message`.
    pub fn new_error(&self, kind: &ErrorKind, message: &str) -> ObjectId {
        self.new_error_with_prototype(self.realm.error_prototype(kind), Some(message))
    }

    /// A new error object; without a message `message` is inherited from
    /// the prototype.
    pub(crate) fn new_error_with_prototype(&self, prototype: ObjectId, message: Option<&str>) -> ObjectId {
        let mut object = JsObject::new(ObjectKind::Error, Some(prototype));
        if let Some(message) = message {
            object
                .properties
                .insert("message".to_string(), Value::String(message.to_string()), false);
        }
        self.alloc(object)
    }

    /// Wraps a Rust closure as a callable function object.
    ///
    /// The closure must not capture heap values: they are invisible to the
    /// collector. Keep per-function state in the function object's host data
    /// or internal slots instead.
    pub fn create_native_function<F>(&self, name: &str, f: F) -> ObjectId
    where
        F: Fn(&VM, NativeCall<'_>) -> Result<Value, Exception> + 'static,
    {
        self.create_native(name, NativeFunction::new(f), false)
    }

    /// Like [`VM::create_native_function`] but usable with `new`.
    pub fn create_native_constructor<F>(&self, name: &str, f: F) -> ObjectId
    where
        F: Fn(&VM, NativeCall<'_>) -> Result<Value, Exception> + 'static,
    {
        self.create_native(name, NativeFunction::new(f), true)
    }

    fn create_native(&self, name: &str, native: NativeFunction, constructor: bool) -> ObjectId {
        self.alloc(JsObject::new(
            ObjectKind::Function(FunctionData {
                name: name.to_string(),
                code: FunctionCode::Native(Rc::new(native)),
                scope: None,
                constructor,
            }),
            Some(self.realm.function_prototype),
        ))
    }

    pub(crate) fn create_closure(&self, node: &Rc<FunctionNode>, env: &Env) -> ObjectId {
        let name = node.name.clone().unwrap_or_default();
        let code = FunctionCode::Script(Rc::new(ScriptFunction {
            node: node.clone(),
            source: env.source.clone(),
        }));
        let function = self.alloc(JsObject::new(
            ObjectKind::Function(FunctionData {
                name: name.clone(),
                code,
                scope: Some(env.scope),
                constructor: true,
            }),
            Some(self.realm.function_prototype),
        ));
        let prototype = self.new_object();
        let mut heap = self.heap.borrow_mut();
        if let Some(proto) = heap.get_mut(prototype) {
            proto
                .properties
                .insert("constructor".to_string(), Value::HeapObject(function), false);
        }
        if let Some(f) = heap.get_mut(function) {
            f.properties
                .insert("prototype".to_string(), Value::HeapObject(prototype), false);
        }
        drop(heap);
        function
    }

    // ----- embedder helpers -----

    /// Defines an own property without consulting setters or arrays.
    pub fn define_own(&self, id: ObjectId, key: &str, value: Value, enumerable: bool) {
        if let Some(object) = self.heap.borrow_mut().get_mut(id) {
            object.properties.insert(key.to_string(), value, enumerable);
        }
    }

    /// Whether `id` has an own property `key`, array elements included.
    pub fn has_own_property(&self, id: ObjectId, key: &str) -> bool {
        let heap = self.heap.borrow();
        let Some(object) = heap.get(id) else {
            return false;
        };
        if let Some(elements) = object.elements() {
            if key == "length" {
                return true;
            }
            if let Some(index) = crate::ops::array_index(key) {
                return index < elements.len();
            }
        }
        object.properties.contains(key)
    }

    /// Elements of an array, `None` for other values.
    pub fn array_elements(&self, value: &Value) -> Option<Vec<Value>> {
        let id = value.as_object()?;
        self.heap.borrow().get(id)?.elements().cloned()
    }

    /// Whether `value` is callable.
    pub fn is_callable(&self, value: &Value) -> bool {
        value
            .as_object()
            .and_then(|id| self.heap.borrow().get(id).map(JsObject::is_callable))
            .unwrap_or(false)
    }

    /// Whether `value` is an array.
    pub fn is_array(&self, value: &Value) -> bool {
        value
            .as_object()
            .and_then(|id| self.heap.borrow().get(id).map(JsObject::is_array))
            .unwrap_or(false)
    }

    /// Whether `value` is an error object or inherits from `Error.prototype`.
    pub fn is_error(&self, value: &Value) -> bool {
        let Some(id) = value.as_object() else {
            return false;
        };
        let heap = self.heap.borrow();
        let Some(object) = heap.get(id) else {
            return false;
        };
        if matches!(object.kind, ObjectKind::Error) {
            return true;
        }
        let mut proto = object.prototype;
        while let Some(p) = proto {
            if p == self.realm.errors[0] {
                return true;
            }
            proto = heap.get(p).and_then(|o| o.prototype);
        }
        false
    }

    /// `[[Prototype]]` of an object.
    pub fn prototype_of(&self, id: ObjectId) -> Option<ObjectId> {
        self.heap.borrow().get(id)?.prototype
    }

    /// Replaces the `[[Prototype]]` of an object. Returns `false` when the
    /// change would create a cycle.
    pub fn set_prototype(&self, id: ObjectId, prototype: Option<ObjectId>) -> bool {
        let mut heap = self.heap.borrow_mut();
        let mut cursor = prototype;
        while let Some(p) = cursor {
            if p == id {
                return false;
            }
            cursor = heap.get(p).and_then(|o| o.prototype);
        }
        match heap.get_mut(id) {
            Some(object) => {
                object.prototype = prototype;
                true
            }
            None => false,
        }
    }

    /// Name of a function object.
    pub fn function_name(&self, id: ObjectId) -> Option<String> {
        Some(self.heap.borrow().get(id)?.function()?.name.clone())
    }

    /// Identity hash of a live object.
    pub fn identity_hash(&self, id: ObjectId) -> Option<u32> {
        self.heap.borrow().identity_hash(id)
    }

    /// Attaches embedder data to an object. Data of a swept object is
    /// dropped after the collection, outside of any heap borrow.
    pub fn set_host_data(&self, id: ObjectId, data: Box<dyn Any>) -> bool {
        self.heap.borrow_mut().set_host_data(id, data).is_ok()
    }

    /// Runs `f` on the embedder data of `id` if it has type `T`.
    ///
    /// `f` runs while the heap is borrowed and must not call into the VM.
    pub fn with_host_data<T: 'static, R>(&self, id: ObjectId, f: impl FnOnce(&T) -> R) -> Option<R> {
        let heap = self.heap.borrow();
        heap.host_data(id)?.downcast_ref::<T>().map(f)
    }

    /// Roots `value` until [`VM::release_root`] is called.
    pub fn add_root(&self, value: Value) -> RootId {
        self.heap.borrow_mut().add_root(value)
    }

    /// Current value of a root.
    pub fn get_root(&self, root: RootId) -> Option<Value> {
        self.heap.borrow().get_root(root)
    }

    /// Releases a root. Safe to call while the heap is borrowed, e.g. from a
    /// finalizer; the release is then applied before the next collection.
    pub fn release_root(&self, root: RootId) {
        match self.heap.try_borrow_mut() {
            Ok(mut heap) => heap.remove_root(root),
            Err(_) => self.pending_releases.borrow_mut().push(root),
        }
    }

    /// Adjusts the external memory attributed to the heap and returns the
    /// new total.
    pub fn adjust_external_memory(&self, delta: i64) -> i64 {
        match self.heap.try_borrow_mut() {
            Ok(mut heap) => heap.adjust_external_memory(delta),
            Err(_) => 0,
        }
    }

    /// Collector statistics.
    pub fn gc_stats(&self) -> GcStats {
        self.heap.borrow().stats()
    }

    // ----- collection -----

    /// Runs a full collection if no script is running. While script runs, or
    /// a [`HandleScope`] is open, the collection is deferred until control
    /// returns to the embedder, and `false` is returned.
    pub fn collect_garbage(&self) -> bool {
        if self.collection_blocked() {
            self.gc_requested.set(true);
            return false;
        }
        self.collect_with(&[]);
        true
    }

    /// Collects and reports whether the heap is settled: `true` once a
    /// collection freed nothing. Always `false` while script runs.
    pub fn idle_notification(&self) -> bool {
        if self.collection_blocked() {
            return false;
        }
        self.collect_with(&[]) == 0
    }

    fn maybe_collect(&self, live: &[Value]) {
        if self.handle_scopes.get() > 0 {
            return;
        }
        let stats = self.gc_stats();
        let interval = self.flags.borrow().gc_interval;
        let external_growth = stats.external_memory - self.external_at_last_gc.get();
        if self.gc_requested.get()
            || stats.allocations_since_gc >= interval
            || external_growth >= EXTERNAL_MEMORY_STEP
        {
            self.collect_with(live);
        }
    }

    fn collect_with(&self, live: &[Value]) -> usize {
        self.gc_requested.set(false);
        let (finalized, freed) = {
            let mut heap = self.heap.borrow_mut();
            for root in self.pending_releases.borrow_mut().drain(..) {
                heap.remove_root(root);
            }
            let mut roots = self.realm.roots();
            roots.extend_from_slice(live);
            let finalized = heap.collect_garbage(&roots);
            self.external_at_last_gc.set(heap.stats().external_memory);
            (finalized, heap.stats().last_freed)
        };
        drop(finalized);
        freed
    }

    // ----- errors -----

    pub(crate) fn throw_site(&self) -> ThrowSite {
        let frames = self.frames.borrow();
        let stack: Vec<_> = frames.iter().rev().map(CallFrame::to_stack_frame).collect();
        match frames.iter().rev().find(|f| f.is_script()) {
            Some(frame) => ThrowSite {
                source: frame.source.clone().unwrap_or_else(|| Rc::from("<unknown>")),
                line: frame.line.get(),
                stack,
            },
            None => ThrowSite {
                stack,
                ..ThrowSite::unknown()
            },
        }
    }

    pub(crate) fn set_position(&self, position: Option<SourcePosition>) {
        if let Some(position) = position {
            if let Some(frame) = self.frames.borrow().last() {
                frame.line.set(position.line);
                frame.column.set(position.column);
            }
        }
    }

    /// An exception throwing `value` from the current location.
    pub fn throw_value(&self, value: Value) -> Exception {
        Exception::Thrown {
            value,
            site: self.throw_site(),
        }
    }

    /// An exception throwing a new error of `kind`.
    pub fn throw_error(&self, kind: ErrorKind, message: impl Into<String>) -> Exception {
        let error = self.new_error(&kind, &message.into());
        self.throw_value(Value::HeapObject(error))
    }

    fn syntax_exception(&self, err: &JsError, origin: Rc<str>) -> Exception {
        let error = self.new_error(&ErrorKind::SyntaxError, &err.message);
        Exception::Thrown {
            value: Value::HeapObject(error),
            site: ThrowSite {
                source: origin,
                line: err.line(),
                stack: Vec::new(),
            },
        }
    }

    /// Describes an exception as a [`JsError`] carrying origin and line.
    ///
    /// Error objects keep their kind and message; any other thrown value is
    /// reported as [`ErrorKind::Thrown`] with its string conversion.
    pub fn describe_exception(&self, exception: &Exception) -> JsError {
        let site = exception.site();
        let (kind, message) = match exception {
            Exception::Terminated { .. } => (ErrorKind::Terminated, "execution terminated".to_string()),
            Exception::Thrown { value, .. } if self.is_error(value) => {
                let name = self
                    .get_property(value, "name")
                    .map(|v| self.to_display_string(&v))
                    .unwrap_or_else(|_| "Error".to_string());
                let message = self
                    .get_property(value, "message")
                    .map(|v| match v {
                        Value::Undefined => String::new(),
                        other => self.to_display_string(&other),
                    })
                    .unwrap_or_default();
                match ErrorKind::from_name(&name) {
                    Some(kind) => (kind, message),
                    None if message.is_empty() => (ErrorKind::Thrown, name),
                    None => (ErrorKind::Thrown, format!("{}: {}", name, message)),
                }
            }
            Exception::Thrown { value, .. } => (ErrorKind::Thrown, self.to_display_string(value)),
        };
        let mut error = JsError::new(kind, message).with_origin(
            site.source.to_string(),
            SourcePosition {
                line: site.line,
                column: 0,
                offset: 0,
            },
        );
        error.stack = site.stack.clone();
        error
    }
}

impl Default for VM {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for VM {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VM")
            .field("depth", &self.stack_depth())
            .field("flags", &*self.flags.borrow())
            .finish()
    }
}

pub(crate) fn binding(value: Value, mutable: bool) -> memory_manager::Binding {
    memory_manager::Binding { value, mutable }
}
