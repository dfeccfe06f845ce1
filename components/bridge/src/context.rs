//! The bridge context: one guest engine bound to one host runtime.

use crate::config::BridgeConfig;
use crate::error::{exception_message, BridgeError, BridgeResult, DEFAULT_ORIGIN};
use crate::identity::IdentityMap;
use crate::thread;
use crate::timeout::Canceller;
use core_types::Value;
use host_runtime::{HostCall, HostCode, HostError, HostRef, HostRuntime, HostValue};
use interpreter::VM;
use memory_manager::RootId;
use parking_lot::ReentrantMutex;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

static INSTANCES: AtomicU64 = AtomicU64::new(0);

/// State shared by the context and the wrappers it creates.
pub(crate) struct BridgeInner {
    pub(crate) vm: VM,
    pub(crate) host: Rc<HostRuntime>,
    /// Held by every entry point and call proxy. The context is not `Send`,
    /// so the lock only ever sees one thread and marks re-entrant entry.
    pub(crate) lock: ReentrantMutex<()>,
    pub(crate) config: RefCell<BridgeConfig>,
    pub(crate) identity: RefCell<IdentityMap>,
    pub(crate) prototypes: RefCell<HashMap<String, RootId>>,
    pub(crate) instance: u64,
    pub(crate) last_error: RefCell<Option<String>>,
    pub(crate) eval_depth: Cell<usize>,
    pub(crate) me: Weak<BridgeInner>,
}

impl BridgeInner {
    /// Remembers a non-fatal diagnostic.
    pub(crate) fn record_error(&self, message: String) {
        warn!(instance = self.instance, %message, "bridge diagnostic");
        *self.last_error.borrow_mut() = Some(message);
    }

    pub(crate) fn global(&self) -> Value {
        Value::HeapObject(self.vm.global_object())
    }
}

/// A guest execution environment bound to a host runtime.
///
/// Host values passed in through [`BridgeContext::bind`] or returned from
/// host functions appear in the guest as converted copies (arrays, hashes),
/// as prototype-backed proxies (blessed references) or as callable stubs
/// (code references). Guest values flow back the same way. Objects that
/// cross the boundary twice come back as the same object.
///
/// # Examples
///
/// ```
/// use bridge::{BridgeConfig, BridgeContext};
/// use host_runtime::{HostRuntime, HostValue};
/// use std::rc::Rc;
///
/// let context = BridgeContext::new(Rc::new(HostRuntime::new()), BridgeConfig::default());
/// context.bind("answer", HostValue::Int(41));
/// let result = context.evaluate("answer + 1", None).unwrap();
/// assert!(matches!(result, HostValue::Int(42)));
///
/// let err = context.evaluate("nope(", None).unwrap_err();
/// assert!(err.to_string().contains("EVAL"));
/// ```
pub struct BridgeContext {
    inner: Rc<BridgeInner>,
}

impl BridgeContext {
    /// Creates a context with its own guest engine.
    pub fn new(host: Rc<HostRuntime>, config: BridgeConfig) -> Self {
        let instance = INSTANCES.fetch_add(1, Ordering::Relaxed) + 1;
        let flags = config.engine_flags();
        let inner = Rc::new_cyclic(|me| BridgeInner {
            vm: VM::with_flags(flags),
            host,
            lock: ReentrantMutex::new(()),
            config: RefCell::new(config),
            identity: RefCell::new(IdentityMap::default()),
            prototypes: RefCell::new(HashMap::new()),
            instance,
            last_error: RefCell::new(None),
            eval_depth: Cell::new(0),
            me: me.clone(),
        });
        thread::install(&inner.vm);
        debug!(instance, "bridge context created");
        Self { inner }
    }

    /// Creates a context from a JSON configuration.
    pub fn from_json_config(host: Rc<HostRuntime>, json: &str) -> BridgeResult<Self> {
        Ok(Self::new(host, BridgeConfig::from_json(json)?))
    }

    /// Runs `source` and converts its completion value.
    ///
    /// `origin` names the script in diagnostics and defaults to `EVAL`. A
    /// top-level evaluation is cut short once the configured time limit
    /// elapses.
    pub fn evaluate(&self, source: &str, origin: Option<&str>) -> BridgeResult<HostValue> {
        let inner = &self.inner;
        let _lock = inner.lock.lock();
        let origin = origin.unwrap_or(DEFAULT_ORIGIN);
        let outermost = inner.eval_depth.get() == 0;
        let budget = inner.config.borrow().budget();
        inner.eval_depth.set(inner.eval_depth.get() + 1);
        let result = {
            let _canceller = budget
                .filter(|_| outermost)
                .map(|budget| Canceller::start(inner.vm.interrupt_handle(), budget));
            inner.vm.eval(source, origin)
        };
        inner.eval_depth.set(inner.eval_depth.get() - 1);
        if outermost {
            inner.vm.reset_interrupt();
        }
        match result {
            Ok(value) => Ok(inner.to_host(&value)),
            Err(exception) => Err(BridgeError::Script(exception_message(&inner.vm, &exception))),
        }
    }

    /// Makes `value` available to scripts as the global `name`.
    pub fn bind(&self, name: &str, value: HostValue) {
        let inner = &self.inner;
        let _lock = inner.lock.lock();
        let value = inner.to_guest(&value);
        inner.vm.define_own(inner.vm.global_object(), name, value, true);
    }

    /// Binds a host closure as the global function `name`.
    pub fn bind_function<F>(&self, name: &str, f: F)
    where
        F: Fn(&HostRuntime, HostCall) -> Result<Vec<HostValue>, HostError> + 'static,
    {
        let code = HostRef::new_code(HostCode::new(f).named(name));
        self.bind(name, HostValue::Ref(code));
    }

    /// Converts a host value into the guest. The result is only guaranteed
    /// to stay alive until the next call into the context unless it is
    /// stored somewhere reachable.
    pub fn to_guest(&self, value: &HostValue) -> Value {
        let _lock = self.inner.lock.lock();
        self.inner.to_guest(value)
    }

    /// Converts a guest value into the host.
    pub fn to_host(&self, value: &Value) -> HostValue {
        let _lock = self.inner.lock.lock();
        self.inner.to_host(value)
    }

    /// Runs a collection while idle. Returns `true` once nothing was left to
    /// reclaim.
    pub fn idle_notification(&self) -> bool {
        let _lock = self.inner.lock.lock();
        self.inner.vm.idle_notification()
    }

    /// Adjusts the external memory attributed to the guest heap and returns
    /// the new total.
    pub fn adjust_external_memory(&self, delta: i64) -> i64 {
        let _lock = self.inner.lock.lock();
        self.inner.vm.adjust_external_memory(delta)
    }

    /// Applies an engine flag string.
    pub fn set_flags_from_string(&self, flags: &str) {
        let _lock = self.inner.lock.lock();
        self.inner.vm.set_flags_from_string(flags);
    }

    /// Changes the time limit of later evaluations, in seconds.
    pub fn set_time_limit(&self, seconds: u64) {
        let _lock = self.inner.lock.lock();
        self.inner.config.borrow_mut().time_limit = seconds;
    }

    /// The most recent non-fatal diagnostic.
    pub fn last_error(&self) -> Option<String> {
        let _lock = self.inner.lock.lock();
        self.inner.last_error.borrow().clone()
    }

    /// Current configuration.
    pub fn config(&self) -> BridgeConfig {
        let _lock = self.inner.lock.lock();
        self.inner.config.borrow().clone()
    }

    /// Process-wide number of this context.
    pub fn instance(&self) -> u64 {
        self.inner.instance
    }

    /// The host runtime.
    pub fn host(&self) -> &Rc<HostRuntime> {
        &self.inner.host
    }

    /// The guest engine.
    pub fn engine(&self) -> &VM {
        &self.inner.vm
    }

    /// Number of host cells currently paired with a guest object.
    pub fn wrapper_count(&self) -> usize {
        self.inner.identity.borrow().len()
    }

    /// Number of cached class prototypes.
    pub fn prototype_count(&self) -> usize {
        self.inner.prototypes.borrow().len()
    }
}

impl Drop for BridgeContext {
    fn drop(&mut self) {
        let inner = &self.inner;
        let _lock = inner.lock.lock();
        while inner.vm.stack_depth() == 0 && !inner.vm.idle_notification() {}
        let roots: Vec<RootId> = inner.prototypes.borrow_mut().drain().map(|(_, root)| root).collect();
        for root in roots {
            inner.vm.release_root(root);
        }
        debug!(instance = inner.instance, "bridge context disposed");
    }
}

impl std::fmt::Debug for BridgeContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeContext")
            .field("instance", &self.inner.instance)
            .field("config", &*self.inner.config.borrow())
            .field("wrappers", &self.wrapper_count())
            .finish()
    }
}
