//! The guest `Thread` constructor.
//!
//! `new Thread(source, origin)` compiles `source` in a fresh engine on its
//! own OS thread; it must evaluate to a function. `start(arg)` calls that
//! function with the string form of `arg`, and `join()` waits for the call
//! and returns the string form of its result. The worker shares nothing
//! with the creating engine: only strings cross between them.

use crate::error::{exception_message, DEFAULT_ORIGIN};
use core_types::{ErrorKind, ObjectId, Value};
use crossbeam::channel::{bounded, Receiver, Sender};
use interpreter::{EngineFlags, Exception, NativeCall, VM};
use std::cell::RefCell;
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

type Outcome = Result<String, String>;

enum ThreadState {
    Ready(Sender<String>, JoinHandle<Outcome>),
    Running(JoinHandle<Outcome>),
    Joined,
}

/// Installs `Thread` on the global object of `vm`.
pub(crate) fn install(vm: &VM) {
    let constructor = vm.create_native_constructor("Thread", construct);
    let prototype = vm.new_object();
    let start_fn = vm.create_native_function("start", start);
    let join_fn = vm.create_native_function("join", join);
    vm.define_own(prototype, "start", Value::HeapObject(start_fn), false);
    vm.define_own(prototype, "join", Value::HeapObject(join_fn), false);
    vm.define_own(prototype, "constructor", Value::HeapObject(constructor), false);
    vm.define_own(constructor, "prototype", Value::HeapObject(prototype), false);
    vm.define_own(vm.global_object(), "Thread", Value::HeapObject(constructor), false);
}

fn construct(vm: &VM, call: NativeCall<'_>) -> Result<Value, Exception> {
    let Some(instance) = call.this.as_object().filter(|_| call.construct) else {
        return Err(vm.throw_error(ErrorKind::TypeError, "Thread must be called with new"));
    };
    let source = vm.to_string_value(&call.arg(0))?;
    let origin = match call.arg(1) {
        Value::Undefined => DEFAULT_ORIGIN.to_string(),
        origin => vm.to_string_value(&origin)?,
    };
    let flags = vm.flags();
    let (ready_tx, ready_rx) = bounded::<Result<(), String>>(1);
    let (start_tx, start_rx) = bounded::<String>(1);
    let worker = thread::Builder::new()
        .name("guest-thread".to_string())
        .spawn(move || run_worker(source, origin, flags, ready_tx, start_rx))
        .map_err(|err| vm.throw_error(ErrorKind::Error, err.to_string()))?;

    let failure = match ready_rx.recv() {
        Ok(Ok(())) => None,
        Ok(Err(message)) => Some(message),
        Err(_) => Some("Thread failed to start".to_string()),
    };
    if let Some(message) = failure {
        drop(start_tx);
        if worker.join().is_err() {
            warn!("guest thread panicked during startup");
        }
        return Err(vm.throw_error(ErrorKind::Error, message));
    }
    vm.set_host_data(
        instance,
        Box::new(RefCell::new(ThreadState::Ready(start_tx, worker))),
    );
    Ok(call.this)
}

fn run_worker(
    source: String,
    origin: String,
    flags: EngineFlags,
    ready: Sender<Result<(), String>>,
    start: Receiver<String>,
) -> Outcome {
    let vm = VM::with_flags(flags);
    let function = match vm.eval(&source, &origin) {
        Ok(function) if vm.is_callable(&function) => function,
        Ok(_) => {
            let message = "Not a function.".to_string();
            let _ = ready.send(Err(message.clone()));
            return Err(message);
        }
        Err(exception) => {
            let message = exception_message(&vm, &exception);
            let _ = ready.send(Err(message.clone()));
            return Err(message);
        }
    };
    let root = vm.add_root(function.clone());
    if ready.send(Ok(())).is_err() {
        return Err("Thread abandoned".to_string());
    }
    let Ok(arg) = start.recv() else {
        debug!("guest thread dropped before start");
        return Err("Thread abandoned".to_string());
    };
    let global = Value::HeapObject(vm.global_object());
    let outcome = vm
        .call(&function, &global, &[Value::String(arg)])
        .and_then(|result| vm.to_string_value(&result))
        .map_err(|exception| exception_message(&vm, &exception));
    vm.release_root(root);
    outcome
}

fn this_state(vm: &VM, call: &NativeCall<'_>) -> Result<ObjectId, Exception> {
    call.this
        .as_object()
        .filter(|id| vm.with_host_data::<RefCell<ThreadState>, _>(*id, |_| ()).is_some())
        .ok_or_else(|| vm.throw_error(ErrorKind::TypeError, "Receiver is not a Thread"))
}

fn start(vm: &VM, call: NativeCall<'_>) -> Result<Value, Exception> {
    let id = this_state(vm, &call)?;
    let arg = vm.to_string_value(&call.arg(0))?;
    let taken = vm.with_host_data::<RefCell<ThreadState>, _>(id, |state| {
        state.replace(ThreadState::Joined)
    });
    match taken {
        Some(ThreadState::Ready(sender, worker)) => {
            let _ = sender.send(arg);
            vm.with_host_data::<RefCell<ThreadState>, _>(id, |state| {
                state.replace(ThreadState::Running(worker))
            });
            Ok(Value::Undefined)
        }
        Some(previous) => {
            vm.with_host_data::<RefCell<ThreadState>, _>(id, |state| state.replace(previous));
            Err(vm.throw_error(ErrorKind::Error, "Thread already started"))
        }
        None => Err(vm.throw_error(ErrorKind::TypeError, "Receiver is not a Thread")),
    }
}

fn join(vm: &VM, call: NativeCall<'_>) -> Result<Value, Exception> {
    let id = this_state(vm, &call)?;
    let taken = vm.with_host_data::<RefCell<ThreadState>, _>(id, |state| {
        state.replace(ThreadState::Joined)
    });
    let worker = match taken {
        Some(ThreadState::Running(worker)) => worker,
        Some(ThreadState::Ready(sender, worker)) => {
            vm.with_host_data::<RefCell<ThreadState>, _>(id, |state| {
                state.replace(ThreadState::Ready(sender, worker))
            });
            return Err(vm.throw_error(ErrorKind::Error, "Thread not started"));
        }
        Some(ThreadState::Joined) => return Err(vm.throw_error(ErrorKind::Error, "Thread already joined")),
        None => return Err(vm.throw_error(ErrorKind::TypeError, "Receiver is not a Thread")),
    };
    match worker.join() {
        Ok(Ok(result)) => Ok(Value::String(result)),
        Ok(Err(message)) => Err(vm.throw_error(ErrorKind::Error, message)),
        Err(_) => Err(vm.throw_error(ErrorKind::Error, "Thread panicked")),
    }
}
