//! Intrinsic objects of an engine instance.

use core_types::{ErrorKind, ObjectId, Value};
use memory_manager::{FunctionCode, FunctionData, Heap, JsObject, ObjectKind, Scope};
use std::rc::Rc;

use crate::vm::NativeFunction;

/// Names of the error constructors, in the order of [`Realm::errors`].
pub const ERROR_NAMES: [&str; 7] = [
    "Error",
    "SyntaxError",
    "TypeError",
    "ReferenceError",
    "RangeError",
    "EvalError",
    "URIError",
];

/// Handles of the intrinsic objects. They are kept alive for the lifetime of
/// the engine regardless of what scripts do to the global object.
#[derive(Debug, Clone, Copy)]
pub struct Realm {
    /// The global object
    pub global: ObjectId,
    /// Scope holding top-level `let` and `const` bindings
    pub global_scope: ObjectId,
    /// `Object.prototype`
    pub object_prototype: ObjectId,
    /// `Function.prototype`
    pub function_prototype: ObjectId,
    /// `Array.prototype`
    pub array_prototype: ObjectId,
    /// `String.prototype`
    pub string_prototype: ObjectId,
    /// `Number.prototype`
    pub number_prototype: ObjectId,
    /// `Boolean.prototype`
    pub boolean_prototype: ObjectId,
    /// Error prototypes, indexed like [`ERROR_NAMES`]
    pub errors: [ObjectId; 7],
}

impl Realm {
    pub(crate) fn bootstrap(heap: &mut Heap) -> Self {
        let object_prototype = heap.allocate(JsObject::new(ObjectKind::Ordinary, None));
        let ordinary = |heap: &mut Heap, proto| {
            heap.allocate(JsObject::new(ObjectKind::Ordinary, Some(proto)))
        };
        let noop = NativeFunction::new(|_, _| Ok(Value::Undefined));
        let function_prototype = heap.allocate(JsObject::new(
            ObjectKind::Function(FunctionData {
                name: String::new(),
                code: FunctionCode::Native(Rc::new(noop)),
                scope: None,
                constructor: false,
            }),
            Some(object_prototype),
        ));
        let array_prototype = ordinary(heap, object_prototype);
        let string_prototype = ordinary(heap, object_prototype);
        let number_prototype = ordinary(heap, object_prototype);
        let boolean_prototype = ordinary(heap, object_prototype);
        let base_error = ordinary(heap, object_prototype);
        let mut errors = [base_error; 7];
        for slot in errors.iter_mut().skip(1) {
            *slot = ordinary(heap, base_error);
        }
        let global = ordinary(heap, object_prototype);
        let global_scope = heap.allocate_scope(Scope::new(None, false));
        Self {
            global,
            global_scope,
            object_prototype,
            function_prototype,
            array_prototype,
            string_prototype,
            number_prototype,
            boolean_prototype,
            errors,
        }
    }

    /// Prototype used for errors of `kind`. Kinds without a constructor of
    /// their own use `Error.prototype`.
    pub fn error_prototype(&self, kind: &ErrorKind) -> ObjectId {
        kind.name()
            .and_then(|name| ERROR_NAMES.iter().position(|n| *n == name))
            .map_or(self.errors[0], |i| self.errors[i])
    }

    /// Values the collector always treats as live.
    pub(crate) fn roots(&self) -> Vec<Value> {
        let mut roots = vec![
            Value::HeapObject(self.global),
            Value::HeapObject(self.global_scope),
            Value::HeapObject(self.object_prototype),
            Value::HeapObject(self.function_prototype),
            Value::HeapObject(self.array_prototype),
            Value::HeapObject(self.string_prototype),
            Value::HeapObject(self.number_prototype),
            Value::HeapObject(self.boolean_prototype),
        ];
        roots.extend(self.errors.iter().map(|id| Value::HeapObject(*id)));
        roots
    }
}
