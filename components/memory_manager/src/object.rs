//! Guest object representation
//!
//! Objects keep their own properties in insertion order, matching the
//! enumeration order scripts observe. Arrays keep their elements in a dense
//! vector next to the named properties.

use core_types::{ObjectId, Value};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// A named property slot.
#[derive(Debug, Clone)]
pub struct Property {
    /// Current value
    pub value: Value,
    /// Whether `for-in` and `Object.keys` report the property
    pub enumerable: bool,
}

/// Insertion-ordered property table.
#[derive(Debug, Clone, Default)]
pub struct PropertyMap {
    entries: Vec<(String, Property)>,
    index: HashMap<String, usize>,
}

impl PropertyMap {
    /// Looks up a property by name.
    pub fn get(&self, key: &str) -> Option<&Property> {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    /// Mutable lookup by name.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Property> {
        match self.index.get(key) {
            Some(&i) => Some(&mut self.entries[i].1),
            None => None,
        }
    }

    /// Inserts or overwrites a property. An existing property keeps its
    /// position and enumerability.
    pub fn insert(&mut self, key: String, value: Value, enumerable: bool) {
        if let Some(prop) = self.get_mut(&key) {
            prop.value = value;
            return;
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, Property { value, enumerable }));
    }

    /// Removes a property, returning whether it existed.
    pub fn remove(&mut self, key: &str) -> bool {
        let Some(pos) = self.index.remove(key) else {
            return false;
        };
        self.entries.remove(pos);
        for slot in self.index.values_mut() {
            if *slot > pos {
                *slot -= 1;
            }
        }
        true
    }

    /// Whether the table has `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Property)> {
        self.entries.iter().map(|(k, p)| (k.as_str(), p))
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no properties.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Executable payload of a function object.
///
/// The heap does not interpret code; the engine stores its compiled function
/// or native closure here and downcasts it back when calling.
#[derive(Clone)]
pub enum FunctionCode {
    /// Script-defined function
    Script(Rc<dyn Any>),
    /// Native function implemented by the embedder or engine
    Native(Rc<dyn Any>),
}

impl fmt::Debug for FunctionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FunctionCode::Script(_) => write!(f, "Script(..)"),
            FunctionCode::Native(_) => write!(f, "Native(..)"),
        }
    }
}

/// Function-specific object state.
#[derive(Debug, Clone)]
pub struct FunctionData {
    /// Function name, empty for anonymous functions
    pub name: String,
    /// Code to run on call
    pub code: FunctionCode,
    /// Captured scope for script closures
    pub scope: Option<ObjectId>,
    /// Whether `new` may be used with the function
    pub constructor: bool,
}

/// Object variants.
#[derive(Debug, Clone)]
pub enum ObjectKind {
    /// Plain object
    Ordinary,
    /// Array with dense elements
    Array(Vec<Value>),
    /// Callable object
    Function(FunctionData),
    /// Error instance created by an error constructor
    Error,
}

/// A guest heap object.
pub struct JsObject {
    /// Object variant
    pub kind: ObjectKind,
    /// `[[Prototype]]` link
    pub prototype: Option<ObjectId>,
    /// Named own properties
    pub properties: PropertyMap,
    /// Engine-internal values traced by the collector
    pub internal_slots: Vec<Value>,
    pub(crate) identity_hash: u32,
    pub(crate) host_data: Option<Box<dyn Any>>,
}

impl JsObject {
    /// Creates an object of the given kind and prototype.
    pub fn new(kind: ObjectKind, prototype: Option<ObjectId>) -> Self {
        Self {
            kind,
            prototype,
            properties: PropertyMap::default(),
            internal_slots: Vec::new(),
            identity_hash: 0,
            host_data: None,
        }
    }

    /// Whether the object is callable.
    pub fn is_callable(&self) -> bool {
        matches!(self.kind, ObjectKind::Function(_))
    }

    /// Whether the object is an array.
    pub fn is_array(&self) -> bool {
        matches!(self.kind, ObjectKind::Array(_))
    }

    /// Array elements, if this is an array.
    pub fn elements(&self) -> Option<&Vec<Value>> {
        match &self.kind {
            ObjectKind::Array(elements) => Some(elements),
            _ => None,
        }
    }

    /// Mutable array elements, if this is an array.
    pub fn elements_mut(&mut self) -> Option<&mut Vec<Value>> {
        match &mut self.kind {
            ObjectKind::Array(elements) => Some(elements),
            _ => None,
        }
    }

    /// Function state, if callable.
    pub fn function(&self) -> Option<&FunctionData> {
        match &self.kind {
            ObjectKind::Function(data) => Some(data),
            _ => None,
        }
    }

    /// Stable identity hash assigned at allocation.
    pub fn identity_hash(&self) -> u32 {
        self.identity_hash
    }
}

impl fmt::Debug for JsObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsObject")
            .field("kind", &self.kind)
            .field("prototype", &self.prototype)
            .field("properties", &self.properties.len())
            .field("host_data", &self.host_data.is_some())
            .finish()
    }
}

/// A variable binding in a scope.
#[derive(Debug, Clone)]
pub struct Binding {
    /// Current value
    pub value: Value,
    /// `false` for `const`
    pub mutable: bool,
}

/// A lexical scope record. Closures keep their defining scope alive.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    /// Bindings declared in this scope
    pub bindings: HashMap<String, Binding>,
    /// Enclosing scope
    pub parent: Option<ObjectId>,
    /// Whether this scope is a function body (the `var` target)
    pub function_scope: bool,
}

impl Scope {
    /// Creates an empty scope nested in `parent`.
    pub fn new(parent: Option<ObjectId>, function_scope: bool) -> Self {
        Self {
            bindings: HashMap::new(),
            parent,
            function_scope,
        }
    }
}
