//! Reference-counted host cells.
//!
//! Every container, code value and boxed scalar lives in a [`HostCell`]
//! behind an `Rc`. The address of the cell is its identity: it is stable for
//! as long as any [`HostRef`] to it survives. Cells may be blessed into a
//! class and may carry native attachments ("magic") that are dropped
//! together with the cell.

use crate::error::HostError;
use crate::runtime::HostRuntime;
use crate::value::HostValue;
use std::any::Any;
use std::cell::{Ref, RefCell, RefMut};
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

/// Calling context requested by the caller of a code value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallContext {
    /// A single result is wanted
    Scalar,
    /// All results are wanted
    List,
}

/// Arguments of a host function invocation.
#[derive(Debug)]
pub struct HostCall {
    /// The code cell being invoked
    pub callee: HostRef,
    /// Arguments; for method calls the invocant comes first
    pub args: Vec<HostValue>,
    /// Requested context
    pub context: CallContext,
    /// Whether the call was dispatched as a method
    pub method: bool,
}

/// Signature of host functions.
pub type HostFn = Rc<dyn Fn(&HostRuntime, HostCall) -> Result<Vec<HostValue>, HostError>>;

/// A code value.
#[derive(Clone)]
pub struct HostCode {
    /// Name for diagnostics, `None` for anonymous code
    pub name: Option<String>,
    /// The implementation
    pub func: HostFn,
}

impl HostCode {
    /// Wraps a closure as anonymous code.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&HostRuntime, HostCall) -> Result<Vec<HostValue>, HostError> + 'static,
    {
        Self {
            name: None,
            func: Rc::new(f),
        }
    }

    /// Sets the diagnostic name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl fmt::Debug for HostCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostCode").field("name", &self.name).finish()
    }
}

/// Payload of a cell.
#[derive(Debug)]
pub enum HostData {
    /// A boxed scalar
    Scalar(HostValue),
    /// A sequential container
    Array(Vec<HostValue>),
    /// An associative container
    Hash(HashMap<String, HostValue>),
    /// A code value
    Code(HostCode),
}

/// Kind tag of a cell's payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostKind {
    /// [`HostData::Scalar`]
    Scalar,
    /// [`HostData::Array`]
    Array,
    /// [`HostData::Hash`]
    Hash,
    /// [`HostData::Code`]
    Code,
}

/// A heap cell of the host runtime.
pub struct HostCell {
    data: RefCell<HostData>,
    blessed: RefCell<Option<String>>,
    magic: RefCell<Vec<Box<dyn Any>>>,
}

impl Drop for HostCell {
    fn drop(&mut self) {
        // Attachments may reference other cells; drop them outside the borrow.
        let magic = std::mem::take(self.magic.get_mut());
        drop(magic);
    }
}

/// A counted reference to a [`HostCell`].
#[derive(Clone)]
pub struct HostRef(Rc<HostCell>);

/// A non-owning reference to a [`HostCell`].
#[derive(Clone)]
pub struct WeakHostRef(Weak<HostCell>);

impl HostRef {
    fn from_data(data: HostData) -> Self {
        Self(Rc::new(HostCell {
            data: RefCell::new(data),
            blessed: RefCell::new(None),
            magic: RefCell::new(Vec::new()),
        }))
    }

    /// A reference to a new boxed scalar.
    pub fn new_scalar(value: HostValue) -> Self {
        Self::from_data(HostData::Scalar(value))
    }

    /// A reference to a new array.
    pub fn new_array(elements: Vec<HostValue>) -> Self {
        Self::from_data(HostData::Array(elements))
    }

    /// A reference to a new hash.
    pub fn new_hash(entries: HashMap<String, HostValue>) -> Self {
        Self::from_data(HostData::Hash(entries))
    }

    /// A reference to new code.
    pub fn new_code(code: HostCode) -> Self {
        Self::from_data(HostData::Code(code))
    }

    /// Identity of the referenced cell.
    pub fn address(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }

    /// Number of counted references to the cell.
    pub fn refcount(&self) -> usize {
        Rc::strong_count(&self.0)
    }

    /// Whether both references point at the same cell.
    pub fn ptr_eq(&self, other: &HostRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// A weak reference to the cell.
    pub fn downgrade(&self) -> WeakHostRef {
        WeakHostRef(Rc::downgrade(&self.0))
    }

    /// Borrows the payload.
    pub fn data(&self) -> Ref<'_, HostData> {
        self.0.data.borrow()
    }

    /// Mutably borrows the payload.
    pub fn data_mut(&self) -> RefMut<'_, HostData> {
        self.0.data.borrow_mut()
    }

    /// Kind of the payload.
    pub fn kind(&self) -> HostKind {
        match &*self.data() {
            HostData::Scalar(_) => HostKind::Scalar,
            HostData::Array(_) => HostKind::Array,
            HostData::Hash(_) => HostKind::Hash,
            HostData::Code(_) => HostKind::Code,
        }
    }

    /// Class the cell is blessed into.
    pub fn blessed(&self) -> Option<String> {
        self.0.blessed.borrow().clone()
    }

    /// Blesses the cell into `class`. Prefer [`HostRuntime::bless`], which
    /// also registers the class.
    pub fn bless(&self, class: &str) {
        *self.0.blessed.borrow_mut() = Some(class.to_string());
    }

    /// The code payload, if this is a code reference.
    pub fn code(&self) -> Option<HostCode> {
        match &*self.data() {
            HostData::Code(code) => Some(code.clone()),
            _ => None,
        }
    }

    /// Array elements, if this is an array reference.
    pub fn array_elements(&self) -> Option<Vec<HostValue>> {
        match &*self.data() {
            HostData::Array(elements) => Some(elements.clone()),
            _ => None,
        }
    }

    /// Hash entries, if this is a hash reference. Order is unspecified.
    pub fn hash_entries(&self) -> Option<Vec<(String, HostValue)>> {
        match &*self.data() {
            HostData::Hash(entries) => Some(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
            ),
            _ => None,
        }
    }

    /// Element `index` of an array reference.
    pub fn array_get(&self, index: usize) -> Option<HostValue> {
        match &*self.data() {
            HostData::Array(elements) => elements.get(index).cloned(),
            _ => None,
        }
    }

    /// Appends to an array reference. Returns `false` for other kinds.
    pub fn array_push(&self, value: HostValue) -> bool {
        match &mut *self.data_mut() {
            HostData::Array(elements) => {
                elements.push(value);
                true
            }
            _ => false,
        }
    }

    /// Entry `key` of a hash reference.
    pub fn hash_get(&self, key: &str) -> Option<HostValue> {
        match &*self.data() {
            HostData::Hash(entries) => entries.get(key).cloned(),
            _ => None,
        }
    }

    /// Stores into a hash reference. Returns `false` for other kinds.
    pub fn hash_insert(&self, key: impl Into<String>, value: HostValue) -> bool {
        match &mut *self.data_mut() {
            HostData::Hash(entries) => {
                entries.insert(key.into(), value);
                true
            }
            _ => false,
        }
    }

    /// Number of elements or entries; `None` for scalars and code.
    pub fn element_count(&self) -> Option<usize> {
        match &*self.data() {
            HostData::Array(elements) => Some(elements.len()),
            HostData::Hash(entries) => Some(entries.len()),
            _ => None,
        }
    }

    /// Attaches native data, dropped together with the cell.
    pub fn attach_magic(&self, magic: Box<dyn Any>) {
        self.0.magic.borrow_mut().push(magic);
    }

    /// Runs `f` on the first attachment of type `T`.
    ///
    /// `f` must not attach or detach magic on the same cell.
    pub fn with_magic<T: 'static, R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        let magic = self.0.magic.borrow();
        magic.iter().find_map(|m| m.downcast_ref::<T>()).map(f)
    }

    /// Whether an attachment of type `T` is present.
    pub fn has_magic<T: 'static>(&self) -> bool {
        self.with_magic::<T, _>(|_| ()).is_some()
    }

    /// Detaches and returns the first attachment of type `T`.
    pub fn take_magic<T: 'static>(&self) -> Option<Box<T>> {
        let mut magic = self.0.magic.borrow_mut();
        let index = magic.iter().position(|m| m.is::<T>())?;
        magic.remove(index).downcast::<T>().ok()
    }
}

impl fmt::Debug for HostRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostRef")
            .field("address", &format_args!("0x{:x}", self.address()))
            .field("kind", &self.kind())
            .field("blessed", &self.blessed())
            .finish()
    }
}

impl PartialEq for HostRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for HostRef {}

impl WeakHostRef {
    /// The cell, if it is still alive.
    pub fn upgrade(&self) -> Option<HostRef> {
        self.0.upgrade().map(HostRef)
    }
}

impl fmt::Debug for WeakHostRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("WeakHostRef")
    }
}
