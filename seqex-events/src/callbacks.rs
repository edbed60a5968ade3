use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Handle returned when a callback is registered; used to remove it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackId(u64);

impl fmt::Display for CallbackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cb#{}", self.0)
    }
}

/// Ordered list of callbacks invoked synchronously in registration order.
///
/// The list is snapshotted before each trigger, so callbacks may register or
/// deregister entries (including themselves) while being invoked. Changes take
/// effect from the next trigger.
pub struct CallbackList<A> {
    next_id: Cell<u64>,
    entries: RefCell<Vec<(CallbackId, Rc<dyn Fn(A)>)>>,
}

impl<A: Clone> CallbackList<A> {
    pub fn new() -> Self {
        Self {
            next_id: Cell::new(0),
            entries: RefCell::new(Vec::new()),
        }
    }

    pub fn register(&self, callback: Rc<dyn Fn(A)>) -> CallbackId {
        let id = CallbackId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.entries.borrow_mut().push((id, callback));
        id
    }

    /// Returns false if `id` was not registered.
    pub fn deregister(&self, id: CallbackId) -> bool {
        let mut entries = self.entries.borrow_mut();
        match entries.iter().position(|(entry, _)| *entry == id) {
            Some(index) => {
                entries.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, id: CallbackId) -> bool {
        self.entries.borrow().iter().any(|(entry, _)| *entry == id)
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn trigger(&self, value: A) {
        let snapshot: Vec<Rc<dyn Fn(A)>> = self
            .entries
            .borrow()
            .iter()
            .map(|(_, callback)| Rc::clone(callback))
            .collect();

        for callback in snapshot {
            callback(value.clone());
        }
    }
}

impl<A: Clone> Default for CallbackList<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> fmt::Debug for CallbackList<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackList")
            .field("len", &self.entries.borrow().len())
            .finish()
    }
}
