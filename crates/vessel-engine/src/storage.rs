use std::fmt;
use gc::{Gc, GcCell, Trace, Finalize};

use crate::status::Status;
use crate::variant::{Compare, Variant};

/// Nesting depth at which rendering, comparison and deep copies give up.
pub(crate) const MAX_RECURSION: usize = 100;

/// Containers currently being walked, outermost first
pub(crate) type Visiting = Vec<*const ()>;

/// Container pairs currently being compared
pub(crate) type Comparing = Vec<(*const (), *const ())>;

/// Shared, GC-managed sequence storage.
///
/// Cloning an `ArrayRef` shares the storage; it never copies elements.
#[derive(Clone, Trace, Finalize)]
pub struct ArrayRef {
    cell: Gc<GcCell<Vec<Variant>>>,
}

impl ArrayRef {
    pub(crate) fn new(items: Vec<Variant>) -> Self {
        Self {
            cell: Gc::new(GcCell::new(items)),
        }
    }

    pub fn len(&self) -> usize {
        self.cell.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cell.borrow().is_empty()
    }

    /// True when both refer to the same storage
    pub fn ptr_eq(&self, other: &ArrayRef) -> bool {
        Gc::ptr_eq(&self.cell, &other.cell)
    }

    fn addr(&self) -> *const () {
        &*self.cell as *const GcCell<Vec<Variant>> as *const ()
    }

    pub(crate) fn with<R>(&self, f: impl FnOnce(&Vec<Variant>) -> R) -> R {
        f(&self.cell.borrow())
    }

    pub(crate) fn with_mut<R>(&self, f: impl FnOnce(&mut Vec<Variant>) -> R) -> R {
        f(&mut self.cell.borrow_mut())
    }

    /// Copy the elements into new storage. A deep copy of an array that
    /// contains itself, or nests past `MAX_RECURSION`, fails with
    /// `Status::Failed`.
    pub(crate) fn duplicate(&self, deep: bool) -> Result<ArrayRef, Status> {
        self.duplicate_in(deep, &mut Visiting::new())
    }

    pub(crate) fn duplicate_in(&self, deep: bool, visiting: &mut Visiting) -> Result<ArrayRef, Status> {
        enter("duplicate", self.addr(), visiting)?;
        let items = self.with(|items| {
            items
                .iter()
                .map(|v| v.duplicate_in(deep, visiting))
                .collect::<Result<Vec<_>, _>>()
        });
        visiting.pop();
        items.map(ArrayRef::new)
    }

    pub(crate) fn equals(&self, other: &ArrayRef, mode: Compare, comparing: &mut Comparing) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        let pair = (self.addr(), other.addr());
        if comparing.contains(&pair) {
            return true;
        }
        if comparing.len() >= MAX_RECURSION {
            log::error!("comparison stopped at nesting depth {}", MAX_RECURSION);
            return false;
        }

        comparing.push(pair);
        let equal = self.with(|a| {
            other.with(|b| a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.equals(y, mode, comparing)))
        });
        comparing.pop();
        equal
    }

    pub(crate) fn render(&self, f: &mut fmt::Formatter<'_>, visiting: &mut Visiting) -> fmt::Result {
        if visiting.contains(&self.addr()) || visiting.len() >= MAX_RECURSION {
            return f.write_str("[...]");
        }

        visiting.push(self.addr());
        let result = self.with(|items| {
            f.write_str("[")?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                item.render(f, true, visiting)?;
            }
            f.write_str("]")
        });
        visiting.pop();
        result
    }
}

/// Mark `addr` as being walked, refusing cycles and runaway nesting.
fn enter(operation: &str, addr: *const (), visiting: &mut Visiting) -> Result<(), Status> {
    if visiting.contains(&addr) {
        log::error!("{} found a container that contains itself", operation);
        return Err(Status::Failed);
    }
    if visiting.len() >= MAX_RECURSION {
        log::error!("{} stopped at nesting depth {}", operation, MAX_RECURSION);
        return Err(Status::Failed);
    }
    visiting.push(addr);
    Ok(())
}

impl PartialEq for ArrayRef {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other, Compare::Value, &mut Comparing::new())
    }
}

impl fmt::Debug for ArrayRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f, &mut Visiting::new())
    }
}

impl fmt::Display for ArrayRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f, &mut Visiting::new())
    }
}

/// One key/value pair of a dictionary
#[derive(Debug, Clone, Trace, Finalize)]
pub(crate) struct Entry {
    pub(crate) key: Variant,
    pub(crate) value: Variant,
}

/// Shared, GC-managed mapping storage (insertion ordered, vector of pairs).
///
/// Keys are matched with [`Variant::key_eq`], so a `NaN` key finds itself.
#[derive(Clone, Trace, Finalize)]
pub struct DictRef {
    cell: Gc<GcCell<Vec<Entry>>>,
}

impl DictRef {
    pub(crate) fn new(entries: Vec<Entry>) -> Self {
        Self {
            cell: Gc::new(GcCell::new(entries)),
        }
    }

    pub fn len(&self) -> usize {
        self.cell.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cell.borrow().is_empty()
    }

    pub fn ptr_eq(&self, other: &DictRef) -> bool {
        Gc::ptr_eq(&self.cell, &other.cell)
    }

    fn addr(&self) -> *const () {
        &*self.cell as *const GcCell<Vec<Entry>> as *const ()
    }

    pub(crate) fn with<R>(&self, f: impl FnOnce(&Vec<Entry>) -> R) -> R {
        f(&self.cell.borrow())
    }

    pub(crate) fn with_mut<R>(&self, f: impl FnOnce(&mut Vec<Entry>) -> R) -> R {
        f(&mut self.cell.borrow_mut())
    }

    pub(crate) fn position(&self, key: &Variant) -> Option<usize> {
        self.with(|entries| entries.iter().position(|e| e.key.key_eq(key)))
    }

    pub(crate) fn get(&self, key: &Variant) -> Option<Variant> {
        self.with(|entries| entries.iter().find(|e| e.key.key_eq(key)).map(|e| e.value.clone()))
    }

    /// Insert or overwrite, keeping the original position of an existing key.
    pub(crate) fn upsert(&self, key: Variant, value: Variant) {
        match self.position(&key) {
            Some(index) => self.with_mut(|entries| entries[index].value = value),
            None => self.with_mut(|entries| entries.push(Entry { key, value })),
        }
    }

    /// Same contract as [`ArrayRef::duplicate`]
    pub(crate) fn duplicate(&self, deep: bool) -> Result<DictRef, Status> {
        self.duplicate_in(deep, &mut Visiting::new())
    }

    pub(crate) fn duplicate_in(&self, deep: bool, visiting: &mut Visiting) -> Result<DictRef, Status> {
        enter("duplicate", self.addr(), visiting)?;
        let entries = self.with(|entries| {
            entries
                .iter()
                .map(|e| -> Result<Entry, Status> {
                    Ok(Entry {
                        key: e.key.duplicate_in(deep, visiting)?,
                        value: e.value.duplicate_in(deep, visiting)?,
                    })
                })
                .collect::<Result<Vec<_>, Status>>()
        });
        visiting.pop();
        entries.map(DictRef::new)
    }

    /// Same size and every key of `self` maps to an equal value in
    /// `other`. Entry order is ignored.
    pub(crate) fn equals(&self, other: &DictRef, mode: Compare, comparing: &mut Comparing) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        let pair = (self.addr(), other.addr());
        if comparing.contains(&pair) {
            return true;
        }
        if comparing.len() >= MAX_RECURSION {
            log::error!("comparison stopped at nesting depth {}", MAX_RECURSION);
            return false;
        }

        comparing.push(pair);
        let equal = self.with(|a| {
            other.with(|b| {
                if a.len() != b.len() {
                    return false;
                }
                for entry in a {
                    let mut matched = None;
                    for candidate in b {
                        if candidate.key.equals(&entry.key, Compare::Key, comparing) {
                            matched = Some(candidate);
                            break;
                        }
                    }
                    match matched {
                        Some(candidate) if candidate.value.equals(&entry.value, mode, comparing) => {}
                        _ => return false,
                    }
                }
                true
            })
        });
        comparing.pop();
        equal
    }

    pub(crate) fn render(&self, f: &mut fmt::Formatter<'_>, visiting: &mut Visiting) -> fmt::Result {
        if visiting.contains(&self.addr()) || visiting.len() >= MAX_RECURSION {
            return f.write_str("{...}");
        }

        visiting.push(self.addr());
        let result = self.with(|entries| {
            f.write_str("{")?;
            for (i, entry) in entries.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                entry.key.render(f, true, visiting)?;
                f.write_str(": ")?;
                entry.value.render(f, true, visiting)?;
            }
            f.write_str("}")
        });
        visiting.pop();
        result
    }
}

impl PartialEq for DictRef {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other, Compare::Value, &mut Comparing::new())
    }
}

impl fmt::Debug for DictRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f, &mut Visiting::new())
    }
}

impl fmt::Display for DictRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f, &mut Visiting::new())
    }
}
