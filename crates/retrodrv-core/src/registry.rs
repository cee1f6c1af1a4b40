//! Compiled-in backend registries and index-based lookup by category label.

use std::fmt;

use crate::backend::{Backend, BackendFactory, InitContext};
use crate::category::DriverCategory;
use crate::error::DriverError;

/// Identifier reported by the explicit "no backend" entry.
pub const ABSENT_IDENT: &str = "null";

/// Default capacity of an [`IdentBuf`], in bytes.
pub const IDENT_CAPACITY: usize = 256;

/// One selectable entry of a category registry.
pub enum RegistryEntry {
    Backend {
        ident: &'static str,
        factory: BackendFactory,
    },
    /// Explicit absence of a backend. Forward cycling may land on it but
    /// never moves past it.
    Absent,
}

impl RegistryEntry {
    pub fn backend<F>(ident: &'static str, factory: F) -> Self
    where
        F: Fn(&InitContext<'_>) -> Result<Box<dyn Backend>, DriverError> + 'static,
    {
        RegistryEntry::Backend {
            ident,
            factory: Box::new(factory),
        }
    }

    pub fn ident(&self) -> &'static str {
        match self {
            RegistryEntry::Backend { ident, .. } => ident,
            RegistryEntry::Absent => ABSENT_IDENT,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, RegistryEntry::Absent)
    }
}

impl fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryEntry::Backend { ident, .. } => {
                f.debug_tuple("Backend").field(ident).finish()
            }
            RegistryEntry::Absent => f.write_str("Absent"),
        }
    }
}

/// Ordered backends of a single category. Order defines cycling order.
#[derive(Debug)]
pub struct Registry {
    category: DriverCategory,
    entries: Vec<RegistryEntry>,
}

impl Registry {
    pub fn new(category: DriverCategory, entries: Vec<RegistryEntry>) -> Self {
        Self { category, entries }
    }

    /// A registry holding only the explicit "no backend" entry.
    pub fn absent_only(category: DriverCategory) -> Self {
        Self::new(category, vec![RegistryEntry::Absent])
    }

    pub fn category(&self) -> DriverCategory {
        self.category
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn find_handle(&self, index: usize) -> Option<BackendHandle> {
        (index < self.entries.len()).then_some(BackendHandle {
            category: self.category,
            index,
        })
    }

    pub fn find_ident(&self, index: usize) -> Option<&'static str> {
        self.entries.get(index).map(RegistryEntry::ident)
    }

    pub fn entry(&self, index: usize) -> Option<&RegistryEntry> {
        self.entries.get(index)
    }

    pub fn idents(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(RegistryEntry::ident)
    }
}

/// Opaque reference to a registry entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BackendHandle {
    category: DriverCategory,
    index: usize,
}

impl BackendHandle {
    pub fn category(self) -> DriverCategory {
        self.category
    }

    pub fn index(self) -> usize {
        self.index
    }
}

/// Bounded identifier buffer.
///
/// Writes longer than the capacity are truncated on a character boundary.
#[derive(Clone, PartialEq, Eq)]
pub struct IdentBuf {
    text: String,
    capacity: usize,
}

impl IdentBuf {
    pub fn new() -> Self {
        Self::with_capacity(IDENT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            text: String::new(),
            capacity,
        }
    }

    /// Creates a buffer holding `ident` (truncated to the default capacity).
    pub fn from_ident(ident: &str) -> Self {
        let mut buf = Self::new();
        buf.set(ident);
        buf
    }

    pub fn set(&mut self, ident: &str) {
        let mut end = ident.len().min(self.capacity);
        while !ident.is_char_boundary(end) {
            end -= 1;
        }
        self.text.clear();
        self.text.push_str(&ident[..end]);
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for IdentBuf {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for IdentBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.text, f)
    }
}

impl fmt::Display for IdentBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl PartialEq<&str> for IdentBuf {
    fn eq(&self, other: &&str) -> bool {
        self.text == *other
    }
}

/// The full set of registries, one slot per category.
#[derive(Debug, Default)]
pub struct Registries {
    slots: [Option<Registry>; DriverCategory::COUNT],
}

impl Registries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registries containing only the explicit "no backend" entry for every
    /// compiled-in category.
    pub fn absent_only() -> Self {
        let mut registries = Self::new();
        for category in DriverCategory::ALL {
            registries.install(Registry::absent_only(category));
        }
        registries
    }

    /// Installs (or replaces) the registry for its category.
    ///
    /// Registries of categories compiled out of this build are dropped.
    pub fn install(&mut self, registry: Registry) {
        let category = registry.category();
        if !category.is_compiled_in() {
            log::debug!("Ignoring {category} registry; category is compiled out");
            return;
        }
        self.slots[category.slot()] = Some(registry);
    }

    pub fn get(&self, category: DriverCategory) -> Option<&Registry> {
        if !category.is_compiled_in() {
            return None;
        }
        self.slots[category.slot()].as_ref()
    }

    pub fn resolve(&self, label: &str) -> Result<&Registry, DriverError> {
        let category = DriverCategory::from_label(label)
            .ok_or_else(|| DriverError::UnknownLabel(label.to_string()))?;
        self.get(category)
            .ok_or(DriverError::CategoryUnavailable(category))
    }

    /// Looks up entry `index` of the category named by `label`, copying its
    /// identifier into `out` on success.
    ///
    /// Unknown labels and compiled-out categories yield `None` and leave
    /// `out` untouched.
    pub fn lookup(&self, label: &str, index: usize, out: &mut IdentBuf) -> Option<BackendHandle> {
        let registry = self.resolve(label).ok()?;
        let handle = registry.find_handle(index)?;
        if let Some(ident) = registry.find_ident(index) {
            out.set(ident);
        }
        Some(handle)
    }

    pub(crate) fn entry(&self, handle: BackendHandle) -> Option<&RegistryEntry> {
        self.get(handle.category())?.entry(handle.index())
    }
}
