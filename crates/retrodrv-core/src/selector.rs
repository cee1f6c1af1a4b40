//! Index/next/previous navigation over a category registry.
//!
//! Everything here works on identifier strings so that a settings UI can
//! cycle through backends without holding handles.

use log::warn;

use crate::registry::{IdentBuf, Registries};

impl Registries {
    /// Returns the index of `ident` (ASCII case-insensitive) in the registry
    /// named by `label`.
    ///
    /// The scan stops at the first index without an entry, or at an entry with
    /// an empty identifier.
    pub fn index_of(&self, label: &str, ident: &str) -> Option<usize> {
        let mut scratch = IdentBuf::new();
        for index in 0.. {
            self.lookup(label, index, &mut scratch)?;
            if scratch.as_str().is_empty() {
                return None;
            }
            if scratch.as_str().eq_ignore_ascii_case(ident) {
                return Some(index);
            }
        }
        None
    }

    /// Writes the identifier at index 0 into `ident`.
    ///
    /// Always returns `true`, even when the category has no entry at all (the
    /// buffer is then left untouched). Callers that need to know whether a
    /// first backend exists should use [`Registries::lookup`].
    pub fn first(&self, label: &str, ident: &mut IdentBuf) -> bool {
        let _ = self.lookup(label, 0, ident);
        true
    }

    /// Moves `ident` to the previous entry of the registry.
    ///
    /// Fails at index 0 or when `ident` is not registered, leaving it as is.
    pub fn previous(&self, label: &str, ident: &mut IdentBuf) -> bool {
        match self.index_of(label, ident.as_str()) {
            Some(index) if index > 0 => self.lookup(label, index - 1, ident).is_some(),
            _ => {
                warn!("Couldn't find any previous driver (current one: \"{ident}\")");
                false
            }
        }
    }

    /// Moves `ident` to the next entry of the registry.
    ///
    /// Fails when `ident` is not registered, when it names the explicit
    /// "no backend" entry, or when it is already the last entry; `ident` is
    /// left as is in every failure case.
    pub fn next(&self, label: &str, ident: &mut IdentBuf) -> bool {
        let advanced = self
            .index_of(label, ident.as_str())
            .filter(|&index| !self.is_absent_at(label, index))
            .is_some_and(|index| self.lookup(label, index + 1, ident).is_some());

        if !advanced {
            warn!("Couldn't find any next driver (current one: \"{ident}\")");
        }
        advanced
    }

    fn is_absent_at(&self, label: &str, index: usize) -> bool {
        self.resolve(label)
            .ok()
            .and_then(|registry| registry.entry(index))
            .is_some_and(|entry| entry.is_absent())
    }
}
