//! Name interning.
//!
//! Type names (`::String`), method names (`to_str`) and type variable names
//! (`'a`) are compared and hashed constantly during relation checking. An
//! `Atom` is a shared, immutable string: cloning is a reference-count bump,
//! and atoms created through the same [`Interner`] share one allocation.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;
use std::sync::{Arc, OnceLock};

/// An interned name.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Atom(Arc<str>);

impl Atom {
    /// Intern `text` through the process-wide interner.
    pub fn new(text: &str) -> Self {
        global().intern(text)
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for Atom {
    type Target = str;

    #[inline]
    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Atom {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Atom {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Atom {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for Atom {
    fn from(text: String) -> Self {
        Self::new(&text)
    }
}

impl PartialEq<str> for Atom {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for Atom {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

impl fmt::Debug for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", &*self.0)
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Concurrent string interner.
///
/// Safe to share between checking sessions running on different threads.
#[derive(Default)]
pub struct Interner {
    strings: DashMap<Arc<str>, ()>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the shared atom for `text`, allocating it on first use.
    pub fn intern(&self, text: &str) -> Atom {
        if let Some(entry) = self.strings.get(text) {
            return Atom(Arc::clone(entry.key()));
        }
        let shared: Arc<str> = Arc::from(text);
        // A concurrent insert of the same text may win the race; either copy is valid.
        let entry = self.strings.entry(shared).or_insert(());
        Atom(Arc::clone(entry.key()))
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

fn global() -> &'static Interner {
    static GLOBAL: OnceLock<Interner> = OnceLock::new();
    GLOBAL.get_or_init(Interner::new)
}

#[cfg(test)]
#[path = "../tests/interner_tests.rs"]
mod tests;
