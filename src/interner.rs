/*!
A global dictionary of interned strings. Variable names, mapping keys, and string values are all interned. The
dictionary sits behind a `Mutex`, so a name interned on one thread resolves to the same symbol on any other.
Provides an abstraction API for any interner library.

*/

use std::sync::{Mutex, MutexGuard, PoisonError};

use lazy_static::lazy_static;
use string_interner::{
  StringInterner,
  symbol::SymbolU32
};

pub type InternedString = SymbolU32;

lazy_static! {
  static ref STRING_INTERNER: Mutex<StringInterner> = Mutex::new(StringInterner::default());
}

// A panic while holding the lock cannot leave the interner half-updated, so a poisoned lock is still usable.
fn interner() -> MutexGuard<'static, StringInterner> {
  STRING_INTERNER.lock().unwrap_or_else(PoisonError::into_inner)
}


pub fn interned(string: &str) -> InternedString {
  interner().get_or_intern(string)
}


pub fn interned_static(string: &'static str) -> InternedString {
  interner().get_or_intern_static(string)
}


pub fn get_interned(string: &str) -> Option<InternedString> {
  interner().get(string)
}

/// Resolves `symbol` to an owned copy of its text. Symbols only come from this interner, so an unknown symbol
/// resolves to the empty string.
pub fn resolve_str(symbol: InternedString) -> String {
  resolve_str_checked(symbol).unwrap_or_default()
}

pub fn resolve_str_checked(symbol: InternedString) -> Option<String> {
  interner().resolve(symbol).map(str::to_owned)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn interning_is_idempotent() {
    let a = interned("isVerified");
    let b = interned_static("isVerified");
    assert_eq!(a, b);
    assert_eq!(resolve_str(a), "isVerified");
  }

  #[test]
  fn lookup_does_not_intern() {
    assert_eq!(get_interned("never interned by anyone 7d1f"), None);
    let symbol = interned("interned by lookup test");
    assert_eq!(get_interned("interned by lookup test"), Some(symbol));
  }

  #[test]
  fn symbols_agree_across_threads() {
    let here = interned("shared across threads");
    let there = std::thread::spawn(|| interned("shared across threads")).join();
    assert_eq!(there.ok(), Some(here));
  }
}
