/*!

A `Mapping` is a collection of key/value pairs with unique keys. Key order does not matter for lookup or for
equality, but a `Mapping` remembers insertion order so that it prints, and rest-captures, deterministically.

 */

use fnv::FnvHashMap;

use crate::interner::{
  InternedString,
  interned
};

use super::Value;


#[derive(Clone, Debug, Default)]
pub struct Mapping {
  entries: Vec<(InternedString, Value)>,
  /// Position of each key in `entries`.
  index  : FnvHashMap<InternedString, usize>,
}


impl Mapping {
  pub fn new() -> Mapping {
    Mapping::default()
  }

  /// Builds a mapping from string keys. A repeated key keeps its first position and its last value.
  pub fn from_pairs<'a, I>(pairs: I) -> Mapping
    where I: IntoIterator<Item = (&'a str, Value)>
  {
    pairs.into_iter()
         .map(|(key, value)| (interned(key), value))
         .collect()
  }

  /// Inserts `value` under `key`, returning the previous value. Overwriting keeps the original position.
  pub fn insert(&mut self, key: InternedString, value: Value) -> Option<Value> {
    match self.index.get(&key) {
      Some(&position) => Some(std::mem::replace(&mut self.entries[position].1, value)),
      None => {
        self.index.insert(key, self.entries.len());
        self.entries.push((key, value));
        None
      }
    }
  }

  pub fn get(&self, key: InternedString) -> Option<&Value> {
    self.index.get(&key).map(|&position| &self.entries[position].1)
  }

  pub fn contains_key(&self, key: InternedString) -> bool {
    self.index.contains_key(&key)
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Entries in insertion order.
  pub fn iter(&self) -> impl Iterator<Item = &(InternedString, Value)> {
    self.entries.iter()
  }

  pub fn keys(&self) -> impl Iterator<Item = InternedString> + '_ {
    self.entries.iter().map(|(key, _)| *key)
  }

  /// A new mapping holding every entry whose key is not in `excluded`.
  pub fn without(&self, excluded: &[InternedString]) -> Mapping {
    self.entries
        .iter()
        .filter(|(key, _)| !excluded.contains(key))
        .cloned()
        .collect()
  }
}


impl PartialEq for Mapping {
  fn eq(&self, other: &Self) -> bool {
    self.len() == other.len()
        && self.entries.iter().all(|(key, value)| other.get(*key) == Some(value))
  }
}


impl FromIterator<(InternedString, Value)> for Mapping {
  fn from_iter<T: IntoIterator<Item = (InternedString, Value)>>(iter: T) -> Self {
    let mut mapping = Mapping::new();
    for (key, value) in iter {
      mapping.insert(key, value);
    }
    mapping
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn insertion_order_is_kept() {
    let mapping = Mapping::from_pairs([("id", Value::from(42)), ("isVerified", Value::from(true))]);
    let keys: Vec<InternedString> = mapping.keys().collect();
    assert_eq!(keys, vec![interned("id"), interned("isVerified")]);
  }

  #[test]
  fn overwrite_keeps_position() {
    let mut mapping = Mapping::from_pairs([("a", Value::from(1)), ("b", Value::from(2))]);
    let previous = mapping.insert(interned("a"), Value::from(10));
    assert_eq!(previous, Some(Value::from(1)));
    assert_eq!(mapping.len(), 2);
    assert_eq!(mapping.iter().next(), Some(&(interned("a"), Value::from(10))));
  }

  #[test]
  fn equality_ignores_order() {
    let left  = Mapping::from_pairs([("p", Value::from(42)), ("q", Value::from(true))]);
    let right = Mapping::from_pairs([("q", Value::from(true)), ("p", Value::from(42))]);
    assert_eq!(left, right);

    let different = Mapping::from_pairs([("p", Value::from(42)), ("q", Value::from(false))]);
    assert_ne!(left, different);
  }

  #[test]
  fn without_drops_named_keys() {
    let mapping = Mapping::from_pairs([("a", Value::from(1)), ("b", Value::from(2)), ("c", Value::from(3))]);
    let rest = mapping.without(&[interned("b")]);
    assert_eq!(rest, Mapping::from_pairs([("a", Value::from(1)), ("c", Value::from(3))]));
    assert!(!rest.contains_key(interned("b")));
  }
}
