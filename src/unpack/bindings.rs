/*!

The result of unpacking: an ordered list of `Binding`s, each pairing a `Place` with a `Bound`.

Order matters. Bindings are listed in the order their slots are declared in the pattern, nested patterns expanded
in place, and they are applied to an environment in exactly that order.

*/

use std::rc::Rc;

use smallvec::SmallVec;

use crate::{
  error::UnpackError,
  expression::Scope,
  format::{
    display_formattable_impl,
    DisplayForm,
    Formattable,
    Formatter,
  },
  interner::{
    InternedString,
    get_interned,
    interned,
    resolve_str
  },
  pattern::MemberKey,
  value::{
    index_from_str,
    Value,
  },
};


/// What a target is bound to: either a value, or the absent sentinel.
#[derive(Clone, Debug, PartialEq)]
pub enum Bound {
  /// Nothing was found at the position or key. Distinct from every value, including `undefined`.
  Absent,
  Present(Value),
}

impl Bound {
  pub fn is_absent(&self) -> bool {
    matches!(self, Bound::Absent)
  }

  pub fn value(&self) -> Option<&Value> {
    match self {
      Bound::Present(value) => Some(value),
      Bound::Absent         => None,
    }
  }

  /// The value a program observes when it reads this binding. Absent reads as `undefined`.
  pub fn into_value(self) -> Value {
    match self {
      Bound::Present(value) => value,
      Bound::Absent         => Value::Undefined,
    }
  }

  /// The kind name used in diagnostics.
  pub(crate) fn describe(&self) -> String {
    match self {
      Bound::Present(value) => value.kind().to_string(),
      Bound::Absent         => "Absent".to_string(),
    }
  }
}

impl From<Value> for Bound {
  fn from(value: Value) -> Self {
    Bound::Present(value)
  }
}

impl From<Option<Value>> for Bound {
  fn from(value: Option<Value>) -> Self {
    value.map_or(Bound::Absent, Bound::Present)
  }
}

impl Formattable for Bound {
  fn format(&self, formatter: &Formatter) -> String {
    match self {
      Bound::Present(value) => value.format(formatter),
      Bound::Absent => {
        match formatter.form {
          DisplayForm::Output => "undefined".to_string(),
          DisplayForm::Input  => "<absent>".to_string(),
        }
      }
    }
  }
}

display_formattable_impl!(Bound);


/// Where a binding lands.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Place {
  Variable(InternedString),
  Member {
    object: InternedString,
    key   : MemberKey,
  },
}

impl Place {
  /// The variable this place lives in. For a member place, the variable holding the container.
  pub fn variable(&self) -> InternedString {
    match self {
      Place::Variable(name)         => *name,
      Place::Member { object, .. } => *object,
    }
  }
}

impl Formattable for Place {
  fn format(&self, formatter: &Formatter) -> String {
    match self {
      Place::Variable(name)          => resolve_str(*name),
      Place::Member { object, key } => format!("{}{}", resolve_str(*object), key.format(formatter)),
    }
  }
}

display_formattable_impl!(Place);


#[derive(Clone, Debug, PartialEq)]
pub struct Binding {
  pub place: Place,
  pub value: Bound,
}

impl Formattable for Binding {
  fn format(&self, formatter: &Formatter) -> String {
    format!("{}→{}", self.place.format(formatter), self.value.format(formatter))
  }
}

display_formattable_impl!(Binding);


/// Bindings in declaration order. Most patterns bind a handful of names, so they live on the stack.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Bindings(SmallVec<[Binding; 8]>);

impl Bindings {
  pub fn new() -> Bindings {
    Bindings::default()
  }

  pub fn push(&mut self, place: Place, value: Bound) {
    self.0.push(Binding { place, value });
  }

  /// The binding of the variable `name`. If a pattern binds a name twice, the later binding wins.
  pub fn get(&self, name: &str) -> Option<&Bound> {
    get_interned(name).and_then(|symbol| self.get_interned(symbol))
  }

  pub fn get_interned(&self, name: InternedString) -> Option<&Bound> {
    self.0
        .iter()
        .rev()
        .find(|binding| binding.place == Place::Variable(name))
        .map(|binding| &binding.value)
  }

  pub fn iter(&self) -> impl Iterator<Item = &Binding> {
    self.0.iter()
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}

impl IntoIterator for Bindings {
  type Item = Binding;
  type IntoIter = smallvec::IntoIter<[Binding; 8]>;

  fn into_iter(self) -> Self::IntoIter {
    self.0.into_iter()
  }
}

impl Formattable for Bindings {
  fn format(&self, formatter: &Formatter) -> String {
    self.0
        .iter()
        .map(|binding| binding.format(formatter))
        .collect::<Vec<_>>()
        .join(", ")
  }
}

display_formattable_impl!(Bindings);


/// How far past the end of a sequence a member write may reach. The gap is filled with `undefined`.
pub const MAX_PADDING: usize = 1 << 16;

/// Writes `value` to `place`, given `current`, the binding of the variable `place` lives in. A variable place is
/// replaced outright. A member place writes into the container, copying it first if it is shared.
pub(crate) fn store(current: &mut Bound, place: &Place, value: &Bound) -> Result<(), UnpackError> {
  let key = match place {
    Place::Variable(_) => {
      *current = value.clone();
      return Ok(());
    }
    Place::Member { key, .. } => key,
  };

  let element = value.clone().into_value();
  match current {
    Bound::Present(Value::Sequence(elements)) => {
      let index = match key {
        MemberKey::Index(index) => Some(*index),
        MemberKey::Key(key)     => index_from_str(&resolve_str(*key)),
      };
      let index = match index {
        Some(index) if index <= elements.len().saturating_add(MAX_PADDING) => index,
        _ => return Err(UnpackError::InvalidIndex(place.to_string())),
      };

      let elements = Rc::make_mut(elements);
      if index >= elements.len() {
        elements.resize(index + 1, Value::Undefined);
      }
      elements[index] = element;
      Ok(())
    }

    Bound::Present(Value::Mapping(mapping)) => {
      let key = match key {
        MemberKey::Key(key)     => *key,
        MemberKey::Index(index) => interned(&index.to_string()),
      };
      Rc::make_mut(mapping).insert(key, element);
      Ok(())
    }

    container => {
      Err(UnpackError::TypeMismatch {
        expected: "container",
        found   : container.describe(),
        pattern : place.to_string(),
      })
    }
  }
}


/// Bindings made so far, in front of an enclosing scope. Lets a default expression see what was bound to its left
/// in the same pattern, including writes into members: after `[arr[0], b = arr[0]]` binds `arr[0]`, the default
/// of `b` reads the new element.
pub(crate) struct LayeredScope<'a> {
  pub inner: &'a Bindings,
  pub outer: &'a dyn Scope,
}

impl<'a> Scope for LayeredScope<'a> {
  fn lookup(&self, name: InternedString) -> Result<Bound, UnpackError> {
    let mut current: Option<Bound> = None;
    for binding in self.inner.iter().filter(|binding| binding.place.variable() == name) {
      let mut bound = match (current.take(), &binding.place) {
        (Some(bound), _)                => bound,
        (None, Place::Variable(_))      => Bound::Absent,
        (None, Place::Member { .. })    => self.outer.lookup(name)?,
      };
      store(&mut bound, &binding.place, &binding.value)?;
      current = Some(bound);
    }

    match current {
      Some(bound) => Ok(bound),
      None        => self.outer.lookup(name),
    }
  }
}
