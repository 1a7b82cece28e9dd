/*!

Dynamic values: the things that get unpacked and the things that get bound.

A `Value` is immutable. Compound values share their children through `Rc`, so cloning a value is cheap and a
clone is a snapshot: mutating a variable's value through `Rc::make_mut` never disturbs a clone taken earlier.

There is deliberately no "absent" value here. Absence is not a value a program can hold; it is the result of
looking past the end of a sequence or for a missing key, and it is represented by `Bound::Absent` in the
`unpack` module. `Value::Undefined` is an explicit value that happens to be spelled `undefined`.

*/

mod mapping;

use std::{
  borrow::Cow,
  rc::Rc
};

use strum_macros::{
  Display,
  EnumDiscriminants,
  IntoStaticStr
};

use crate::{
  format::{
    display_formattable_impl,
    DisplayForm,
    Formattable,
    Formatter,
  },
  interner::{
    InternedString,
    interned,
    resolve_str
  },
};

pub use mapping::Mapping;


#[derive(Clone, PartialEq, Debug, IntoStaticStr, EnumDiscriminants)]
#[strum_discriminants(name(ValueKind))]
#[strum_discriminants(derive(Display, Hash))]
pub enum Value {
  Undefined,
  Null,
  Boolean(bool),
  Integer(i64),
  Real(f64),
  String(InternedString),
  Sequence(Rc<Vec<Value>>),
  Mapping(Rc<Mapping>),
}


impl Value {
  pub fn sequence(elements: Vec<Value>) -> Value {
    Value::Sequence(Rc::new(elements))
  }

  pub fn mapping(mapping: Mapping) -> Value {
    Value::Mapping(Rc::new(mapping))
  }

  pub fn string(text: &str) -> Value {
    Value::String(interned(text))
  }

  /// Reports the `ValueKind` of `self`.
  pub fn kind(&self) -> ValueKind {
    self.into()
  }

  pub fn as_sequence(&self) -> Option<&[Value]> {
    match self {
      Value::Sequence(elements) => Some(elements.as_slice()),
      _                         => None
    }
  }

  pub fn as_mapping(&self) -> Option<&Mapping> {
    match self {
      Value::Mapping(mapping) => Some(mapping.as_ref()),
      _                       => None
    }
  }

  pub fn as_string(&self) -> Option<String> {
    match self {
      Value::String(text) => Some(resolve_str(*text)),
      _                   => None
    }
  }

  /// The elements a sequence pattern walks over. Sequences yield their elements. Strings are iterable too and
  /// yield one single-character string per character. Everything else is not iterable.
  pub fn elements(&self) -> Option<Cow<'_, [Value]>> {
    match self {
      Value::Sequence(elements) => Some(Cow::Borrowed(elements.as_slice())),

      Value::String(text) => {
        let characters = resolve_str(*text)
            .chars()
            .map(|c| Value::string(&c.to_string()))
            .collect::<Vec<_>>();
        Some(Cow::Owned(characters))
      }

      _ => None
    }
  }

  /// `undefined` or `null`, the values that have no members at all.
  pub fn is_nullish(&self) -> bool {
    matches!(self, Value::Undefined | Value::Null)
  }

  /// The sequence position this value names when used as a member key: a non-negative integer, an integral real,
  /// or the canonical text of one (`'1'` but not `'01'`). Anything else names no position.
  pub fn as_index(&self) -> Option<usize> {
    match self {
      Value::Integer(n) if *n >= 0 => {
        usize::try_from(*n).ok().filter(|index| *index <= MAX_INDEX)
      }

      Value::Real(v) if *v >= 0.0 && v.fract() == 0.0 && *v <= MAX_INDEX as f64 => Some(*v as usize),

      Value::String(text) => index_from_str(&resolve_str(*text)),

      _ => None,
    }
  }

  /// The mapping key this value names when used as a member key. Strings name themselves, anything else names
  /// its printed text, so `o[1]` and `o['1']` are the same member.
  pub fn property_key(&self) -> InternedString {
    match self {
      Value::String(text) => *text,
      Value::Real(v) if v.fract() == 0.0 && v.abs() < i64::MAX as f64 => interned(&(*v as i64).to_string()),
      other => interned(&other.format(&DisplayForm::Output.into())),
    }
  }
}


/// The largest position a sequence element can have, one less than the largest array length an ECMAScript engine
/// allows.
pub const MAX_INDEX: usize = u32::MAX as usize - 1;

/// Parses the canonical decimal text of a sequence position.
pub(crate) fn index_from_str(text: &str) -> Option<usize> {
  let canonical = text == "0" || (!text.is_empty() && !text.starts_with('0'));
  if !canonical || !text.bytes().all(|b| b.is_ascii_digit()) {
    return None;
  }
  text.parse::<usize>().ok().filter(|index| *index <= MAX_INDEX)
}


impl Formattable for Value {
  fn format(&self, formatter: &Formatter) -> String {
    match self {
      Value::Undefined => "undefined".to_string(),
      Value::Null      => "null".to_string(),
      Value::Boolean(v) => v.to_string(),
      Value::Integer(v) => v.to_string(),
      Value::Real(v)    => format_real(*v),

      Value::String(v) => {
        let text = resolve_str(*v);
        if formatter.form == DisplayForm::Output && formatter.is_top_level() {
          text
        } else {
          quote(&text)
        }
      }

      Value::Sequence(elements) => {
        let children = elements.iter()
                               .map(|e| e.format(&formatter.nested()))
                               .collect::<Vec<_>>();
        bracket('[', ']', &children, formatter)
      }

      Value::Mapping(mapping) => {
        let children = mapping.iter()
                              .map(|(k, v)| format!("{}: {}", format_key(*k), v.format(&formatter.nested())))
                              .collect::<Vec<_>>();
        bracket('{', '}', &children, formatter)
      }
    }
  }
}

display_formattable_impl!(Value);


// Reals print the way a script author wrote them: `3` rather than `3.0`.
fn format_real(value: f64) -> String {
  if value.is_nan() {
    "NaN".to_string()
  } else if value.is_infinite() {
    if value > 0.0 { "Infinity".to_string() } else { "-Infinity".to_string() }
  } else {
    format!("{}", value)
  }
}

fn bracket(open: char, close: char, children: &[String], formatter: &Formatter) -> String {
  if children.is_empty() {
    format!("{}{}", open, close)
  } else if formatter.form == DisplayForm::Output {
    format!("{} {} {}", open, children.join(", "), close)
  } else {
    format!("{}{}{}", open, children.join(", "), close)
  }
}

pub(crate) fn quote(text: &str) -> String {
  let mut quoted = String::with_capacity(text.len() + 2);
  quoted.push('\'');
  for c in text.chars() {
    match c {
      '\'' => quoted.push_str("\\'"),
      '\\' => quoted.push_str("\\\\"),
      '\n' => quoted.push_str("\\n"),
      '\t' => quoted.push_str("\\t"),
      c    => quoted.push(c),
    }
  }
  quoted.push('\'');
  quoted
}

/// Keys that are valid identifiers print bare, everything else is quoted.
pub(crate) fn format_key(key: InternedString) -> String {
  let text = resolve_str(key);
  if is_identifier_name(&text) { text } else { quote(&text) }
}

pub(crate) fn is_identifier_name(text: &str) -> bool {
  let mut chars = text.chars();
  match chars.next() {
    Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {
      chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
    }
    _ => false
  }
}


// region Conversions

impl From<bool> for Value {
  fn from(v: bool) -> Self {
    Value::Boolean(v)
  }
}

impl From<i64> for Value {
  fn from(v: i64) -> Self {
    Value::Integer(v)
  }
}

impl From<i32> for Value {
  fn from(v: i32) -> Self {
    Value::Integer(v as i64)
  }
}

impl From<f64> for Value {
  fn from(v: f64) -> Self {
    Value::Real(v)
  }
}

impl From<&str> for Value {
  fn from(v: &str) -> Self {
    Value::string(v)
  }
}

impl From<String> for Value {
  fn from(v: String) -> Self {
    Value::string(&v)
  }
}

impl From<Vec<Value>> for Value {
  fn from(v: Vec<Value>) -> Self {
    Value::sequence(v)
  }
}

impl From<Mapping> for Value {
  fn from(v: Mapping) -> Self {
    Value::mapping(v)
  }
}

// endregion
