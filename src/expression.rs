/*!

An `Expression` computes a `Value` by reading variables from a `Scope`. Expressions play two roles: the source on
the right-hand side of a declaration or assignment, and the default expression of a pattern slot.

Default expressions are lazy. The unpacker only calls `evaluate` on a default when the candidate is absent, so a
default with side effects (see `Thunk`) runs at most once per unpacking and usually not at all.

*/

use std::{
  fmt::{Debug, Formatter as FmtFormatter},
  rc::Rc
};

use crate::{
  error::UnpackError,
  format::{
    display_formattable_impl,
    Formattable,
    Formatter,
  },
  interner::{
    InternedString,
    interned,
    interned_static,
    resolve_str
  },
  unpack::Bound,
  value::{
    format_key,
    is_identifier_name,
    Mapping,
    Value,
  },
};


/// Something that knows the current binding of a name.
pub trait Scope {
  /// Gives the binding of `name`: `Bound::Absent` for a variable that is declared but unset, an error for a
  /// variable that is not declared at all.
  fn lookup(&self, name: InternedString) -> Result<Bound, UnpackError>;
}


/// The scope in which nothing is declared.
#[derive(Copy, Clone, Debug, Default)]
pub struct EmptyScope;

impl Scope for EmptyScope {
  fn lookup(&self, name: InternedString) -> Result<Bound, UnpackError> {
    Err(UnpackError::UndeclaredVariable(resolve_str(name)))
  }
}


/// A host-provided computation, for defaults that cannot be written as plain expressions. It may fail, and it may
/// have side effects.
#[derive(Clone)]
pub struct Thunk(Rc<dyn Fn(&dyn Scope) -> Result<Value, UnpackError>>);

impl Thunk {
  pub fn new<F>(f: F) -> Thunk
    where F: Fn(&dyn Scope) -> Result<Value, UnpackError> + 'static
  {
    Thunk(Rc::new(f))
  }

  pub fn call(&self, scope: &dyn Scope) -> Result<Value, UnpackError> {
    (self.0)(scope)
  }
}

impl Debug for Thunk {
  fn fmt(&self, f: &mut FmtFormatter<'_>) -> std::fmt::Result {
    write!(f, "Thunk@{:p}", Rc::as_ptr(&self.0))
  }
}

// Two thunks are the same only if they are the same closure.
impl PartialEq for Thunk {
  fn eq(&self, other: &Self) -> bool {
    Rc::ptr_eq(&self.0, &other.0)
  }
}


/// An element of a sequence literal.
#[derive(Clone, Debug, PartialEq)]
pub enum Element {
  Item(Expression),
  /// `...expression`: splices in the elements of an iterable.
  Spread(Expression),
}

/// A property of a mapping literal.
#[derive(Clone, Debug, PartialEq)]
pub enum Property {
  Entry(InternedString, Expression),
  /// `...expression`: copies in the entries of a mapping.
  Spread(Expression),
}


#[derive(Clone, Debug, PartialEq)]
pub enum Expression {
  Literal(Value),
  Variable(InternedString),
  Sequence(Vec<Element>),
  Mapping(Vec<Property>),
  /// `object[key]` or `object.key`.
  Member {
    object: Box<Expression>,
    key   : Box<Expression>,
  },
  Computed(Thunk),
}


impl Expression {
  pub fn variable(name: &str) -> Expression {
    Expression::Variable(interned(name))
  }

  /// A sequence literal without spreads.
  pub fn sequence(items: Vec<Expression>) -> Expression {
    Expression::Sequence(items.into_iter().map(Element::Item).collect())
  }

  /// A mapping literal without spreads.
  pub fn mapping<'a, I>(entries: I) -> Expression
    where I: IntoIterator<Item = (&'a str, Expression)>
  {
    Expression::Mapping(
      entries.into_iter()
             .map(|(key, expression)| Property::Entry(interned(key), expression))
             .collect()
    )
  }

  pub fn member(object: Expression, key: impl Into<Expression>) -> Expression {
    Expression::Member {
      object: Box::new(object),
      key   : Box::new(key.into()),
    }
  }

  pub fn computed<F>(f: F) -> Expression
    where F: Fn(&dyn Scope) -> Result<Value, UnpackError> + 'static
  {
    Expression::Computed(Thunk::new(f))
  }

  /// Computes the value of `self`, reading variables from `scope`.
  pub fn evaluate(&self, scope: &dyn Scope) -> Result<Value, UnpackError> {
    match self {
      Expression::Literal(value) => Ok(value.clone()),

      Expression::Variable(name) => {
        // A declared but unset variable reads as `undefined`.
        match scope.lookup(*name)? {
          Bound::Present(value) => Ok(value),
          Bound::Absent         => Ok(Value::Undefined),
        }
      }

      Expression::Sequence(elements) => {
        let mut values = Vec::with_capacity(elements.len());
        for element in elements {
          match element {
            Element::Item(expression) => values.push(expression.evaluate(scope)?),

            Element::Spread(expression) => {
              let spread = expression.evaluate(scope)?;
              match spread.elements() {
                Some(spread_elements) => values.extend(spread_elements.iter().cloned()),
                None => {
                  return Err(UnpackError::TypeMismatch {
                    expected: "spread",
                    found   : spread.kind().to_string(),
                    pattern : self.to_string(),
                  });
                }
              }
            }
          }
        }
        Ok(Value::sequence(values))
      }

      Expression::Mapping(properties) => {
        let mut mapping = Mapping::new();
        for property in properties {
          match property {
            Property::Entry(key, expression) => {
              mapping.insert(*key, expression.evaluate(scope)?);
            }

            Property::Spread(expression) => {
              // Spreading anything without entries of its own contributes nothing.
              match expression.evaluate(scope)? {
                Value::Mapping(source) => {
                  for (key, value) in source.iter() {
                    mapping.insert(*key, value.clone());
                  }
                }
                Value::Sequence(source) => {
                  for (position, value) in source.iter().enumerate() {
                    mapping.insert(interned(&position.to_string()), value.clone());
                  }
                }
                _ => {}
              }
            }
          }
        }
        Ok(Value::mapping(mapping))
      }

      Expression::Member { object, key } => {
        let object_value = object.evaluate(scope)?;
        let key_value    = key.evaluate(scope)?;
        self.read_member(&object_value, &key_value)
      }

      Expression::Computed(thunk) => thunk.call(scope),
    }
  }

  /// Reads `object[key]`. Out of range indices, negative or fractional indices, and missing keys all read as
  /// `undefined`.
  fn read_member(&self, object: &Value, key: &Value) -> Result<Value, UnpackError> {
    if object.is_nullish() {
      return Err(UnpackError::NoMembers {
        found     : object.kind().to_string(),
        expression: self.to_string(),
      });
    }

    match object {
      Value::Sequence(_) | Value::String(_) => {
        if *key == Value::String(interned_static("length")) {
          let length = object.elements().map(|e| e.len()).unwrap_or(0);
          return Ok(Value::Integer(length as i64));
        }
        let element = key.as_index()
                         .and_then(|index| object.elements().and_then(|e| e.get(index).cloned()));
        Ok(element.unwrap_or(Value::Undefined))
      }

      Value::Mapping(mapping) => Ok(mapping.get(key.property_key()).cloned().unwrap_or(Value::Undefined)),

      _ => Ok(Value::Undefined),
    }
  }
}


impl Formattable for Expression {
  fn format(&self, formatter: &Formatter) -> String {
    match self {
      Expression::Literal(value) => value.format(formatter),

      Expression::Variable(name) => resolve_str(*name),

      Expression::Sequence(elements) => {
        let children = elements.iter()
                               .map(|element| {
                                 match element {
                                   Element::Item(e)   => e.format(formatter),
                                   Element::Spread(e) => format!("...{}", e.format(formatter)),
                                 }
                               })
                               .collect::<Vec<_>>();
        format!("[{}]", children.join(", "))
      }

      Expression::Mapping(properties) => {
        let children = properties.iter()
                                 .map(|property| {
                                   match property {
                                     Property::Entry(k, e) => format!("{}: {}", format_key(*k), e.format(formatter)),
                                     Property::Spread(e)   => format!("...{}", e.format(formatter)),
                                   }
                                 })
                                 .collect::<Vec<_>>();
        format!("{{{}}}", children.join(", "))
      }

      Expression::Member { object, key } => {
        match key.as_ref() {
          Expression::Literal(Value::String(name)) if is_identifier_name(&resolve_str(*name)) => {
            format!("{}.{}", object.format(formatter), resolve_str(*name))
          }
          key => format!("{}[{}]", object.format(formatter), key.format(formatter)),
        }
      }

      Expression::Computed(_) => "<computed>".to_string(),
    }
  }
}

display_formattable_impl!(Expression);


// region Conversions

impl From<Value> for Expression {
  fn from(value: Value) -> Self {
    Expression::Literal(value)
  }
}

impl From<bool> for Expression {
  fn from(v: bool) -> Self {
    Expression::Literal(v.into())
  }
}

impl From<i64> for Expression {
  fn from(v: i64) -> Self {
    Expression::Literal(v.into())
  }
}

impl From<i32> for Expression {
  fn from(v: i32) -> Self {
    Expression::Literal(v.into())
  }
}

impl From<f64> for Expression {
  fn from(v: f64) -> Self {
    Expression::Literal(v.into())
  }
}

/// A string literal, not a variable reference.
impl From<&str> for Expression {
  fn from(v: &str) -> Self {
    Expression::Literal(v.into())
  }
}

// endregion
