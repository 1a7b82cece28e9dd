/*!

An `Environment` is a variable table. Each record holds a variable's current `Bound` and the kind of declaration
that created it. The environment is the `Scope` that source and default expressions read from.

Assignment is simultaneous. `assign` evaluates its whole source first, which takes a snapshot because values are
copy-on-write, and only then applies the bindings, in declared order, to a staged copy of the table. The staged
copy replaces the live table only once every binding has been applied, so a failing assignment changes nothing:

```text
let a = 1, b = 3;
[a, b] = [b, a];            a→3, b→1
```

*/

use fnv::FnvHashMap;
use strum_macros::{
  Display,
  EnumString,
  IntoStaticStr
};

use crate::{
  error::UnpackError,
  expression::{
    Expression,
    Scope,
  },
  interner::{
    InternedString,
    get_interned,
    interned,
    resolve_str
  },
  logging::{
    log,
    Channel,
  },
  pattern::Target,
  unpack::{
    store,
    Bindings,
    Bound,
    Place,
    Unpacker,
  },
  value::Value,
};


#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum DeclarationKind {
  Let,
  Const,
  Var,
}


#[derive(Clone, Debug, PartialEq)]
pub struct VariableRecord {
  pub value: Bound,
  pub kind : DeclarationKind,
}


#[derive(Clone, Debug, Default)]
pub struct Environment {
  variables: FnvHashMap<InternedString, VariableRecord>,
}

impl Environment {
  pub fn new() -> Environment {
    Environment::default()
  }

  /// Declares `name` without a value, `let name;`. It reads as `undefined` until it is assigned. A `const` cannot
  /// be declared without an initializer. Redeclaring an existing `var` with `var name;` keeps its value.
  pub fn declare(&mut self, kind: DeclarationKind, name: &str) -> Result<(), UnpackError> {
    if kind == DeclarationKind::Const {
      return Err(UnpackError::MissingInitializer(name.to_string()));
    }
    if kind == DeclarationKind::Var && self.kind_of(name) == Some(DeclarationKind::Var) {
      return Ok(());
    }
    log(Channel::Debug, 4, format!("Declaring {} {}", kind, name).as_str());
    self.variables.insert(interned(name), VariableRecord { value: Bound::Absent, kind });
    Ok(())
  }

  /// Declares every variable `target` binds when it is matched against the value of `source`. A redeclared name
  /// shadows the earlier declaration. Only `var` may bind the same name twice, in which case the later binding wins.
  pub fn declare_with(&mut self, kind: DeclarationKind, target: &Target, source: &Expression)
      -> Result<Bindings, UnpackError>
  {
    let value = source.evaluate(self)?;
    let bindings = Unpacker::with_scope(self).unpack_target(Bound::Present(value), target, None)?;

    // Validate everything before declaring anything.
    let mut seen: Vec<InternedString> = Vec::with_capacity(bindings.len());
    for binding in bindings.iter() {
      match binding.place {
        Place::Variable(name) => {
          if kind != DeclarationKind::Var && seen.contains(&name) {
            return Err(UnpackError::DuplicateBinding(resolve_str(name)));
          }
          seen.push(name);
        }
        place => {
          return Err(UnpackError::InvalidDeclarationTarget(place.to_string()));
        }
      }
    }

    for binding in bindings.iter() {
      log(Channel::Debug, 4, format!("Declaring {} {}", kind, binding).as_str());
      self.variables.insert(
        binding.place.variable(),
        VariableRecord { value: binding.value.clone(), kind }
      );
    }

    Ok(bindings)
  }

  /// Rebinds existing variables, or members of them, from `source`. Either every binding is applied or none is.
  pub fn assign(&mut self, target: &Target, source: &Expression) -> Result<Bindings, UnpackError> {
    // The snapshot: the entire source is computed before anything is written.
    let value = source.evaluate(self)?;
    let bindings = Unpacker::with_scope(self).unpack_target(Bound::Present(value), target, None)?;

    let mut staged = self.variables.clone();
    for binding in bindings.iter() {
      apply(&mut staged, &binding.place, &binding.value)?;
    }

    log(Channel::Debug, 4, format!("Assigning {}", bindings).as_str());
    self.variables = staged;
    Ok(bindings)
  }

  /// The binding of a declared variable. `Bound::Absent` means declared but never assigned.
  pub fn get(&self, name: &str) -> Result<Bound, UnpackError> {
    match get_interned(name) {
      Some(symbol) => self.lookup(symbol),
      None         => Err(UnpackError::UndeclaredVariable(name.to_string())),
    }
  }

  /// The value a program observes when it reads `name`.
  pub fn value_of(&self, name: &str) -> Result<Value, UnpackError> {
    self.get(name).map(Bound::into_value)
  }

  pub fn kind_of(&self, name: &str) -> Option<DeclarationKind> {
    get_interned(name)
        .and_then(|symbol| self.variables.get(&symbol))
        .map(|record| record.kind)
  }

  pub fn is_declared(&self, name: &str) -> bool {
    self.kind_of(name).is_some()
  }

  pub fn len(&self) -> usize {
    self.variables.len()
  }

  pub fn is_empty(&self) -> bool {
    self.variables.is_empty()
  }
}

impl Scope for Environment {
  fn lookup(&self, name: InternedString) -> Result<Bound, UnpackError> {
    self.variables
        .get(&name)
        .map(|record| record.value.clone())
        .ok_or_else(|| UnpackError::UndeclaredVariable(resolve_str(name)))
  }
}


/// Writes one binding into a variable table.
fn apply(
  variables: &mut FnvHashMap<InternedString, VariableRecord>,
  place    : &Place,
  value    : &Bound
) -> Result<(), UnpackError>
{
  let name = place.variable();
  let record = match variables.get_mut(&name) {
    Some(record) => record,
    None         => return Err(UnpackError::UndeclaredVariable(resolve_str(name))),
  };

  // Writing into a member mutates the container, which is allowed even for a `const` variable.
  if let (Place::Variable(_), DeclarationKind::Const) = (place, record.kind) {
    return Err(UnpackError::AssignToConstant(resolve_str(name)));
  }
  store(&mut record.value, place, value)
}


#[cfg(test)]
mod tests {
  use crate::{
    pattern::{
      MappingPattern,
      MappingSlot,
      SequencePattern,
      SequenceSlot,
    },
    value::Mapping,
  };

  use super::*;

  fn integers(numbers: &[i64]) -> Value {
    Value::sequence(numbers.iter().map(|n| Value::from(*n)).collect())
  }

  fn declare(environment: &mut Environment, kind: DeclarationKind, name: &str, value: impl Into<Value>) {
    environment.declare_with(kind, &Target::variable(name), &Expression::Literal(value.into())).unwrap();
  }

  #[test]
  fn swap_two_variables() {
    let mut environment = Environment::new();
    declare(&mut environment, DeclarationKind::Let, "a", 1);
    declare(&mut environment, DeclarationKind::Let, "b", 3);

    let target = SequencePattern::variables(&["a", "b"]).into();
    let source = Expression::sequence(vec![Expression::variable("b"), Expression::variable("a")]);
    environment.assign(&target, &source).unwrap();

    assert_eq!(environment.value_of("a"), Ok(3.into()));
    assert_eq!(environment.value_of("b"), Ok(1.into()));
  }

  #[test]
  fn swap_two_positions_of_a_const_sequence() {
    let mut environment = Environment::new();
    declare(&mut environment, DeclarationKind::Const, "arr", integers(&[1, 2, 3]));

    let target = SequencePattern::new(vec![
      SequenceSlot::target(Target::index("arr", 2)),
      SequenceSlot::target(Target::index("arr", 1)),
    ]).into();
    let source = Expression::sequence(vec![
      Expression::member(Expression::variable("arr"), 1),
      Expression::member(Expression::variable("arr"), 2),
    ]);
    environment.assign(&target, &source).unwrap();

    assert_eq!(environment.value_of("arr"), Ok(integers(&[1, 3, 2])));
  }

  #[test]
  fn earlier_snapshots_are_unaffected_by_member_writes() {
    let mut environment = Environment::new();
    declare(&mut environment, DeclarationKind::Let, "arr", integers(&[1, 2]));
    let before = environment.value_of("arr").unwrap();

    environment.assign(&Target::index("arr", 3), &Expression::from(9)).unwrap();

    assert_eq!(before, integers(&[1, 2]));
    assert_eq!(
      environment.value_of("arr"),
      Ok(Value::sequence(vec![1.into(), 2.into(), Value::Undefined, 9.into()]))
    );
  }

  #[test]
  fn member_writes_far_past_the_end_fail() {
    let mut environment = Environment::new();
    declare(&mut environment, DeclarationKind::Const, "arr", integers(&[1]));

    assert_eq!(
      environment.assign(&Target::index("arr", 1_099_511_627_776), &Expression::from(5)),
      Err(UnpackError::InvalidIndex("arr[1099511627776]".to_string()))
    );
    assert_eq!(environment.value_of("arr"), Ok(integers(&[1])));
  }

  #[test]
  fn member_writes_normalise_text_indices() {
    let mut environment = Environment::new();
    declare(&mut environment, DeclarationKind::Const, "arr", integers(&[1, 2]));

    environment.assign(&Target::key("arr", "1"), &Expression::from(9)).unwrap();
    assert_eq!(environment.value_of("arr"), Ok(integers(&[1, 9])));

    assert_eq!(
      environment.assign(&Target::key("arr", "01"), &Expression::from(9)),
      Err(UnpackError::InvalidIndex("arr['01']".to_string()))
    );
  }

  #[test]
  fn defaults_see_earlier_member_writes() {
    let mut environment = Environment::new();
    declare(&mut environment, DeclarationKind::Const, "arr", integers(&[1]));
    environment.declare(DeclarationKind::Let, "b").unwrap();

    let target = SequencePattern::new(vec![
      SequenceSlot::target(Target::index("arr", 0)),
      SequenceSlot::variable("b").with_default(Expression::member(Expression::variable("arr"), 0)),
    ]).into();
    environment.assign(&target, &Expression::sequence(vec![9.into()])).unwrap();

    assert_eq!(environment.value_of("b"), Ok(9.into()));
    assert_eq!(environment.value_of("arr"), Ok(integers(&[9])));
  }

  #[test]
  fn var_may_repeat_names() {
    let mut environment = Environment::new();
    let twice = SequencePattern::variables(&["x", "x"]).into();
    environment
        .declare_with(DeclarationKind::Var, &twice, &Expression::sequence(vec![1.into(), 2.into()]))
        .unwrap();
    assert_eq!(environment.value_of("x"), Ok(2.into()));

    environment.declare(DeclarationKind::Var, "x").unwrap();
    assert_eq!(environment.value_of("x"), Ok(2.into()));

    // A bare `let` redeclaration still shadows.
    environment.declare(DeclarationKind::Let, "x").unwrap();
    assert_eq!(environment.get("x"), Ok(Bound::Absent));
  }

  #[test]
  fn member_write_into_mapping() {
    let mut environment = Environment::new();
    declare(&mut environment, DeclarationKind::Const, "o", Mapping::from_pairs([("p", 1.into())]));
    environment.assign(&Target::key("o", "q"), &Expression::from(true)).unwrap();
    assert_eq!(
      environment.value_of("o"),
      Ok(Mapping::from_pairs([("p", 1.into()), ("q", true.into())]).into())
    );
  }

  #[test]
  fn failed_assignment_changes_nothing() {
    let mut environment = Environment::new();
    declare(&mut environment, DeclarationKind::Let, "a", 1);
    declare(&mut environment, DeclarationKind::Const, "c", 2);

    let target = SequencePattern::variables(&["a", "c"]).into();
    let source = Expression::sequence(vec![10.into(), 20.into()]);
    assert_eq!(
      environment.assign(&target, &source),
      Err(UnpackError::AssignToConstant("c".to_string()))
    );
    assert_eq!(environment.value_of("a"), Ok(1.into()));

    let target = SequencePattern::variables(&["a", "missing"]).into();
    assert_eq!(
      environment.assign(&target, &source),
      Err(UnpackError::UndeclaredVariable("missing".to_string()))
    );
    assert_eq!(environment.value_of("a"), Ok(1.into()));
  }

  #[test]
  fn unset_is_not_undeclared() {
    let mut environment = Environment::new();
    environment.declare(DeclarationKind::Let, "later").unwrap();

    assert_eq!(environment.get("later"), Ok(Bound::Absent));
    assert_eq!(environment.value_of("later"), Ok(Value::Undefined));
    assert_eq!(
      environment.get("not declared in any test"),
      Err(UnpackError::UndeclaredVariable("not declared in any test".to_string()))
    );
    assert_eq!(
      environment.declare(DeclarationKind::Const, "fixed"),
      Err(UnpackError::MissingInitializer("fixed".to_string()))
    );
  }

  #[test]
  fn declaration_binds_absent_positions() {
    let mut environment = Environment::new();
    let target = SequencePattern::variables(&["red", "yellow", "green"]).into();
    let source = Expression::sequence(vec!["one".into()]);
    environment.declare_with(DeclarationKind::Const, &target, &source).unwrap();

    assert_eq!(environment.value_of("red"), Ok("one".into()));
    assert_eq!(environment.get("green"), Ok(Bound::Absent));
    assert_eq!(environment.kind_of("green"), Some(DeclarationKind::Const));
  }

  #[test]
  fn declaration_defaults_read_the_environment() {
    let mut environment = Environment::new();
    declare(&mut environment, DeclarationKind::Let, "fallback", 7);

    let target = MappingPattern::new(vec![
      MappingSlot::new("a").with_default(Expression::variable("fallback")),
    ]).into();
    environment.declare_with(DeclarationKind::Let, &target, &Expression::Mapping(vec![])).unwrap();
    assert_eq!(environment.value_of("a"), Ok(7.into()));
  }

  #[test]
  fn declarations_reject_members_and_duplicates() {
    let mut environment = Environment::new();
    declare(&mut environment, DeclarationKind::Let, "arr", integers(&[]));

    let member = SequencePattern::new(vec![SequenceSlot::target(Target::index("arr", 0))]).into();
    assert_eq!(
      environment.declare_with(DeclarationKind::Let, &member, &Expression::sequence(vec![1.into()])),
      Err(UnpackError::InvalidDeclarationTarget("arr[0]".to_string()))
    );

    let twice = SequencePattern::variables(&["x", "x"]).into();
    assert_eq!(
      environment.declare_with(DeclarationKind::Let, &twice, &Expression::sequence(vec![1.into(), 2.into()])),
      Err(UnpackError::DuplicateBinding("x".to_string()))
    );
    assert!(!environment.is_declared("x"));
  }

  #[test]
  fn const_variables_cannot_be_reassigned() {
    let mut environment = Environment::new();
    declare(&mut environment, DeclarationKind::Const, "k", 1);
    assert_eq!(
      environment.assign(&Target::variable("k"), &Expression::from(2)),
      Err(UnpackError::AssignToConstant("k".to_string()))
    );
  }

  #[test]
  fn member_write_into_scalar_fails() {
    let mut environment = Environment::new();
    declare(&mut environment, DeclarationKind::Let, "n", 1);
    assert!(matches!(
      environment.assign(&Target::index("n", 0), &Expression::from(2)),
      Err(UnpackError::TypeMismatch { expected: "container", .. })
    ));
  }

  #[test]
  fn declaration_kind_names() {
    assert_eq!(DeclarationKind::Const.to_string(), "const");
    assert_eq!("let".parse::<DeclarationKind>(), Ok(DeclarationKind::Let));
  }
}
