/*!

A `Session` runs destructuring scripts against an `Environment` that persists from one `run` to the next, and
collects what the scripts write to the console.

```text
let a, b;
[a = 5, b = 7] = [1];
console.log(a, b);          output: "1 7"
```

*/

use crate::{
  environment::Environment,
  error::{
    ScriptError,
    UnpackError,
  },
  expression::Expression,
  format::{
    DisplayForm,
    Formattable,
    Formatter,
  },
  interner::resolve_str,
  logging::{
    log,
    verbosity::log_at_level,
    Channel,
  },
  parsing::{
    parse_script,
    Statement,
  },
  pattern::Target,
};


#[derive(Clone, Debug, Default)]
pub struct Session {
  environment: Environment,
  output     : Vec<String>,
}

impl Session {
  pub fn new() -> Session {
    Session::default()
  }

  /// Parses and executes `text`. Statements before a failing statement keep their effects.
  pub fn run(&mut self, text: &str) -> Result<(), ScriptError> {
    let statements = parse_script(text)?;
    for statement in &statements {
      if let Err(error) = self.execute(statement) {
        log(Channel::Error, 1, error.to_string().as_str());
        return Err(error.into());
      }
    }
    Ok(())
  }

  pub fn execute(&mut self, statement: &Statement) -> Result<(), UnpackError> {
    match statement {
      Statement::Declaration { kind, declarators } => {
        for declarator in declarators {
          match &declarator.initializer {
            Some(source) => {
              self.environment.declare_with(*kind, &declarator.target, source)?;
            }
            None => {
              match &declarator.target {
                Target::Variable(name) => self.environment.declare(*kind, &resolve_str(*name))?,
                target => return Err(UnpackError::MissingInitializer(target.to_string())),
              }
            }
          }
        }
      }

      Statement::Assignment { target, source } => {
        self.environment.assign(target, source)?;
      }

      Statement::Log(arguments) => {
        let line = self.console_line(arguments)?;
        log_at_level(2, line.as_str());
        self.output.push(line);
      }

      Statement::Expression(expression) => {
        let value = expression.evaluate(&self.environment)?;
        log(Channel::Debug, 4, format!("Evaluated {}", value).as_str());
      }
    }
    Ok(())
  }

  /// The arguments of a `console.log` call, in output form, separated by spaces.
  fn console_line(&self, arguments: &[Expression]) -> Result<String, UnpackError> {
    let formatter: Formatter = DisplayForm::Output.into();
    let mut parts = Vec::with_capacity(arguments.len());
    for argument in arguments {
      parts.push(argument.evaluate(&self.environment)?.format(&formatter));
    }
    Ok(parts.join(" "))
  }

  /// Every line written to the console so far.
  pub fn output(&self) -> &[String] {
    &self.output
  }

  /// Forgets the console output, keeping the variables.
  pub fn clear_output(&mut self) {
    self.output.clear();
  }

  pub fn environment(&self) -> &Environment {
    &self.environment
  }

  pub fn environment_mut(&mut self) -> &mut Environment {
    &mut self.environment
  }
}


#[cfg(test)]
mod tests {
  use crate::{
    error::ParseError,
    value::Value,
  };

  use super::*;

  const DEMONSTRATION: &str = r#"
'use strict';

// Basic variable assignment
const arr = ['one', 'two', 'three'];

const [red, yellow, green] = arr;
console.log(red); // "one"
console.log(yellow); // "two"
console.log(green); // "three"

// Assignment separate from declaration
let a, b;

[a, b] = [1, 2];
console.log(a); // 1
console.log(b); // 2

// More variables than elements
const arr = ['one', 'two'];

const [red, yellow, green, blue] = arr;
console.log(red); // "one"
console.log(yellow); // "two"
console.log(green); // undefined
console.log(blue); //undefined

// Default values
let a, b;

[a = 5, b = 7] = [1];
console.log(a); // 1
console.log(b); // 7

// Swapping variables
let a = 1;
let b = 3;

[a, b] = [b, a];
console.log(a); // 3
console.log(b); // 1

const arr = [1, 2, 3];
[arr[2], arr[1]] = [arr[1], arr[2]];
console.log(arr); // [1,3,2]

// Rest of a sequence
const [a, ...b] = [1, 2, 3];
console.log(a); // 1
console.log(b); // [2, 3]

// Basic mapping assignment
const user = {
	id: 42,
	isVerified: true
};

const { id, isVerified } = user;

console.log(id); // 42
console.log(isVerified); // true

// Assignment separate from declaration
let a, b;

({ a, b } = { a: 1, b: 2 });

// New variable names
const o = { p: 42, q: true };
const { p: foo, q: bar } = o;

console.log(foo); // 42
console.log(bar); // true

// Default values
const { a = 10, b = 5 } = { a: 3 };

console.log(a); // 3
console.log(b); // 5

// New names and default values
const { a: aa = 10, b: bb = 5 } = { a: 3 };

console.log(aa); // 3
console.log(bb); // 5
"#;

  #[test]
  fn demonstration_runs_end_to_end() {
    let mut session = Session::new();
    session.run(DEMONSTRATION).unwrap();

    let expected = [
      "one", "two", "three",
      "1", "2",
      "one", "two", "undefined", "undefined",
      "1", "7",
      "3", "1",
      "[ 1, 3, 2 ]",
      "1", "[ 2, 3 ]",
      "42", "true",
      "42", "true",
      "3", "5",
      "3", "5",
    ];
    assert_eq!(session.output(), expected);
  }

  #[test]
  fn unknown_source_variable_fails() {
    let mut session = Session::new();
    let result = session.run("const [red, yellow] = foo;");
    assert_eq!(result, Err(ScriptError::Unpack(UnpackError::UndeclaredVariable("foo".to_string()))));
    assert!(!session.environment().is_declared("red"));
  }

  #[test]
  fn mapping_assignment_updates_existing_variables() {
    let mut session = Session::new();
    session.run("let a, b; ({ a, b } = { a: 1, b: 2 }); console.log(a, b);").unwrap();
    assert_eq!(session.output(), ["1 2"]);
    assert_eq!(session.environment().value_of("b"), Ok(Value::from(2)));
  }

  #[test]
  fn environment_persists_between_runs() {
    let mut session = Session::new();
    session.run("let s = 'text';").unwrap();
    session.run("const [first, ...others] = s; console.log(first, others);").unwrap();
    assert_eq!(session.output(), ["t [ 'e', 'x', 't' ]"]);

    session.clear_output();
    assert!(session.output().is_empty());
    assert!(session.environment().is_declared("others"));
  }

  #[test]
  fn failures_stop_the_script() {
    let mut session = Session::new();
    let result = session.run("const k = 1; console.log(k); [k] = [2]; console.log(k);");
    assert_eq!(result, Err(ScriptError::Unpack(UnpackError::AssignToConstant("k".to_string()))));
    assert_eq!(session.output(), ["1"]);
  }

  #[test]
  fn parse_errors_run_nothing() {
    let mut session = Session::new();
    let result = session.run("console.log(1); const [a, ...b, c] = [1];");
    assert_eq!(result, Err(ScriptError::Parse(ParseError::RestNotLast { position: 26 })));
    assert!(session.output().is_empty());
  }

  #[test]
  fn nested_and_member_reads() {
    let mut session = Session::new();
    session.run(
      "const data = { point: [1, 2], tags: ['a'] };
       const { point: [x, y], tags: [first, second = 'none'], ...others } = data;
       console.log(x, y, first, second, others, data.point.length);"
    ).unwrap();
    assert_eq!(session.output(), ["1 2 a none {} 2"]);
  }

  #[test]
  fn distant_member_writes_are_errors() {
    let mut session = Session::new();
    let result = session.run("const arr = [1]; arr[1099511627776] = 5;");
    assert_eq!(
      result,
      Err(ScriptError::Unpack(UnpackError::InvalidIndex("arr[1099511627776]".to_string())))
    );
    assert_eq!(session.environment().value_of("arr"), Ok(Value::sequence(vec![1.into()])));
  }

  #[test]
  fn member_keys_are_normalised() {
    let mut session = Session::new();
    session.run(
      "const arr = [1, 2, 3];
       console.log(arr['1'], arr[2.0], arr[-1], arr[0.5]);
       arr['1'] = 9;
       console.log(arr);"
    ).unwrap();
    assert_eq!(session.output(), ["2 3 undefined undefined", "[ 1, 9, 3 ]"]);
  }
}
