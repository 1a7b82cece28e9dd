/*!

Error types. Unpacking itself only fails on a kind mismatch or a failing default expression. Everything that
is merely missing is handled by the absent sentinel, not by an error.

*/

use thiserror::Error;


#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum UnpackError {
  /// A pattern was applied to a value it cannot unpack.
  #[error("cannot unpack {found} with {expected} pattern `{pattern}`")]
  TypeMismatch {
    expected: &'static str,
    found   : String,
    pattern : String,
  },

  /// A member was read from `undefined` or `null`.
  #[error("cannot read members of {found} in `{expression}`")]
  NoMembers {
    found     : String,
    expression: String,
  },

  #[error("`{0}` is not declared")]
  UndeclaredVariable(String),

  #[error("assignment to constant variable `{0}`")]
  AssignToConstant(String),

  #[error("`{0}` is bound more than once in the same declaration")]
  DuplicateBinding(String),

  #[error("`{0}` is not a valid target in a declaration")]
  InvalidDeclarationTarget(String),

  #[error("missing initializer in declaration of `{0}`")]
  MissingInitializer(String),

  #[error("`{0}` is not a valid index")]
  InvalidIndex(String),

  /// A host-provided default expression failed.
  #[error("default expression failed: {0}")]
  Computed(String),
}


#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseError {
  #[error("unrecognized input at {position}")]
  UnrecognizedInput { position: usize },

  #[error("expected {expected} but found `{found}` at {position}")]
  UnexpectedToken {
    expected: &'static str,
    found   : String,
    position: usize,
  },

  #[error("expected {expected} but the input ended")]
  UnexpectedEnd { expected: &'static str },

  #[error("invalid number `{text}` at {position}")]
  InvalidNumber { text: String, position: usize },

  #[error("a rest element must be last in its pattern (at {position})")]
  RestNotLast { position: usize },

  #[error("missing initializer in declaration at {position}")]
  MissingInitializer { position: usize },

  #[error("`{key}` cannot be used as a shorthand property (at {position})")]
  InvalidShorthand { key: String, position: usize },

  #[error("invalid assignment target at {position}")]
  InvalidAssignmentTarget { position: usize },
}


#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ScriptError {
  #[error(transparent)]
  Parse(#[from] ParseError),

  #[error(transparent)]
  Unpack(#[from] UnpackError),
}
