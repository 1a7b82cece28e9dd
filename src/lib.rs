/*!

Structural unpacking: matching a sequence or mapping pattern against a value and computing the bindings the
match implies, with lazy defaults, rest capture, nested patterns, and simultaneous (snapshot-then-assign)
rebinding of existing variables.

```text
const { a: aa = 10, b: bb = 5 } = { a: 3 };     aa→3, bb→5
```

The evaluator proper lives in `unpack`. `environment` applies bindings to variables, `parsing` reads the
destructuring syntax from text, and `session` runs whole scripts.

*/

#[macro_use]
mod format;
mod environment;
mod error;
mod expression;
mod interner;
mod parsing;
mod pattern;
mod session;
mod unpack;
mod value;
pub mod logging;

pub use environment::{
  DeclarationKind,
  Environment,
  VariableRecord,
};
pub use error::{
  ParseError,
  ScriptError,
  UnpackError,
};
pub use expression::{
  Element,
  EmptyScope,
  Expression,
  Property,
  Scope,
  Thunk,
};
pub use format::{
  DisplayForm,
  Formattable,
  Formatter,
};
pub use interner::{
  InternedString,
  interned,
  resolve_str,
};
pub use parsing::{
  parse_expression,
  parse_pattern,
  parse_script,
  Declarator,
  Statement,
};
pub use pattern::{
  MappingPattern,
  MappingSlot,
  MemberKey,
  Pattern,
  SequencePattern,
  SequenceSlot,
  Target,
};
pub use session::Session;
pub use unpack::{
  unpack,
  unpack_mapping,
  unpack_sequence,
  Binding,
  Bindings,
  Bound,
  Place,
  Unpacker,
};
pub use value::{
  Mapping,
  Value,
  ValueKind,
};
