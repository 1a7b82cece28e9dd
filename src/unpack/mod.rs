/*!

# Structural unpacking

Unpacking matches a pattern against a value and produces the bindings the match implies. It is the whole of
what a destructuring declaration or assignment means:

```text
const [a = 5, b = 7, ...rest] = [1];     unpack_sequence([1], [a = 5, b = 7, ...rest])
                                          ⇝ a→1, b→7, rest→[]
```

## Sequence patterns

For each slot at position *i* the candidate is `value[i]` when `i < len(value)` and the absent sentinel
otherwise. A rest target at position *i* receives the new sequence `value[i..]`, which is empty, never absent,
when the value is exhausted. A pattern longer than its value is not an error; neither is a value longer than its
pattern.

## Mapping patterns

For each slot with key *k* the candidate is `value[k]` when the key is present and the absent sentinel otherwise.
A rest target receives a new mapping with every entry no slot names.

## Defaults

A slot's default is evaluated only when its candidate is absent. A present value never triggers the default,
however falsy it is: `0`, `''`, `false`, and `null` are all values. An explicit `undefined` is a value too, unless
the crate is built with the `undefined-triggers-default` feature.

## Failure

Unpacking fails only when a pattern meets a value of the wrong kind (including an absent candidate with no
default meeting a nested pattern) or when a default expression fails. Either way no bindings are returned, so a
caller that applies bindings only on success never exposes a partial result.

*/

mod bindings;
mod unpacker;

pub use bindings::{
  Binding,
  Bindings,
  Bound,
  Place,
};
pub(crate) use bindings::store;
pub use unpacker::Unpacker;

use crate::{
  error::UnpackError,
  expression::EmptyScope,
  pattern::{
    MappingPattern,
    Pattern,
    SequencePattern,
  },
  value::Value,
};


/// Unpacks `value` with a sequence pattern. Defaults may only refer to names the pattern itself binds.
pub fn unpack_sequence(value: &Value, pattern: &SequencePattern) -> Result<Bindings, UnpackError> {
  Unpacker::with_scope(&EmptyScope).unpack_sequence(value, pattern)
}

/// Unpacks `value` with a mapping pattern. Defaults may only refer to names the pattern itself binds.
pub fn unpack_mapping(value: &Value, pattern: &MappingPattern) -> Result<Bindings, UnpackError> {
  Unpacker::with_scope(&EmptyScope).unpack_mapping(value, pattern)
}

/// Unpacks `value` with a pattern of either form.
pub fn unpack(value: &Value, pattern: &Pattern) -> Result<Bindings, UnpackError> {
  Unpacker::with_scope(&EmptyScope).unpack(value, pattern)
}
