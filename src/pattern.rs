/*!

Unpacking patterns. A pattern is a structure parallel to the value it unpacks. Each slot names a `Target`, which
is where the matched piece of the value ends up, and optionally a default `Expression`.

A `SequencePattern` is an ordered list of slots plus an optional rest target. The rest target is stored apart
from the ordinary slots, so "the rest capture is always last" holds by construction. A `MappingPattern` is a
list of slots keyed by source key, plus an optional rest target that receives the unnamed entries.

*/

use crate::{
  expression::Expression,
  format::{
    display_formattable_impl,
    Formattable,
    Formatter,
  },
  interner::{
    InternedString,
    interned,
    resolve_str
  },
  value::format_key,
};


/// The key of a member place, `arr[2]` or `o.key`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MemberKey {
  Index(usize),
  Key(InternedString),
}

/// Where a matched value goes.
#[derive(Clone, Debug, PartialEq)]
pub enum Target {
  Variable(InternedString),
  /// A member of an existing variable. Only meaningful when assigning, never when declaring.
  Member {
    object: InternedString,
    key   : MemberKey,
  },
  /// A nested pattern that unpacks the matched value further.
  Pattern(Box<Pattern>),
}

impl Target {
  pub fn variable(name: &str) -> Target {
    Target::Variable(interned(name))
  }

  pub fn index(object: &str, index: usize) -> Target {
    Target::Member {
      object: interned(object),
      key   : MemberKey::Index(index),
    }
  }

  pub fn key(object: &str, key: &str) -> Target {
    Target::Member {
      object: interned(object),
      key   : MemberKey::Key(interned(key)),
    }
  }
}


#[derive(Clone, Debug, PartialEq)]
pub enum SequenceSlot {
  Element {
    target : Target,
    default: Option<Expression>,
  },
  /// An elision, `[a, , b]`. Consumes a position without binding it.
  Hole,
}

impl SequenceSlot {
  pub fn variable(name: &str) -> SequenceSlot {
    SequenceSlot::target(Target::variable(name))
  }

  pub fn target(target: impl Into<Target>) -> SequenceSlot {
    SequenceSlot::Element {
      target : target.into(),
      default: None
    }
  }

  /// Gives the slot a default. A hole has nothing to default, so it is returned unchanged.
  pub fn with_default(self, default: impl Into<Expression>) -> SequenceSlot {
    match self {
      SequenceSlot::Element { target, .. } => {
        SequenceSlot::Element {
          target,
          default: Some(default.into())
        }
      }
      SequenceSlot::Hole => SequenceSlot::Hole,
    }
  }
}


#[derive(Clone, Debug, PartialEq, Default)]
pub struct SequencePattern {
  pub slots: Vec<SequenceSlot>,
  pub rest : Option<Target>,
}

impl SequencePattern {
  pub fn new(slots: Vec<SequenceSlot>) -> SequencePattern {
    SequencePattern {
      slots,
      rest: None
    }
  }

  /// A pattern of plain variables, `[a, b, c]`.
  pub fn variables(names: &[&str]) -> SequencePattern {
    SequencePattern::new(names.iter().map(|name| SequenceSlot::variable(name)).collect())
  }

  pub fn with_rest(mut self, rest: impl Into<Target>) -> SequencePattern {
    self.rest = Some(rest.into());
    self
  }
}


#[derive(Clone, Debug, PartialEq)]
pub struct MappingSlot {
  pub key    : InternedString,
  pub target : Target,
  pub default: Option<Expression>,
}

impl MappingSlot {
  /// The shorthand slot `{key}`, which binds a variable named like the key.
  pub fn new(key: &str) -> MappingSlot {
    MappingSlot {
      key    : interned(key),
      target : Target::variable(key),
      default: None,
    }
  }

  /// `{key: name}`
  pub fn rename(self, name: &str) -> MappingSlot {
    self.to(Target::variable(name))
  }

  /// `{key: target}`, for member and nested pattern targets.
  pub fn to(mut self, target: impl Into<Target>) -> MappingSlot {
    self.target = target.into();
    self
  }

  pub fn with_default(mut self, default: impl Into<Expression>) -> MappingSlot {
    self.default = Some(default.into());
    self
  }
}


#[derive(Clone, Debug, PartialEq, Default)]
pub struct MappingPattern {
  pub slots: Vec<MappingSlot>,
  pub rest : Option<Target>,
}

impl MappingPattern {
  pub fn new(slots: Vec<MappingSlot>) -> MappingPattern {
    MappingPattern {
      slots,
      rest: None
    }
  }

  pub fn with_rest(mut self, rest: impl Into<Target>) -> MappingPattern {
    self.rest = Some(rest.into());
    self
  }

  /// The keys the slots name, which a rest capture leaves out.
  pub fn named_keys(&self) -> Vec<InternedString> {
    self.slots.iter().map(|slot| slot.key).collect()
  }
}


#[derive(Clone, Debug, PartialEq)]
pub enum Pattern {
  Sequence(SequencePattern),
  Mapping(MappingPattern),
}

impl Pattern {
  /// The name of the form of value this pattern unpacks, used in diagnostics.
  pub fn form_name(&self) -> &'static str {
    match self {
      Pattern::Sequence(_) => "sequence",
      Pattern::Mapping(_)  => "mapping",
    }
  }
}


// region Conversions

impl From<&str> for Target {
  fn from(name: &str) -> Self {
    Target::variable(name)
  }
}

impl From<Pattern> for Target {
  fn from(pattern: Pattern) -> Self {
    Target::Pattern(Box::new(pattern))
  }
}

impl From<SequencePattern> for Target {
  fn from(pattern: SequencePattern) -> Self {
    Target::Pattern(Box::new(Pattern::Sequence(pattern)))
  }
}

impl From<MappingPattern> for Target {
  fn from(pattern: MappingPattern) -> Self {
    Target::Pattern(Box::new(Pattern::Mapping(pattern)))
  }
}

impl From<SequencePattern> for Pattern {
  fn from(pattern: SequencePattern) -> Self {
    Pattern::Sequence(pattern)
  }
}

impl From<MappingPattern> for Pattern {
  fn from(pattern: MappingPattern) -> Self {
    Pattern::Mapping(pattern)
  }
}

// endregion


// region Formatting

fn format_default(default: &Option<Expression>, formatter: &Formatter) -> String {
  match default {
    Some(expression) => format!(" = {}", expression.format(formatter)),
    None             => String::new(),
  }
}

impl Formattable for MemberKey {
  fn format(&self, _formatter: &Formatter) -> String {
    match self {
      MemberKey::Index(index) => format!("[{}]", index),
      MemberKey::Key(key)     => {
        let name = format_key(*key);
        if name.starts_with('\'') { format!("[{}]", name) } else { format!(".{}", name) }
      }
    }
  }
}

impl Formattable for Target {
  fn format(&self, formatter: &Formatter) -> String {
    match self {
      Target::Variable(name)        => resolve_str(*name),
      Target::Member { object, key } => format!("{}{}", resolve_str(*object), key.format(formatter)),
      Target::Pattern(pattern)      => pattern.format(formatter),
    }
  }
}

impl Formattable for SequencePattern {
  fn format(&self, formatter: &Formatter) -> String {
    let mut children = self.slots
                           .iter()
                           .map(|slot| {
                             match slot {
                               SequenceSlot::Element { target, default } => {
                                 format!("{}{}", target.format(formatter), format_default(default, formatter))
                               }
                               SequenceSlot::Hole => String::new(),
                             }
                           })
                           .collect::<Vec<_>>();
    if let Some(rest) = &self.rest {
      children.push(format!("...{}", rest.format(formatter)));
    } else if let Some(SequenceSlot::Hole) = self.slots.last() {
      // A trailing hole needs its own comma to survive a round trip.
      children.push(String::new());
    }
    format!("[{}]", children.join(", ").trim_end())
  }
}

impl Formattable for MappingPattern {
  fn format(&self, formatter: &Formatter) -> String {
    let mut children = self.slots
                           .iter()
                           .map(|slot| {
                             let shorthand = slot.target == Target::Variable(slot.key);
                             let default = format_default(&slot.default, formatter);
                             if shorthand {
                               format!("{}{}", resolve_str(slot.key), default)
                             } else {
                               format!("{}: {}{}", format_key(slot.key), slot.target.format(formatter), default)
                             }
                           })
                           .collect::<Vec<_>>();
    if let Some(rest) = &self.rest {
      children.push(format!("...{}", rest.format(formatter)));
    }
    format!("{{{}}}", children.join(", "))
  }
}

impl Formattable for Pattern {
  fn format(&self, formatter: &Formatter) -> String {
    match self {
      Pattern::Sequence(pattern) => pattern.format(formatter),
      Pattern::Mapping(pattern)  => pattern.format(formatter),
    }
  }
}

display_formattable_impl!(Target);
display_formattable_impl!(SequencePattern);
display_formattable_impl!(MappingPattern);
display_formattable_impl!(Pattern);

// endregion
