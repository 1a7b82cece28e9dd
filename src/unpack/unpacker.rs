/*!

The `Unpacker` walks a pattern and a value in parallel and records a `Binding` for every target it reaches.

*/

use crate::{
  error::UnpackError,
  expression::{
    Expression,
    Scope,
  },
  logging::{
    log,
    Channel,
  },
  pattern::{
    MappingPattern,
    Pattern,
    SequencePattern,
    SequenceSlot,
    Target,
  },
  value::Value,
};

use super::bindings::{
  Bindings,
  Bound,
  LayeredScope,
  Place,
};


/// Decides whether a candidate is replaced by the slot's default.
fn triggers_default(candidate: &Bound) -> bool {
  match candidate {
    Bound::Absent => true,
    #[cfg(feature = "undefined-triggers-default")]
    Bound::Present(Value::Undefined) => true,
    _ => false,
  }
}

fn mismatch(expected: &'static str, found: &Bound, pattern: String) -> UnpackError {
  UnpackError::TypeMismatch {
    expected,
    found: found.describe(),
    pattern,
  }
}


pub struct Unpacker<'s> {
  /// Where default expressions look up names not bound by the pattern itself.
  scope   : &'s dyn Scope,
  bindings: Bindings,
}

impl<'s> Unpacker<'s> {
  pub fn with_scope(scope: &'s dyn Scope) -> Unpacker<'s> {
    Unpacker {
      scope,
      bindings: Bindings::new(),
    }
  }

  pub fn unpack(mut self, value: &Value, pattern: &Pattern) -> Result<Bindings, UnpackError> {
    self.unpack_pattern(value, pattern)?;
    Ok(self.bindings)
  }

  pub fn unpack_sequence(mut self, value: &Value, pattern: &SequencePattern) -> Result<Bindings, UnpackError> {
    self.unpack_sequence_into(value, pattern)?;
    Ok(self.bindings)
  }

  pub fn unpack_mapping(mut self, value: &Value, pattern: &MappingPattern) -> Result<Bindings, UnpackError> {
    self.unpack_mapping_into(value, pattern)?;
    Ok(self.bindings)
  }

  /// Binds a single target, with an optional default. A plain variable target yields one binding, a pattern
  /// target yields whatever the pattern binds.
  pub fn unpack_target(mut self, candidate: Bound, target: &Target, default: Option<&Expression>)
      -> Result<Bindings, UnpackError>
  {
    self.bind(target, candidate, default)?;
    Ok(self.bindings)
  }


  fn bind(&mut self, target: &Target, candidate: Bound, default: Option<&Expression>) -> Result<(), UnpackError> {
    let candidate = self.resolve_default(candidate, default)?;

    match target {
      Target::Variable(name) => self.record(Place::Variable(*name), candidate),

      Target::Member { object, key } => {
        self.record(Place::Member { object: *object, key: *key }, candidate)
      }

      Target::Pattern(pattern) => {
        match candidate {
          Bound::Present(value) => self.unpack_pattern(&value, pattern)?,
          Bound::Absent => {
            return Err(mismatch(pattern.form_name(), &Bound::Absent, pattern.to_string()));
          }
        }
      }
    }

    Ok(())
  }

  fn record(&mut self, place: Place, value: Bound) {
    log(Channel::Debug, 5, format!("Binding {}→{}", place, value).as_str());
    self.bindings.push(place, value);
  }

  /// Replaces a candidate that triggers the default with the value of the default expression. The default is
  /// only evaluated here, so it is never evaluated for a candidate that is present.
  fn resolve_default(&self, candidate: Bound, default: Option<&Expression>) -> Result<Bound, UnpackError> {
    match default {
      Some(expression) if triggers_default(&candidate) => {
        let scope = LayeredScope {
          inner: &self.bindings,
          outer: self.scope,
        };
        Ok(Bound::Present(expression.evaluate(&scope)?))
      }
      _ => Ok(candidate),
    }
  }

  fn unpack_pattern(&mut self, value: &Value, pattern: &Pattern) -> Result<(), UnpackError> {
    match pattern {
      Pattern::Sequence(sequence_pattern) => self.unpack_sequence_into(value, sequence_pattern),
      Pattern::Mapping(mapping_pattern)   => self.unpack_mapping_into(value, mapping_pattern),
    }
  }

  fn unpack_sequence_into(&mut self, value: &Value, pattern: &SequencePattern) -> Result<(), UnpackError> {
    let elements = match value.elements() {
      Some(elements) => elements,
      None => {
        return Err(mismatch("sequence", &Bound::Present(value.clone()), pattern.to_string()));
      }
    };

    // Positions past the end of the value are absent, not an error.
    for (position, slot) in pattern.slots.iter().enumerate() {
      if let SequenceSlot::Element { target, default } = slot {
        let candidate: Bound = elements.get(position).cloned().into();
        self.bind(target, candidate, default.as_ref())?;
      }
    }

    // The rest is always a sequence, empty once the value is exhausted.
    if let Some(rest) = &pattern.rest {
      let tail = elements.get(pattern.slots.len()..)
                         .map(<[Value]>::to_vec)
                         .unwrap_or_default();
      self.bind(rest, Bound::Present(Value::sequence(tail)), None)?;
    }

    Ok(())
  }

  fn unpack_mapping_into(&mut self, value: &Value, pattern: &MappingPattern) -> Result<(), UnpackError> {
    let mapping = match value.as_mapping() {
      Some(mapping) => mapping,
      None => {
        return Err(mismatch("mapping", &Bound::Present(value.clone()), pattern.to_string()));
      }
    };

    for slot in &pattern.slots {
      let candidate: Bound = mapping.get(slot.key).cloned().into();
      self.bind(&slot.target, candidate, slot.default.as_ref())?;
    }

    if let Some(rest) = &pattern.rest {
      let remaining = mapping.without(&pattern.named_keys());
      self.bind(rest, Bound::Present(Value::mapping(remaining)), None)?;
    }

    Ok(())
  }
}
