/*!

  A `Formatter` holds information about how to format a value, pattern, or expression, that is, how to express it
  as a string.

  "Formatting" needs to be distinct from Rust's standard `Display` trait, because the same value is formatted
  differently depending on the context. A value written back as source text quotes its strings, while the same value
  written to the console does not. There is no way to make `Display` work with a different set of formatting rules,
  so `Display` is implemented in terms of `Formattable` using the default form.

*/

use strum::EnumString;


#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumString, Hash)]
pub enum DisplayForm {
  /// Source-like: `['one', 2, {a: 3}]`.
  #[strum(serialize = "InputForm")]
  Input,
  /// Console-like: a top-level string is written bare, collections get padded brackets: `[ 'one', 2 ]`.
  #[strum(serialize = "OutputForm")]
  Output,
}

impl Default for DisplayForm {
  fn default() -> DisplayForm {
    DisplayForm::Input
  }
}

/// Parameters used in methods that transform values into strings.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash, Default)]
pub struct Formatter {
  pub form: DisplayForm,
  /// Nesting depth. Zero for the value being formatted, incremented for its children.
  pub depth: u32,
}

impl Formatter {
  /// The formatter for the children of whatever is formatted with `self`.
  pub fn nested(&self) -> Formatter {
    Formatter {
      form : self.form,
      depth: self.depth + 1,
    }
  }

  pub fn is_top_level(&self) -> bool {
    self.depth == 0
  }
}

impl From<DisplayForm> for Formatter {
  fn from(form: DisplayForm) -> Self {
    Formatter {
      form,
      depth: 0
    }
  }
}

pub trait Formattable {
  fn format(&self, formatter: &Formatter) -> String;
}


macro_rules! display_formattable_impl {
  ($type_name:ty) => {
    impl std::fmt::Display for $type_name {
      fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.format(&$crate::format::Formatter::default()))
      }
    }
  }
}
pub(crate) use display_formattable_impl;
