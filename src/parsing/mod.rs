/*!

Reading destructuring syntax from text. The lexer turns text into `Lexeme`s; the parser builds `Pattern`s,
`Expression`s and `Statement`s from them.

*/

mod lexer;
mod parser;

pub use parser::{
  parse_expression,
  parse_pattern,
  parse_script,
  Declarator,
  Statement,
};
