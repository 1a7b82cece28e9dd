/*!

Minimal lexer for the destructuring surface syntax. Token classes with open-ended spellings (identifiers, numbers,
strings, whitespace and comments) are recognized with anchored regular expressions. Punctuators are a fixed set,
matched leftmost-longest with a single Aho-Corasick automaton, so `...` wins over `.`.

String and identifier tokens are interned already in the lexer.

*/

use std::{
  fmt::{Display, Formatter},
  str::FromStr
};

use aho_corasick::{
  AhoCorasick,
  AhoCorasickBuilder,
  MatchKind
};
use lazy_static::lazy_static;
use regex::Regex;
use strum::IntoEnumIterator;
use strum_macros::{
  AsRefStr,
  EnumIter,
  EnumString,
  IntoStaticStr
};

use crate::{
  error::ParseError,
  interner::{
    InternedString,
    interned,
    resolve_str
  },
  value::{
    format_key,
    quote
  },
};


#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash, EnumString, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum Keyword {
  Let,
  Const,
  Var,
  True,
  False,
  Null,
  Undefined,
}


#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash, EnumIter, IntoStaticStr)]
pub enum Punctuator {
  #[strum(serialize = "...")]
  Ellipsis,
  #[strum(serialize = "[")]
  OpenBracket,
  #[strum(serialize = "]")]
  CloseBracket,
  #[strum(serialize = "{")]
  OpenBrace,
  #[strum(serialize = "}")]
  CloseBrace,
  #[strum(serialize = "(")]
  OpenParenthesis,
  #[strum(serialize = ")")]
  CloseParenthesis,
  #[strum(serialize = ",")]
  Comma,
  #[strum(serialize = ":")]
  Colon,
  #[strum(serialize = "=")]
  Equals,
  #[strum(serialize = ";")]
  Semicolon,
  #[strum(serialize = ".")]
  Dot,
}

impl Punctuator {
  pub fn text(self) -> &'static str {
    self.into()
  }
}


#[derive(Clone, PartialEq, Debug, AsRefStr)]
pub enum Token {
  Identifier(InternedString),
  Keyword(Keyword),
  Integer(i64),
  Real(f64),
  String(InternedString),
  Punctuator(Punctuator),
}

impl Token {
  /// The name of a token that can stand where a property name is expected. Keywords qualify: `o.undefined`.
  pub fn property_name(&self) -> Option<InternedString> {
    match self {
      Token::Identifier(name) => Some(*name),
      Token::Keyword(keyword) => {
        let text: &'static str = keyword.into();
        Some(interned(text))
      }
      _ => None
    }
  }
}

impl Display for Token {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      Token::Identifier(name)    => write!(f, "{}", format_key(*name)),
      Token::Keyword(keyword)    => {
        let text: &'static str = keyword.into();
        write!(f, "{}", text)
      }
      Token::Integer(n)          => write!(f, "{}", n),
      Token::Real(r)             => write!(f, "{}", r),
      Token::String(s)           => write!(f, "{}", quote(&resolve_str(*s))),
      Token::Punctuator(p)       => write!(f, "{}", p.text()),
    }
  }
}


/// A token and the byte offset at which it starts.
#[derive(Clone, PartialEq, Debug)]
pub struct Lexeme {
  pub token   : Token,
  pub position: usize,
}


lazy_static! {
  static ref TRIVIA     : Regex = token_class(r"^(?:[ \t\r\n\x0C]+|//[^\n]*|/\*(?s:.)*?\*/)+");
  static ref IDENTIFIER : Regex = token_class(r"^[A-Za-z_$][A-Za-z0-9_$]*");
  static ref NUMBER     : Regex = token_class(r"^-?[0-9]+(?:\.[0-9]+)?(?:[eE][+-]?[0-9]+)?");
  static ref STRING     : Regex = token_class(r#"^(?:'(?:[^'\\\n]|\\.)*'|"(?:[^"\\\n]|\\.)*")"#);
  static ref PUNCTUATORS: (AhoCorasick, Vec<Punctuator>) = {
    let punctuators = Punctuator::iter().collect::<Vec<_>>();
    let automaton = AhoCorasickBuilder::new()
        .anchored(true)
        .match_kind(MatchKind::LeftmostLongest)
        .build(punctuators.iter().map(|p| p.text()));
    (automaton, punctuators)
  };
}

// The token class patterns are literals, so a failure to compile is a bug in this file.
fn token_class(pattern: &str) -> Regex {
  match Regex::new(pattern) {
    Ok(regex) => regex,
    Err(error) => panic!("invalid token class {}: {}", pattern, error),
  }
}


pub struct Lexer<'t> {
  text  : &'t str,
  cursor: usize,
}

impl<'t> Lexer<'t> {
  pub fn new(text: &'t str) -> Lexer<'t> {
    Lexer {
      text,
      cursor: 0
    }
  }

  /// Lexes the whole text.
  pub fn tokenize(text: &str) -> Result<Vec<Lexeme>, ParseError> {
    let mut lexer = Lexer::new(text);
    let mut lexemes = Vec::new();
    while let Some(lexeme) = lexer.next_lexeme()? {
      lexemes.push(lexeme);
    }
    Ok(lexemes)
  }

  /// The next token, or `None` at the end of the text.
  pub fn next_lexeme(&mut self) -> Result<Option<Lexeme>, ParseError> {
    self.skip_trivia();
    let position = self.cursor;
    let rest = &self.text[position..];
    if rest.is_empty() {
      return Ok(None);
    }

    // A leading minus belongs to a number, never to a punctuator.
    if let Some(found) = NUMBER.find(rest) {
      self.cursor += found.end();
      return make_number(found.as_str(), position).map(Some);
    }

    if let Some(found) = IDENTIFIER.find(rest) {
      self.cursor += found.end();
      let token = match Keyword::from_str(found.as_str()) {
        Ok(keyword) => Token::Keyword(keyword),
        Err(_)      => Token::Identifier(interned(found.as_str())),
      };
      return Ok(Some(Lexeme { token, position }));
    }

    if let Some(found) = STRING.find(rest) {
      self.cursor += found.end();
      let token = Token::String(interned(&unescape(found.as_str())));
      return Ok(Some(Lexeme { token, position }));
    }

    let (automaton, punctuators) = &*PUNCTUATORS;
    if let Some(found) = automaton.find(rest) {
      self.cursor += found.end();
      let token = Token::Punctuator(punctuators[found.pattern()]);
      return Ok(Some(Lexeme { token, position }));
    }

    Err(ParseError::UnrecognizedInput { position })
  }

  fn skip_trivia(&mut self) {
    if let Some(found) = TRIVIA.find(&self.text[self.cursor..]) {
      self.cursor += found.end();
    }
  }
}


fn make_number(text: &str, position: usize) -> Result<Lexeme, ParseError> {
  let is_real = text.contains(|c| c == '.' || c == 'e' || c == 'E');
  let token = if is_real {
    text.parse::<f64>().map(Token::Real).ok()
  } else {
    text.parse::<i64>().map(Token::Integer).ok()
  };

  match token {
    Some(token) => Ok(Lexeme { token, position }),
    None => Err(ParseError::InvalidNumber { text: text.to_string(), position }),
  }
}

/// Strips the quotes from a string token and resolves its escapes. Unknown escapes stand for the escaped
/// character itself.
fn unescape(quoted: &str) -> String {
  let inner = &quoted[1..quoted.len() - 1];
  let mut text = String::with_capacity(inner.len());
  let mut chars = inner.chars();
  while let Some(c) = chars.next() {
    if c != '\\' {
      text.push(c);
      continue;
    }
    match chars.next() {
      Some('n')   => text.push('\n'),
      Some('t')   => text.push('\t'),
      Some('r')   => text.push('\r'),
      Some('0')   => text.push('\0'),
      Some(other) => text.push(other),
      None        => {}
    }
  }
  text
}


#[cfg(test)]
mod tests {
  use super::*;

  fn tokens(text: &str) -> Vec<Token> {
    Lexer::tokenize(text).unwrap().into_iter().map(|lexeme| lexeme.token).collect()
  }

  #[test]
  fn declaration() {
    assert_eq!(
      tokens("const [a, ...b] = [1, 2.5];"),
      vec![
        Token::Keyword(Keyword::Const),
        Token::Punctuator(Punctuator::OpenBracket),
        Token::Identifier(interned("a")),
        Token::Punctuator(Punctuator::Comma),
        Token::Punctuator(Punctuator::Ellipsis),
        Token::Identifier(interned("b")),
        Token::Punctuator(Punctuator::CloseBracket),
        Token::Punctuator(Punctuator::Equals),
        Token::Punctuator(Punctuator::OpenBracket),
        Token::Integer(1),
        Token::Punctuator(Punctuator::Comma),
        Token::Real(2.5),
        Token::Punctuator(Punctuator::CloseBracket),
        Token::Punctuator(Punctuator::Semicolon),
      ]
    );
  }

  #[test]
  fn trivia_is_skipped() {
    let text = "// a comment\n  x /* block\n comment */ . log";
    assert_eq!(
      tokens(text),
      vec![
        Token::Identifier(interned("x")),
        Token::Punctuator(Punctuator::Dot),
        Token::Identifier(interned("log")),
      ]
    );
  }

  #[test]
  fn strings_and_escapes() {
    assert_eq!(
      tokens(r#"'it\'s' "two\nlines" 'use strict'"#),
      vec![
        Token::String(interned("it's")),
        Token::String(interned("two\nlines")),
        Token::String(interned("use strict")),
      ]
    );
  }

  #[test]
  fn numbers() {
    assert_eq!(tokens("-3 1e3 0.25"), vec![Token::Integer(-3), Token::Real(1000.0), Token::Real(0.25)]);
    assert_eq!(
      Lexer::tokenize("99999999999999999999"),
      Err(ParseError::InvalidNumber { text: "99999999999999999999".to_string(), position: 0 })
    );
  }

  #[test]
  fn positions() {
    let lexemes = Lexer::tokenize("let  x").unwrap();
    assert_eq!(lexemes[1].position, 5);
  }

  #[test]
  fn unrecognized_input() {
    assert_eq!(Lexer::tokenize("a + b"), Err(ParseError::UnrecognizedInput { position: 2 }));
  }

  #[test]
  fn token_text() {
    assert_eq!(Token::Punctuator(Punctuator::Ellipsis).to_string(), "...");
    assert_eq!(Token::Keyword(Keyword::Undefined).to_string(), "undefined");
    assert_eq!(Token::String(interned("a")).to_string(), "'a'");
    assert_eq!(Token::Integer(7).as_ref(), "Integer");
  }
}
