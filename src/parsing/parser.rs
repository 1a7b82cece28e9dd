/*!

A recursive-descent parser for destructuring declarations, destructuring assignments, and the handful of
expressions that appear on their right-hand sides.

```text
script      := statement*
statement   := declaration | assignment | log | expression  [';']
declaration := ('let' | 'const' | 'var') declarator (',' declarator)*
declarator  := binding ['=' expression]
assignment  := target '=' expression  |  '(' target '=' expression ')'
log         := 'console' '.' 'log' '(' [expression (',' expression)*] ')'
```

Patterns and literals share their brackets, so a statement is an assignment exactly when an `=` appears at its
outermost bracket depth. The parser looks ahead for one before committing to either reading.

*/

use crate::{
  error::ParseError,
  expression::{
    Element,
    Expression,
    Property,
  },
  environment::DeclarationKind,
  interner::{
    InternedString,
    interned,
    interned_static,
  },
  logging::{
    log,
    Channel,
  },
  parsing::lexer::{
    Keyword,
    Lexeme,
    Lexer,
    Punctuator,
    Token,
  },
  pattern::{
    MappingPattern,
    MappingSlot,
    MemberKey,
    Pattern,
    SequencePattern,
    SequenceSlot,
    Target,
  },
  value::Value,
};


#[derive(Clone, Debug, PartialEq)]
pub struct Declarator {
  pub target     : Target,
  pub initializer: Option<Expression>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Statement {
  Declaration {
    kind       : DeclarationKind,
    declarators: Vec<Declarator>,
  },
  Assignment {
    target: Target,
    source: Expression,
  },
  /// `console.log(...)`
  Log(Vec<Expression>),
  /// An expression evaluated for nothing but its errors, such as the directive `'use strict';`.
  Expression(Expression),
}


/// Parses a complete pattern, `[a, ...b]` or `{p: foo, q = 1}`.
pub fn parse_pattern(text: &str) -> Result<Pattern, ParseError> {
  let mut parser = Parser::new(text)?;
  let pattern = match parser.pattern(true)? {
    Target::Pattern(pattern) => *pattern,
    _ => return Err(parser.unexpected("a pattern")),
  };
  parser.expect_end()?;
  Ok(pattern)
}

pub fn parse_expression(text: &str) -> Result<Expression, ParseError> {
  let mut parser = Parser::new(text)?;
  let expression = parser.expression()?;
  parser.expect_end()?;
  Ok(expression)
}

pub fn parse_script(text: &str) -> Result<Vec<Statement>, ParseError> {
  let mut parser = Parser::new(text)?;
  let mut statements = Vec::new();
  while !parser.at_end() {
    if parser.eat(Punctuator::Semicolon) {
      continue;
    }
    statements.push(parser.statement()?);
  }
  log(Channel::Debug, 5, format!("Parsed {} statements.", statements.len()).as_str());
  Ok(statements)
}


pub struct Parser {
  lexemes: Vec<Lexeme>,
  cursor : usize,
}

impl Parser {
  pub fn new(text: &str) -> Result<Parser, ParseError> {
    Ok(Parser {
      lexemes: Lexer::tokenize(text)?,
      cursor : 0,
    })
  }

  // region Token stream

  fn peek(&self) -> Option<&Token> {
    self.peek_at(0)
  }

  fn peek_at(&self, offset: usize) -> Option<&Token> {
    self.lexemes.get(self.cursor + offset).map(|lexeme| &lexeme.token)
  }

  fn position(&self) -> usize {
    self.lexemes
        .get(self.cursor)
        .or_else(|| self.lexemes.last())
        .map_or(0, |lexeme| lexeme.position)
  }

  fn at_end(&self) -> bool {
    self.cursor >= self.lexemes.len()
  }

  fn advance(&mut self) -> Option<Token> {
    let token = self.peek().cloned();
    if token.is_some() {
      self.cursor += 1;
    }
    token
  }

  fn check(&self, punctuator: Punctuator) -> bool {
    self.peek() == Some(&Token::Punctuator(punctuator))
  }

  fn eat(&mut self, punctuator: Punctuator) -> bool {
    let found = self.check(punctuator);
    if found {
      self.cursor += 1;
    }
    found
  }

  fn expect(&mut self, punctuator: Punctuator) -> Result<(), ParseError> {
    if self.eat(punctuator) {
      Ok(())
    } else {
      Err(self.unexpected(punctuator.text()))
    }
  }

  fn expect_end(&self) -> Result<(), ParseError> {
    if self.at_end() {
      Ok(())
    } else {
      Err(self.unexpected("the end of the input"))
    }
  }

  fn unexpected(&self, expected: &'static str) -> ParseError {
    match self.lexemes.get(self.cursor) {
      Some(lexeme) => {
        ParseError::UnexpectedToken {
          expected,
          found   : lexeme.token.to_string(),
          position: lexeme.position,
        }
      }
      None => ParseError::UnexpectedEnd { expected },
    }
  }

  /// Whether an `=` appears before the current statement ends, at the bracket depth the scan starts at.
  fn assignment_ahead(&self, start: usize) -> bool {
    let mut depth = 0usize;
    for lexeme in self.lexemes.iter().skip(start) {
      match lexeme.token {
        Token::Punctuator(Punctuator::OpenBracket)
        | Token::Punctuator(Punctuator::OpenBrace)
        | Token::Punctuator(Punctuator::OpenParenthesis) => depth += 1,

        Token::Punctuator(Punctuator::CloseBracket)
        | Token::Punctuator(Punctuator::CloseBrace)
        | Token::Punctuator(Punctuator::CloseParenthesis) => {
          if depth == 0 {
            return false;
          }
          depth -= 1;
        }

        Token::Punctuator(Punctuator::Equals) if depth == 0 => return true,
        Token::Punctuator(Punctuator::Semicolon) if depth == 0 => return false,
        _ => {}
      }
    }
    false
  }

  // endregion

  // region Statements

  fn statement(&mut self) -> Result<Statement, ParseError> {
    let statement = if let Some(kind) = self.declaration_kind() {
      self.cursor += 1;
      self.declaration(kind)?
    } else if self.at_console_log() {
      self.cursor += 3;
      Statement::Log(self.arguments()?)
    } else if self.check(Punctuator::OpenParenthesis) && self.assignment_ahead(self.cursor + 1) {
      // `({a, b} = {a: 1, b: 2})`
      self.cursor += 1;
      let statement = self.assignment()?;
      self.expect(Punctuator::CloseParenthesis)?;
      statement
    } else if self.assignment_ahead(self.cursor) {
      self.assignment()?
    } else {
      Statement::Expression(self.expression()?)
    };

    if !self.at_end() && !self.eat(Punctuator::Semicolon) {
      return Err(self.unexpected(";"));
    }
    Ok(statement)
  }

  fn declaration_kind(&self) -> Option<DeclarationKind> {
    match self.peek() {
      Some(Token::Keyword(Keyword::Let))   => Some(DeclarationKind::Let),
      Some(Token::Keyword(Keyword::Const)) => Some(DeclarationKind::Const),
      Some(Token::Keyword(Keyword::Var))   => Some(DeclarationKind::Var),
      _ => None
    }
  }

  fn at_console_log(&self) -> bool {
    self.peek() == Some(&Token::Identifier(interned_static("console")))
        && self.peek_at(1) == Some(&Token::Punctuator(Punctuator::Dot))
        && self.peek_at(2) == Some(&Token::Identifier(interned_static("log")))
  }

  /// The declarators after the `let`, `const` or `var` keyword.
  fn declaration(&mut self, kind: DeclarationKind) -> Result<Statement, ParseError> {
    let mut declarators = Vec::new();
    loop {
      let position = self.position();
      let target = self.binding()?;
      let initializer = if self.eat(Punctuator::Equals) { Some(self.expression()?) } else { None };

      let needs_initializer = kind == DeclarationKind::Const || matches!(target, Target::Pattern(_));
      if needs_initializer && initializer.is_none() {
        return Err(ParseError::MissingInitializer { position });
      }
      declarators.push(Declarator { target, initializer });

      if !self.eat(Punctuator::Comma) {
        break;
      }
    }
    Ok(Statement::Declaration { kind, declarators })
  }

  fn assignment(&mut self) -> Result<Statement, ParseError> {
    let target = self.target(true)?;
    self.expect(Punctuator::Equals)?;
    let source = self.expression()?;
    Ok(Statement::Assignment { target, source })
  }

  fn arguments(&mut self) -> Result<Vec<Expression>, ParseError> {
    self.expect(Punctuator::OpenParenthesis)?;
    let mut arguments = Vec::new();
    while !self.eat(Punctuator::CloseParenthesis) {
      arguments.push(self.expression()?);
      if !self.eat(Punctuator::Comma) {
        self.expect(Punctuator::CloseParenthesis)?;
        break;
      }
    }
    Ok(arguments)
  }

  // endregion

  // region Patterns

  /// A declaration binds variables or patterns of variables, never members.
  fn binding(&mut self) -> Result<Target, ParseError> {
    self.target(false)
  }

  fn target(&mut self, allow_members: bool) -> Result<Target, ParseError> {
    match self.peek() {
      Some(Token::Punctuator(Punctuator::OpenBracket))
      | Some(Token::Punctuator(Punctuator::OpenBrace)) => self.pattern(allow_members),

      Some(Token::Identifier(name)) => {
        let name = *name;
        self.cursor += 1;
        if allow_members {
          self.member_target(name)
        } else {
          Ok(Target::Variable(name))
        }
      }

      Some(_) => {
        Err(ParseError::InvalidAssignmentTarget { position: self.position() })
      }

      None => Err(ParseError::UnexpectedEnd { expected: "an assignment target" }),
    }
  }

  /// The optional member part of `object[2]`, `object.key` or `object['key']`.
  fn member_target(&mut self, object: InternedString) -> Result<Target, ParseError> {
    if self.eat(Punctuator::Dot) {
      return match self.peek().and_then(Token::property_name) {
        Some(key) => {
          self.cursor += 1;
          Ok(Target::Member { object, key: MemberKey::Key(key) })
        }
        None => Err(ParseError::InvalidAssignmentTarget { position: self.position() }),
      };
    }

    if self.check(Punctuator::OpenBracket) {
      let position = self.position();
      self.cursor += 1;
      let key = match self.advance() {
        Some(Token::Integer(index)) if index >= 0 => MemberKey::Index(index as usize),
        Some(Token::Real(index)) => {
          match Value::Real(index).as_index() {
            Some(index) => MemberKey::Index(index),
            None        => return Err(ParseError::InvalidAssignmentTarget { position }),
          }
        }
        Some(Token::String(key)) => MemberKey::Key(key),
        _ => return Err(ParseError::InvalidAssignmentTarget { position }),
      };
      self.expect(Punctuator::CloseBracket)?;
      return Ok(Target::Member { object, key });
    }

    Ok(Target::Variable(object))
  }

  fn pattern(&mut self, allow_members: bool) -> Result<Target, ParseError> {
    if self.eat(Punctuator::OpenBracket) {
      Ok(self.sequence_pattern(allow_members)?.into())
    } else {
      self.expect(Punctuator::OpenBrace)?;
      Ok(self.mapping_pattern(allow_members)?.into())
    }
  }

  fn default(&mut self) -> Result<Option<Expression>, ParseError> {
    if self.eat(Punctuator::Equals) {
      Ok(Some(self.expression()?))
    } else {
      Ok(None)
    }
  }

  /// The part of a sequence pattern after its `[`.
  fn sequence_pattern(&mut self, allow_members: bool) -> Result<SequencePattern, ParseError> {
    let mut pattern = SequencePattern::default();

    loop {
      if self.eat(Punctuator::CloseBracket) {
        break;
      }
      if self.eat(Punctuator::Comma) {
        pattern.slots.push(SequenceSlot::Hole);
        continue;
      }

      if self.check(Punctuator::Ellipsis) {
        let position = self.position();
        self.cursor += 1;
        pattern.rest = Some(self.target(allow_members)?);
        if !self.check(Punctuator::CloseBracket) {
          return Err(ParseError::RestNotLast { position });
        }
        continue;
      }

      let target = self.target(allow_members)?;
      let default = self.default()?;
      pattern.slots.push(SequenceSlot::Element { target, default });

      if !self.eat(Punctuator::Comma) {
        self.expect(Punctuator::CloseBracket)?;
        break;
      }
    }

    Ok(pattern)
  }

  /// The part of a mapping pattern after its `{`.
  fn mapping_pattern(&mut self, allow_members: bool) -> Result<MappingPattern, ParseError> {
    let mut pattern = MappingPattern::default();

    while !self.eat(Punctuator::CloseBrace) {
      let position = self.position();

      if self.eat(Punctuator::Ellipsis) {
        pattern.rest = Some(self.target(allow_members)?);
        if !self.check(Punctuator::CloseBrace) {
          return Err(ParseError::RestNotLast { position });
        }
        continue;
      }

      let (key, key_token) = self.property_key()?;
      let slot = if self.eat(Punctuator::Colon) {
        MappingSlot {
          key,
          target : self.target(allow_members)?,
          default: self.default()?,
        }
      } else {
        if !matches!(key_token, Token::Identifier(_)) {
          return Err(ParseError::InvalidShorthand { key: key_token.to_string(), position });
        }
        MappingSlot {
          key,
          target : Target::Variable(key),
          default: self.default()?,
        }
      };
      pattern.slots.push(slot);

      if !self.eat(Punctuator::Comma) {
        self.expect(Punctuator::CloseBrace)?;
        break;
      }
    }

    Ok(pattern)
  }

  /// A property name in a mapping pattern or literal: an identifier, a keyword, a string, or an integer.
  fn property_key(&mut self) -> Result<(InternedString, Token), ParseError> {
    let token = match self.advance() {
      Some(token) => token,
      None        => return Err(ParseError::UnexpectedEnd { expected: "a property name" }),
    };

    let key = match &token {
      Token::String(key) => Some(*key),
      Token::Integer(n)  => Some(interned(&n.to_string())),
      other              => other.property_name(),
    };

    match key {
      Some(key) => Ok((key, token)),
      None => {
        self.cursor -= 1;
        Err(self.unexpected("a property name"))
      }
    }
  }

  // endregion

  // region Expressions

  fn expression(&mut self) -> Result<Expression, ParseError> {
    let mut expression = self.primary()?;

    loop {
      if self.eat(Punctuator::Dot) {
        let key = match self.peek().and_then(Token::property_name) {
          Some(key) => key,
          None      => return Err(self.unexpected("a property name")),
        };
        self.cursor += 1;
        expression = Expression::member(expression, Value::String(key));
      } else if self.eat(Punctuator::OpenBracket) {
        let key = self.expression()?;
        self.expect(Punctuator::CloseBracket)?;
        expression = Expression::member(expression, key);
      } else {
        break;
      }
    }

    Ok(expression)
  }

  fn primary(&mut self) -> Result<Expression, ParseError> {
    let token = match self.peek() {
      Some(token) => token.clone(),
      None        => return Err(ParseError::UnexpectedEnd { expected: "an expression" }),
    };

    let expression = match token {
      Token::Integer(n)    => Expression::Literal(Value::Integer(n)),
      Token::Real(r)       => Expression::Literal(Value::Real(r)),
      Token::String(s)     => Expression::Literal(Value::String(s)),
      Token::Identifier(n) => Expression::Variable(n),

      Token::Keyword(Keyword::True)      => Expression::Literal(Value::Boolean(true)),
      Token::Keyword(Keyword::False)     => Expression::Literal(Value::Boolean(false)),
      Token::Keyword(Keyword::Null)      => Expression::Literal(Value::Null),
      Token::Keyword(Keyword::Undefined) => Expression::Literal(Value::Undefined),

      Token::Punctuator(Punctuator::OpenBracket) => {
        self.cursor += 1;
        return self.sequence_literal();
      }
      Token::Punctuator(Punctuator::OpenBrace) => {
        self.cursor += 1;
        return self.mapping_literal();
      }
      Token::Punctuator(Punctuator::OpenParenthesis) => {
        self.cursor += 1;
        let inner = self.expression()?;
        self.expect(Punctuator::CloseParenthesis)?;
        return Ok(inner);
      }

      _ => return Err(self.unexpected("an expression")),
    };

    self.cursor += 1;
    Ok(expression)
  }

  /// The part of a sequence literal after its `[`.
  fn sequence_literal(&mut self) -> Result<Expression, ParseError> {
    let mut elements = Vec::new();
    while !self.eat(Punctuator::CloseBracket) {
      if self.eat(Punctuator::Ellipsis) {
        elements.push(Element::Spread(self.expression()?));
      } else {
        elements.push(Element::Item(self.expression()?));
      }
      if !self.eat(Punctuator::Comma) {
        self.expect(Punctuator::CloseBracket)?;
        break;
      }
    }
    Ok(Expression::Sequence(elements))
  }

  /// The part of a mapping literal after its `{`.
  fn mapping_literal(&mut self) -> Result<Expression, ParseError> {
    let mut properties = Vec::new();
    while !self.eat(Punctuator::CloseBrace) {
      let position = self.position();
      if self.eat(Punctuator::Ellipsis) {
        properties.push(Property::Spread(self.expression()?));
      } else {
        let (key, key_token) = self.property_key()?;
        if self.eat(Punctuator::Colon) {
          properties.push(Property::Entry(key, self.expression()?));
        } else if matches!(key_token, Token::Identifier(_)) {
          properties.push(Property::Entry(key, Expression::Variable(key)));
        } else {
          return Err(ParseError::InvalidShorthand { key: key_token.to_string(), position });
        }
      }
      if !self.eat(Punctuator::Comma) {
        self.expect(Punctuator::CloseBrace)?;
        break;
      }
    }
    Ok(Expression::Mapping(properties))
  }

  // endregion
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn sequence_patterns() {
    let pattern = parse_pattern("[a = 5, , arr[2], ...b]").unwrap();
    assert_eq!(
      pattern,
      SequencePattern::new(vec![
        SequenceSlot::variable("a").with_default(5),
        SequenceSlot::Hole,
        SequenceSlot::target(Target::index("arr", 2)),
      ]).with_rest("b").into()
    );
    assert_eq!(pattern.to_string(), "[a = 5, , arr[2], ...b]");
  }

  #[test]
  fn mapping_patterns() {
    let text = "{p: foo, a = 10, b: bb = 5, inner: [x, y], ...others}";
    let pattern = parse_pattern(text).unwrap();
    assert_eq!(pattern.to_string(), text);
  }

  #[test]
  fn holes() {
    assert_eq!(parse_pattern("[, b]").unwrap().to_string(), "[, b]");
    assert_eq!(parse_pattern("[a, ,]").unwrap().to_string(), "[a, ,]");
    assert_eq!(parse_pattern("[a,]").unwrap(), SequencePattern::variables(&["a"]).into());
  }

  #[test]
  fn rest_must_be_last() {
    assert_eq!(parse_pattern("[a, ...b, c]"), Err(ParseError::RestNotLast { position: 4 }));
    assert_eq!(parse_pattern("{...o, a}"), Err(ParseError::RestNotLast { position: 1 }));
  }

  #[test]
  fn shorthand_needs_an_identifier() {
    assert_eq!(
      parse_pattern("{'a b'}"),
      Err(ParseError::InvalidShorthand { key: "'a b'".to_string(), position: 1 })
    );
    assert!(parse_pattern("{'a b': ab}").is_ok());
  }

  #[test]
  fn expressions() {
    let expression = parse_expression("[arr[1], o.p, ...rest, {a: 1, b, ...o}, 'x', null]").unwrap();
    assert_eq!(expression.to_string(), "[arr[1], o.p, ...rest, {a: 1, b: b, ...o}, 'x', null]");
    assert_eq!(parse_expression("arr.length").unwrap(), Expression::member(Expression::variable("arr"), "length"));
  }

  #[test]
  fn declarations() {
    let statements = parse_script("let a, b = 2; const [x, ...y] = [1, 2, 3]").unwrap();
    assert_eq!(statements.len(), 2);
    assert_eq!(
      statements[0],
      Statement::Declaration {
        kind       : DeclarationKind::Let,
        declarators: vec![
          Declarator { target: Target::variable("a"), initializer: None },
          Declarator { target: Target::variable("b"), initializer: Some(2.into()) },
        ],
      }
    );
  }

  #[test]
  fn declarations_need_initializers() {
    assert_eq!(parse_script("const a;"), Err(ParseError::MissingInitializer { position: 6 }));
    assert_eq!(parse_script("let [a];"), Err(ParseError::MissingInitializer { position: 4 }));
  }

  #[test]
  fn declarations_cannot_bind_members() {
    assert!(matches!(parse_script("let [arr[0]] = [1];"), Err(ParseError::UnexpectedToken { .. })));
  }

  #[test]
  fn assignments() {
    let statements = parse_script("[arr[2], arr[1]] = [arr[1], arr[2]];\n({ a, b } = { a: 1, b: 2 });").unwrap();
    assert!(matches!(statements[0], Statement::Assignment { .. }));
    match &statements[1] {
      Statement::Assignment { target, source } => {
        assert_eq!(target.to_string(), "{a, b}");
        assert_eq!(source.to_string(), "{a: 1, b: 2}");
      }
      other => panic!("expected an assignment, found {:?}", other),
    }
  }

  #[test]
  fn console_log_and_directives() {
    let statements = parse_script("'use strict';\nconsole.log(a, [1]); // 1").unwrap();
    assert_eq!(statements[0], Statement::Expression(Expression::from("use strict")));
    assert_eq!(
      statements[1],
      Statement::Log(vec![Expression::Variable(interned("a")), Expression::sequence(vec![1.into()])])
    );
  }

  #[test]
  fn invalid_targets() {
    assert_eq!(parse_script("3 = a;"), Err(ParseError::InvalidAssignmentTarget { position: 0 }));
    assert_eq!(parse_script("o.3 = a;"), Err(ParseError::InvalidAssignmentTarget { position: 2 }));
    assert_eq!(parse_script("arr[1.5] = a;"), Err(ParseError::InvalidAssignmentTarget { position: 3 }));
    assert_eq!(parse_script("arr[-1] = a;"), Err(ParseError::InvalidAssignmentTarget { position: 3 }));
  }

  #[test]
  fn integral_reals_index_members() {
    assert_eq!(
      parse_script("arr[2.0] = a;"),
      Ok(vec![Statement::Assignment { target: Target::index("arr", 2), source: Expression::variable("a") }])
    );
  }

  #[test]
  fn statements_need_separators() {
    assert!(matches!(parse_script("a b"), Err(ParseError::UnexpectedToken { expected: ";", .. })));
    assert_eq!(parse_expression("[1, 2"), Err(ParseError::UnexpectedEnd { expected: "]" }));
  }
}
