use std::fmt;

use crate::internal::{TokenKind as T, *};

/// Recursive descent parser for
///
/// ```text
/// prog         = (functionDecl | functionCall)* EndOfInput ;
/// functionDecl = "function" Identifier "(" ")" functionBody ;
/// functionBody = "{" statement* "}" ;
/// statement    = functionDecl | functionCall ;
/// functionCall = Identifier "(" argumentList? ")" ";" ;
/// argumentList = StringLiteral ("," StringLiteral)* ;
/// ```
#[derive(Debug)]
pub struct Parser {
  tokens: TokenStream,
  depth: usize,
}

/// How deep function bodies may nest. Each level costs a few stack frames,
/// deeper input is rejected with `Expected::ShallowerNesting`.
pub const MAX_DEPTH: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("syntax error at token {pos}: expected {expected}, found {found}")]
pub struct ParseError {
  pub pos: idx::Token,
  pub expected: Expected,
  pub found: Token,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expected {
  Ident,
  Separator(&'static str),
  BodyOpen,
  BodyClose { name: String },
  Statement,
  ShallowerNesting,
}

/// `Ok(None)` means the rule did not apply here, the caller may try
/// another alternative. `Err` aborts the whole parse.
type Parsed<N> = Result<Option<N>, ParseError>;

impl Parser {
  pub fn new(tokens: Vec<Token>) -> Parser {
    #[cfg(test)]
    crate::configure_test_tracing();

    Parser { tokens: TokenStream::new(tokens), depth: 0 }
  }

  pub fn new_str(src: &str) -> Result<Parser, LexError> {
    Ok(Parser::new(Lexer::new(src).lex()?))
  }

  #[instrument(skip_all)]
  pub fn parse(mut self) -> Result<Prog, ParseError> {
    trace!(num_tokens = self.tokens.len(), "Parser::parse()");
    self.parse_prog()
  }

  #[instrument(skip_all)]
  fn parse_prog(&mut self) -> Result<Prog, ParseError> {
    let mut statements = Vec::new();
    while !self.tokens.peek().is_eof() {
      let Some(stmt) = self.parse_statement()? else {
        return Err(self.error(Expected::Statement));
      };
      statements.push(stmt);
    }
    Ok(Prog::new(statements))
  }

  #[instrument(skip_all)]
  fn parse_statement(&mut self) -> Parsed<Statement> {
    if let Some(decl) = self.parse_function_decl()? {
      return Ok(Some(decl.into()));
    }
    if let Some(call) = self.parse_function_call()? {
      return Ok(Some(call.into()));
    }
    Ok(None)
  }

  #[instrument(skip_all)]
  fn parse_function_decl(&mut self) -> Parsed<FunctionDecl> {
    self.attempt(Self::function_decl)
  }

  fn function_decl(&mut self) -> Parsed<FunctionDecl> {
    if !self.tokens.peek().is(T::Keyword, "function") {
      return Ok(None);
    }
    self.tokens.advance();
    let name = self.expect_ident()?;
    self.expect_separator("(")?;
    self.expect_separator(")")?;
    let body = self.parse_function_body(&name)?;
    Ok(Some(FunctionDecl::new(name, body)))
  }

  /// Only entered once a declaration header has been consumed, so every
  /// mismatch here is a syntax error.
  #[instrument(skip_all, fields(function = %name))]
  fn parse_function_body(&mut self, name: &str) -> Result<FunctionBody, ParseError> {
    if !self.tokens.peek().is_separator("{") {
      return Err(self.error(Expected::BodyOpen));
    }
    if self.depth == MAX_DEPTH {
      return Err(self.error(Expected::ShallowerNesting));
    }
    self.tokens.advance();
    self.depth += 1;
    let statements = self.body_statements(name);
    self.depth -= 1;
    Ok(FunctionBody::new(statements?))
  }

  fn body_statements(&mut self, name: &str) -> Result<Vec<Statement>, ParseError> {
    let mut statements = Vec::new();
    loop {
      if self.eat_separator("}") {
        break;
      }
      let stmt = match self.parse_statement()? {
        Some(stmt) => stmt,
        None => return Err(self.error(Expected::BodyClose { name: name.to_string() })),
      };
      statements.push(stmt);
    }
    Ok(statements)
  }

  #[instrument(skip_all)]
  fn parse_function_call(&mut self) -> Parsed<FunctionCall> {
    self.attempt(Self::function_call)
  }

  fn function_call(&mut self) -> Parsed<FunctionCall> {
    let Some(name) = self.eat(T::Ident) else {
      return Ok(None);
    };
    if !self.eat_separator("(") {
      return Ok(None);
    }
    let mut arguments = Vec::new();
    if let Some(arg) = self.eat(T::StringLit) {
      arguments.push(arg);
      while self.eat_separator(",") {
        let Some(arg) = self.eat(T::StringLit) else {
          return Ok(None);
        };
        arguments.push(arg);
      }
    }
    if !self.eat_separator(")") || !self.eat_separator(";") {
      return Ok(None);
    }
    Ok(Some(FunctionCall::new(name, arguments)))
  }

  /// Runs `rule` from the current position and rewinds to it unless the
  /// rule matched. Callers never see a cursor moved by a failed alternative.
  fn attempt<N>(&mut self, rule: fn(&mut Self) -> Parsed<N>) -> Parsed<N> {
    let mark = self.tokens.current_position();
    let parsed = rule(self);
    match &parsed {
      Ok(Some(_)) => {}
      Ok(None) => {
        trace!(%mark, at = %self.tokens.current_position(), "no match, backtracking");
        self.tokens.restore_to(mark);
      }
      Err(err) => {
        trace!(%mark, %err, "syntax error, backtracking");
        self.tokens.restore_to(mark);
      }
    }
    parsed
  }

  fn expect_ident(&mut self) -> Result<String, ParseError> {
    match self.eat(T::Ident) {
      Some(ident) => Ok(ident),
      None => Err(self.error(Expected::Ident)),
    }
  }

  fn expect_separator(&mut self, text: &'static str) -> Result<(), ParseError> {
    if self.eat_separator(text) {
      Ok(())
    } else {
      Err(self.error(Expected::Separator(text)))
    }
  }

  fn eat(&mut self, kind: TokenKind) -> Option<String> {
    if self.tokens.peek().kind != kind {
      return None;
    }
    Some(self.tokens.advance().text.clone())
  }

  fn eat_separator(&mut self, text: &str) -> bool {
    let matched = self.tokens.peek().is_separator(text);
    if matched {
      self.tokens.advance();
    }
    matched
  }

  fn error(&self, expected: Expected) -> ParseError {
    ParseError {
      pos: self.tokens.current_position(),
      expected,
      found: self.tokens.peek().clone(),
    }
  }
}

impl fmt::Display for Expected {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Expected::Ident => f.write_str("a function name"),
      Expected::Separator(text) => write!(f, "`{text}`"),
      Expected::BodyOpen => f.write_str("`{` opening the function body"),
      Expected::BodyClose { name } => write!(f, "`}}` closing the body of `{name}`"),
      Expected::Statement => f.write_str("a function declaration or call"),
      Expected::ShallowerNesting => {
        write!(f, "function bodies nested at most {MAX_DEPTH} deep")
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;
  use quickcheck::{Arbitrary, Gen, QuickCheck};

  fn parse(input: &str) -> Result<Prog, ParseError> {
    Parser::new_str(input).unwrap().parse()
  }

  fn call(name: &str, args: &[&str]) -> Statement {
    FunctionCall::new(name, args.iter().map(|arg| arg.to_string()).collect()).into()
  }

  fn decl(name: &str, statements: Vec<Statement>) -> Statement {
    FunctionDecl::new(name, FunctionBody::new(statements)).into()
  }

  #[test]
  fn parse_missing_body_opener() {
    // `function sayHello()` followed directly by its statements
    let tokens = vec![
      Token::keyword("function"),
      Token::ident("sayHello"),
      Token::separator("("),
      Token::separator(")"),
      Token::ident("println"),
      Token::separator("("),
      Token::string_lit("Hello world!"),
      Token::separator(")"),
      Token::separator(";"),
      Token::separator("}"),
      Token::ident("sayHello"),
      Token::separator("("),
      Token::separator(")"),
      Token::separator(";"),
      Token::eof(),
    ];
    assert_eq!(
      Parser::new(tokens).parse(),
      Err(ParseError {
        pos: idx::Token::new(4),
        expected: Expected::BodyOpen,
        found: Token::ident("println"),
      })
    );
  }

  #[test]
  fn parse_hello_program() {
    let input = r#"
      function sayHello() {
        println("Hello world!");
      }
      sayHello();"#;
    assert_eq!(
      parse(input),
      Ok(Prog::new(vec![
        decl("sayHello", vec![call("println", &["Hello world!"])]),
        call("sayHello", &[]),
      ]))
    );
  }

  #[test]
  fn parse_lone_call() {
    assert_eq!(parse("foo();"), Ok(Prog::new(vec![call("foo", &[])])));
  }

  #[test]
  fn parse_duplicate_declarations() {
    assert_eq!(
      parse("function f(){} function f(){} f();"),
      Ok(Prog::new(vec![decl("f", vec![]), decl("f", vec![]), call("f", &[])]))
    );
  }

  #[test]
  fn parse_empty_program() {
    assert_eq!(parse(""), Ok(Prog::default()));
    assert_eq!(Parser::new(vec![]).parse(), Ok(Prog::default()));
  }

  #[test]
  fn parse_argument_lists() {
    assert_eq!(
      parse(r#"log("a"); log("a", "b", "c");"#),
      Ok(Prog::new(vec![
        call("log", &["a"]),
        call("log", &["a", "b", "c"]),
      ]))
    );
  }

  #[test]
  fn parse_nested_declarations() {
    assert_eq!(
      parse("function outer() { function inner() { a(); } inner(); }"),
      Ok(Prog::new(vec![decl(
        "outer",
        vec![decl("inner", vec![call("a", &[])]), call("inner", &[])]
      )]))
    );
  }

  #[test]
  fn parse_header_errors() {
    let cases: &[(&str, u32, Expected, Token)] = &[
      ("function () {}", 1, Expected::Ident, Token::separator("(")),
      ("function f) {}", 2, Expected::Separator("("), Token::separator(")")),
      ("function f( {}", 3, Expected::Separator(")"), Token::separator("{")),
      ("function f()", 4, Expected::BodyOpen, Token::eof()),
    ];
    for (input, pos, expected, found) in cases {
      assert_eq!(
        parse(input),
        Err(ParseError {
          pos: idx::Token::new(*pos),
          expected: expected.clone(),
          found: found.clone(),
        }),
        "input: {input}"
      );
    }
  }

  #[test]
  fn parse_unterminated_body() {
    assert_eq!(
      parse("function f() { a();"),
      Err(ParseError {
        pos: idx::Token::new(9),
        expected: Expected::BodyClose { name: "f".to_string() },
        found: Token::eof(),
      })
    );
  }

  #[test]
  fn parse_stray_token_in_body() {
    assert_eq!(
      parse("function f() { a() }"),
      Err(ParseError {
        pos: idx::Token::new(5),
        expected: Expected::BodyClose { name: "f".to_string() },
        found: Token::ident("a"),
      })
    );
  }

  #[test]
  fn parse_malformed_calls() {
    let cases: &[(&str, u32, Token)] = &[
      ("foo()", 0, Token::ident("foo")),
      ("ok(); foo(;", 4, Token::ident("foo")),
      (r#"foo("a",);"#, 0, Token::ident("foo")),
      (r#"foo("a" "b");"#, 0, Token::ident("foo")),
      ("+", 0, Token::operator("+")),
      ("}", 0, Token::separator("}")),
    ];
    for (input, pos, found) in cases {
      assert_eq!(
        parse(input),
        Err(ParseError {
          pos: idx::Token::new(*pos),
          expected: Expected::Statement,
          found: found.clone(),
        }),
        "input: {input}"
      );
    }
  }

  #[test]
  fn parse_error_message() {
    let err = parse("function f()").unwrap_err();
    assert_eq!(
      err.to_string(),
      "syntax error at token 4: expected `{` opening the function body, found end of input"
    );
  }

  fn nested_decls(depth: usize) -> String {
    "function a() {".repeat(depth) + &"}".repeat(depth)
  }

  #[test]
  fn parse_nesting_up_to_the_limit() {
    let prog = parse(&nested_decls(MAX_DEPTH)).unwrap();
    assert_eq!(prog.declarations().len(), MAX_DEPTH);
  }

  #[test]
  fn parse_rejects_nesting_past_the_limit() {
    let expected = Err(ParseError {
      pos: idx::Token::new(MAX_DEPTH as u32 * 5 + 4),
      expected: Expected::ShallowerNesting,
      found: Token::separator("{"),
    });
    assert_eq!(parse(&nested_decls(MAX_DEPTH + 1)), expected);
    assert_eq!(parse(&nested_decls(10_000)), expected);
    assert_eq!(
      expected.unwrap_err().to_string(),
      "syntax error at token 644: expected function bodies nested at most 128 deep, found separator `{`"
    );
  }

  #[test]
  fn nesting_depth_unwinds_after_each_body() {
    let siblings = nested_decls(MAX_DEPTH).repeat(3);
    let prog = parse(&siblings).unwrap();
    assert_eq!(prog.statements().len(), 3);
  }

  #[test]
  fn failed_alternatives_restore_the_cursor() {
    let mut parser = Parser::new_str("function f( {} g(").unwrap();
    assert!(parser.parse_function_decl().is_err());
    assert_eq!(parser.tokens.current_position(), idx::Token::new(0));
    assert_eq!(parser.parse_function_call(), Ok(None));
    assert_eq!(parser.tokens.current_position(), idx::Token::new(0));
  }

  #[derive(Debug, Clone)]
  struct Tokens(Vec<Token>);

  impl Arbitrary for Tokens {
    fn arbitrary(g: &mut Gen) -> Self {
      let pool = [
        Token::keyword("function"),
        Token::ident("f"),
        Token::ident("g"),
        Token::string_lit("s"),
        Token::separator("("),
        Token::separator(")"),
        Token::separator("{"),
        Token::separator("}"),
        Token::separator(";"),
        Token::separator(","),
        Token::operator("+"),
      ];
      let len = usize::arbitrary(g) % (g.size() + 1);
      Tokens((0..len).map(|_| g.choose(&pool).unwrap().clone()).collect())
    }
  }

  #[test]
  fn rules_are_pure_on_no_match_or_error() {
    fn prop(tokens: Tokens, start: usize) -> bool {
      type Rule = fn(&mut Parser) -> bool;
      let rules: [Rule; 3] = [
        |p| matches!(p.parse_function_decl(), Ok(Some(_))),
        |p| matches!(p.parse_function_call(), Ok(Some(_))),
        |p| matches!(p.parse_statement(), Ok(Some(_))),
      ];
      let len = tokens.0.len();
      rules.iter().all(|rule| {
        let mut parser = Parser::new(tokens.0.clone());
        for _ in 0..start % (len + 1) {
          parser.tokens.advance();
        }
        let before = parser.tokens.current_position();
        let matched = rule(&mut parser);
        let after = parser.tokens.current_position();
        if matched { after > before } else { after == before }
      })
    }
    QuickCheck::new()
      .tests(500)
      .quickcheck(prop as fn(Tokens, usize) -> bool);
  }

  #[test]
  fn parse_terminates_on_arbitrary_tokens() {
    fn prop(tokens: Tokens) -> bool {
      match Parser::new(tokens.0.clone()).parse() {
        Ok(_) => true,
        Err(err) => err.pos.usize() < tokens.0.len() + 1,
      }
    }
    QuickCheck::new()
      .tests(500)
      .quickcheck(prop as fn(Tokens) -> bool);
  }

  #[test]
  fn token_reads_are_bounded_by_square_of_input() {
    fn prop(tokens: Tokens) -> bool {
      let mut parser = Parser::new(tokens.0);
      let n = parser.tokens.len();
      let _ = parser.parse_prog();
      parser.tokens.reads() <= 4 * n * n
    }
    QuickCheck::new()
      .tests(500)
      .quickcheck(prop as fn(Tokens) -> bool);
  }

  #[test]
  fn token_reads_are_linear_on_valid_input() {
    let input = format!(
      r#"{} log("a", "b", "c"); f(); {}"#,
      nested_decls(40),
      r#"function g() { log("x"); log(); }"#.repeat(20)
    );
    let mut parser = Parser::new_str(&input).unwrap();
    let n = parser.tokens.len();
    assert!(parser.parse_prog().is_ok());
    let reads = parser.tokens.reads();
    assert!(reads <= 4 * n, "{reads} reads for {n} tokens");
  }
}
