use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
  Keyword,
  Ident,
  StringLit,
  Separator,
  Operator,
  Eof,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
  pub kind: TokenKind,
  pub text: String,
}

impl Token {
  pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
    Token { kind, text: text.into() }
  }

  pub fn keyword(text: impl Into<String>) -> Self {
    Self::new(TokenKind::Keyword, text)
  }

  pub fn ident(text: impl Into<String>) -> Self {
    Self::new(TokenKind::Ident, text)
  }

  pub fn string_lit(text: impl Into<String>) -> Self {
    Self::new(TokenKind::StringLit, text)
  }

  pub fn separator(text: impl Into<String>) -> Self {
    Self::new(TokenKind::Separator, text)
  }

  pub fn operator(text: impl Into<String>) -> Self {
    Self::new(TokenKind::Operator, text)
  }

  pub fn eof() -> Self {
    Self::new(TokenKind::Eof, "")
  }

  pub fn is(&self, kind: TokenKind, text: &str) -> bool {
    self.kind == kind && self.text == text
  }

  pub fn is_separator(&self, text: &str) -> bool {
    self.is(TokenKind::Separator, text)
  }

  pub const fn is_eof(&self) -> bool {
    matches!(self.kind, TokenKind::Eof)
  }
}

impl fmt::Display for TokenKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      TokenKind::Keyword => "keyword",
      TokenKind::Ident => "identifier",
      TokenKind::StringLit => "string literal",
      TokenKind::Separator => "separator",
      TokenKind::Operator => "operator",
      TokenKind::Eof => "end of input",
    };
    f.write_str(name)
  }
}

impl fmt::Display for Token {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.kind {
      TokenKind::Eof => write!(f, "{}", self.kind),
      TokenKind::StringLit => write!(f, "{} \"{}\"", self.kind, self.text),
      _ => write!(f, "{} `{}`", self.kind, self.text),
    }
  }
}
