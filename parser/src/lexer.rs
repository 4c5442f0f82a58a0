use crate::internal::{TokenKind as T, *};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexError {
  #[error("unexpected character `{ch}` at offset {offset}")]
  UnexpectedChar { offset: u32, ch: char },
  #[error("unterminated string literal starting at offset {offset}")]
  UnterminatedString { offset: u32 },
}

#[derive(Debug)]
pub struct Lexer<'src> {
  src: &'src str,
  pos: usize,
}

impl<'src> Lexer<'src> {
  pub fn new(src: &'src str) -> Self {
    assert!(src.len() <= u32::MAX as usize);
    Lexer { src, pos: 0 }
  }

  /// Lexes the whole source, the result always ends with a single `Eof`.
  pub fn lex(mut self) -> Result<Vec<Token>, LexError> {
    let mut tokens = Vec::with_capacity(64);
    loop {
      let token = self.next_token()?;
      let done = token.is_eof();
      tokens.push(token);
      if done {
        break;
      }
    }
    trace!(num_tokens = tokens.len(), "lexed source");
    Ok(tokens)
  }

  pub fn next_token(&mut self) -> Result<Token, LexError> {
    self.skip_trivia();
    if self.eof() {
      return Ok(Token::eof());
    }
    match self.byte() {
      b'(' | b')' | b'{' | b'}' | b';' | b',' => Ok(self.simple_token(T::Separator)),
      b'+' | b'-' | b'*' | b'/' | b'=' | b'<' | b'>' | b'!' => Ok(self.simple_token(T::Operator)),
      b'"' => self.string_lit(),
      b if b.is_ascii_alphabetic() || b == b'_' => Ok(self.ident()),
      _ => Err(LexError::UnexpectedChar {
        offset: self.pos as u32,
        ch: self.src[self.pos..].chars().next().unwrap_or('\0'),
      }),
    }
  }

  fn simple_token(&mut self, kind: TokenKind) -> Token {
    let token = Token::new(kind, &self.src[self.pos..self.pos + 1]);
    self.pos += 1;
    token
  }

  fn string_lit(&mut self) -> Result<Token, LexError> {
    let start = self.pos;
    self.pos += 1; // "
    while !self.eof() && self.byte() != b'"' {
      self.pos += 1;
    }
    if self.eof() {
      return Err(LexError::UnterminatedString { offset: start as u32 });
    }
    let token = Token::string_lit(&self.src[start + 1..self.pos]);
    self.pos += 1; // "
    Ok(token)
  }

  fn ident(&mut self) -> Token {
    let start = self.pos;
    self.pos += 1;
    while !self.eof() && (self.byte().is_ascii_alphanumeric() || self.byte() == b'_') {
      self.pos += 1;
    }
    match &self.src[start..self.pos] {
      "function" => Token::keyword("function"),
      lexeme => Token::ident(lexeme),
    }
  }

  fn skip_trivia(&mut self) {
    loop {
      while !self.eof() && self.byte().is_ascii_whitespace() {
        self.pos += 1;
      }
      if self.byte() == b'/' && self.peek() == b'/' {
        while !self.eof() && self.byte() != b'\n' {
          self.pos += 1;
        }
      } else {
        return;
      }
    }
  }

  fn byte(&self) -> u8 {
    *self.src.as_bytes().get(self.pos).unwrap_or(&0)
  }

  fn peek(&self) -> u8 {
    *self.src.as_bytes().get(self.pos + 1).unwrap_or(&0)
  }

  const fn eof(&self) -> bool {
    self.pos >= self.src.len()
  }
}
