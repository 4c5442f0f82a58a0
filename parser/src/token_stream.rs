use crate::internal::*;

/// Cursor over an immutable token buffer that always ends in exactly one
/// `Eof` token. Reading past the end keeps yielding that `Eof`.
#[derive(Debug, Clone)]
pub struct TokenStream {
  tokens: Vec<Token>,
  pos: usize,
  #[cfg(test)]
  reads: std::cell::Cell<usize>,
}

impl TokenStream {
  pub fn new(mut tokens: Vec<Token>) -> Self {
    match tokens.iter().position(Token::is_eof) {
      Some(eof) => tokens.truncate(eof + 1),
      None => tokens.push(Token::eof()),
    }
    assert!(tokens.len() <= u32::MAX as usize);
    TokenStream {
      tokens,
      pos: 0,
      #[cfg(test)]
      reads: std::cell::Cell::new(0),
    }
  }

  pub fn peek(&self) -> &Token {
    #[cfg(test)]
    self.reads.set(self.reads.get() + 1);
    &self.tokens[self.pos]
  }

  pub fn advance(&mut self) -> &Token {
    #[cfg(test)]
    self.reads.set(self.reads.get() + 1);
    let current = self.pos;
    if current < self.last() {
      self.pos += 1;
    }
    &self.tokens[current]
  }

  pub fn current_position(&self) -> idx::Token {
    idx::Token::new(self.pos as u32)
  }

  pub fn restore_to(&mut self, mark: idx::Token) {
    debug_assert!(mark.usize() <= self.last(), "mark out of range");
    self.pos = mark.usize().min(self.last());
  }

  pub fn is_at_end(&self) -> bool {
    self.pos == self.last()
  }

  /// Number of tokens, including the trailing `Eof`.
  pub fn len(&self) -> usize {
    self.tokens.len()
  }

  /// True when the stream holds nothing but the trailing `Eof`.
  pub fn is_empty(&self) -> bool {
    self.tokens.len() == 1
  }

  fn last(&self) -> usize {
    self.tokens.len() - 1
  }

  /// Calls to `peek` and `advance` so far.
  #[cfg(test)]
  pub(crate) fn reads(&self) -> usize {
    self.reads.get()
  }
}
