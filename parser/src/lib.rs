pub mod ast;
pub mod context;
pub mod diag;
pub mod idx;
pub mod lexer;
pub mod names;
pub mod parser;
pub mod token;
pub mod token_stream;

pub mod internal {
  pub use crate::ast::*;
  pub use crate::context::*;
  pub use crate::diag::*;
  pub use crate::idx;
  pub use crate::lexer::*;
  pub use crate::names::*;
  pub use crate::parser::*;
  pub use crate::token::*;
  pub use crate::token_stream::*;
  pub use tracing::{debug, instrument, trace, warn};
}

use internal::*;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
  #[error(transparent)]
  Lex(#[from] LexError),
  #[error(transparent)]
  Parse(#[from] ParseError),
}

/// Lexes, parses and resolves `src`.
pub fn analyze(src: &str) -> Result<Context, Error> {
  let prog = Parser::new_str(src)?.parse()?;
  Ok(Resolver::new(prog).resolve())
}

#[cfg(test)]
static INIT: std::sync::Once = std::sync::Once::new();

#[cfg(test)]
pub(crate) fn configure_test_tracing() {
  use tracing_subscriber::fmt::format::FmtSpan;
  use tracing_subscriber::{EnvFilter, fmt};

  INIT.call_once(|| {
    let subscriber = fmt::Subscriber::builder()
      .with_env_filter(EnvFilter::from_default_env())
      .with_test_writer()
      .with_span_events(FmtSpan::ACTIVE)
      .finish();
    tracing::subscriber::set_global_default(subscriber)
      .expect("setting default tracing subscriber failed");
  });
}
