use crate::internal::*;

/// Advisory produced by name resolution, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Diagnostic {
  #[error("function `{name}` is declared more than once, declaration {duplicate} is shadowed by {first}")]
  DuplicateDeclaration {
    name: String,
    first: idx::Decl,
    duplicate: idx::Decl,
  },
}
