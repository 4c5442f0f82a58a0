use crate::internal::*;

/// A resolved program together with the advisories raised while resolving.
/// The program is read-only from here on, so the bindings made by the
/// resolver and the declaration table built here cannot drift apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
  prog: Prog,
  decls: DeclTable,
  pub diagnostics: Vec<Diagnostic>,
}

impl Context {
  pub fn new(prog: Prog, diagnostics: Vec<Diagnostic>) -> Self {
    let decls = DeclTable::new(&prog);
    Context { prog, decls, diagnostics }
  }

  pub const fn prog(&self) -> &Prog {
    &self.prog
  }

  pub fn declaration(&self, id: idx::Decl) -> Option<&FunctionDecl> {
    self.decls.get(&self.prog, id)
  }

  /// The declaration `call` is bound to. `None` for unresolved calls and for
  /// calls whose binding names a declaration of another function, which
  /// happens when the call comes from a different program.
  pub fn declaration_of(&self, call: &FunctionCall) -> Option<&FunctionDecl> {
    self
      .declaration(call.resolution()?)
      .filter(|decl| decl.name == call.name)
  }

  pub fn unresolved_calls(&self) -> Vec<&FunctionCall> {
    self
      .prog
      .calls()
      .into_iter()
      .filter(|call| !call.is_resolved())
      .collect()
  }

  pub fn dump(&self) -> String {
    self.prog.to_string()
  }
}
