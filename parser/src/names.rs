use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use crate::internal::*;

/// Binds every call in a parsed program to a declaration of the same name.
/// Names live in one global namespace: a declaration is visible to calls
/// before it and outside of the body it sits in. When names collide the
/// first declaration in pre-order wins.
#[derive(Debug)]
pub struct Resolver {
  prog: Prog,
  symbols: BTreeMap<String, idx::Decl>,
  diagnostics: Vec<Diagnostic>,
}

impl Resolver {
  pub const fn new(prog: Prog) -> Resolver {
    Resolver {
      prog,
      symbols: BTreeMap::new(),
      diagnostics: Vec::new(),
    }
  }

  #[instrument(skip_all)]
  pub fn resolve(mut self) -> Context {
    self.visit_decls();
    self.visit_calls();
    Context::new(self.prog, self.diagnostics)
  }

  #[instrument(skip_all)]
  fn visit_decls(&mut self) {
    for (n, decl) in self.prog.declarations().into_iter().enumerate() {
      let id = idx::Decl::new(n as u32);
      match self.symbols.entry(decl.name.clone()) {
        Entry::Vacant(entry) => {
          trace!(name = %decl.name, %id, "declared");
          entry.insert(id);
        }
        Entry::Occupied(entry) => {
          let first = *entry.get();
          warn!(name = %decl.name, %first, duplicate = %id, "duplicate declaration");
          self.diagnostics.push(Diagnostic::DuplicateDeclaration {
            name: decl.name.clone(),
            first,
            duplicate: id,
          });
        }
      }
    }
  }

  /// Binds each call from the symbol table alone. A binding the call
  /// carried in from another program is replaced, never trusted.
  #[instrument(skip_all)]
  fn visit_calls(&mut self) {
    let symbols = &self.symbols;
    self.prog.visit_calls_mut(&mut |call| {
      let decl = symbols.get(&call.name).copied();
      let previous = call.bind(decl);
      if previous.is_some() && previous != decl {
        debug!(name = %call.name, ?previous, "dropped stale binding");
      }
      match decl {
        Some(decl) => debug!(name = %call.name, %decl, "resolved"),
        // may be provided by the host, not an error
        None => debug!(name = %call.name, "not resolved"),
      }
    });
  }
}
