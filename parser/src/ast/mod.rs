mod dump;
pub use dump::{Dump, INDENT};

use crate::internal::*;

/// The tree root. Owns every statement of the program, nested ones included.
/// Statements are fixed at construction, so the pre-order ordinals that calls
/// resolve to stay valid for the life of the tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Prog {
  statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
  FunctionDecl(FunctionDecl),
  FunctionCall(FunctionCall),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDecl {
  pub name: String,
  pub body: FunctionBody,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionBody {
  statements: Vec<Statement>,
}

/// A call site. `resolution` never owns the declaration, it names it by its
/// pre-order ordinal, see [`Context::declaration`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionCall {
  pub name: String,
  pub arguments: Vec<String>,
  resolution: Option<idx::Decl>,
}

impl Prog {
  pub const fn new(statements: Vec<Statement>) -> Self {
    Prog { statements }
  }

  pub fn statements(&self) -> &[Statement] {
    &self.statements
  }

  /// All declarations in pre-order, the position of each is its `idx::Decl`.
  pub fn declarations(&self) -> Vec<&FunctionDecl> {
    let mut decls = Vec::new();
    walk(&self.statements, &mut |stmt| match stmt {
      Statement::FunctionDecl(decl) => decls.push(decl),
      Statement::FunctionCall(_) => {}
    });
    decls
  }

  /// All call sites in pre-order.
  pub fn calls(&self) -> Vec<&FunctionCall> {
    let mut calls = Vec::new();
    walk(&self.statements, &mut |stmt| match stmt {
      Statement::FunctionDecl(_) => {}
      Statement::FunctionCall(call) => calls.push(call),
    });
    calls
  }

  pub(crate) fn visit_calls_mut(&mut self, visit: &mut impl FnMut(&mut FunctionCall)) {
    walk_calls_mut(&mut self.statements, visit);
  }
}

impl FunctionDecl {
  pub fn new(name: impl Into<String>, body: FunctionBody) -> Self {
    FunctionDecl { name: name.into(), body }
  }
}

impl FunctionBody {
  pub const fn new(statements: Vec<Statement>) -> Self {
    FunctionBody { statements }
  }

  pub fn statements(&self) -> &[Statement] {
    &self.statements
  }
}

impl FunctionCall {
  pub fn new(name: impl Into<String>, arguments: Vec<String>) -> Self {
    FunctionCall {
      name: name.into(),
      arguments,
      resolution: None,
    }
  }

  pub const fn resolution(&self) -> Option<idx::Decl> {
    self.resolution
  }

  pub const fn is_resolved(&self) -> bool {
    self.resolution.is_some()
  }

  /// Sets the binding and returns the one it replaces.
  pub(crate) fn bind(&mut self, decl: Option<idx::Decl>) -> Option<idx::Decl> {
    std::mem::replace(&mut self.resolution, decl)
  }
}

impl Statement {
  pub fn name(&self) -> &str {
    match self {
      Statement::FunctionDecl(decl) => &decl.name,
      Statement::FunctionCall(call) => &call.name,
    }
  }
}

impl From<FunctionDecl> for Statement {
  fn from(decl: FunctionDecl) -> Self {
    Statement::FunctionDecl(decl)
  }
}

impl From<FunctionCall> for Statement {
  fn from(call: FunctionCall) -> Self {
    Statement::FunctionCall(call)
  }
}

/// Where each declaration sits in its `Prog`, indexed by `idx::Decl`. A
/// location is the list of statement indexes leading from the root down to
/// the declaration, so a lookup costs the nesting depth, not the tree size.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclTable {
  paths: Vec<Vec<usize>>,
}

impl DeclTable {
  pub fn new(prog: &Prog) -> Self {
    let mut table = DeclTable::default();
    table.collect(&prog.statements, &mut Vec::new());
    table
  }

  pub fn len(&self) -> usize {
    self.paths.len()
  }

  pub fn is_empty(&self) -> bool {
    self.paths.is_empty()
  }

  /// Looks `id` up in `prog`, which must be the program the table was built
  /// from.
  pub fn get<'a>(&self, prog: &'a Prog, id: idx::Decl) -> Option<&'a FunctionDecl> {
    let (last, parents) = self.paths.get(id.usize())?.split_last()?;
    let mut statements = prog.statements();
    for &n in parents {
      match statements.get(n)? {
        Statement::FunctionDecl(decl) => statements = decl.body.statements(),
        Statement::FunctionCall(_) => return None,
      }
    }
    match statements.get(*last)? {
      Statement::FunctionDecl(decl) => Some(decl),
      Statement::FunctionCall(_) => None,
    }
  }

  fn collect(&mut self, statements: &[Statement], path: &mut Vec<usize>) {
    for (n, stmt) in statements.iter().enumerate() {
      if let Statement::FunctionDecl(decl) = stmt {
        path.push(n);
        self.paths.push(path.clone());
        self.collect(&decl.body.statements, path);
        path.pop();
      }
    }
  }
}

fn walk<'a>(statements: &'a [Statement], visit: &mut impl FnMut(&'a Statement)) {
  for stmt in statements {
    visit(stmt);
    match stmt {
      Statement::FunctionDecl(decl) => walk(&decl.body.statements, visit),
      Statement::FunctionCall(_) => {}
    }
  }
}

fn walk_calls_mut(statements: &mut [Statement], visit: &mut impl FnMut(&mut FunctionCall)) {
  for stmt in statements {
    match stmt {
      Statement::FunctionDecl(decl) => walk_calls_mut(&mut decl.body.statements, visit),
      Statement::FunctionCall(call) => visit(call),
    }
  }
}
