use std::fmt;

use super::*;

/// One level of nesting in the rendered tree.
pub const INDENT: &str = "\t";

/// Renders a node and its children, one node per line. Writes nothing
/// but to `out`, so dumping an unchanged tree is deterministic.
pub trait Dump {
  fn dump(&self, prefix: &str, out: &mut dyn fmt::Write) -> fmt::Result;
}

impl Dump for Prog {
  fn dump(&self, prefix: &str, out: &mut dyn fmt::Write) -> fmt::Result {
    writeln!(out, "{prefix}Prog")?;
    dump_all(&self.statements, &format!("{prefix}{INDENT}"), out)
  }
}

impl Dump for Statement {
  fn dump(&self, prefix: &str, out: &mut dyn fmt::Write) -> fmt::Result {
    match self {
      Statement::FunctionDecl(decl) => decl.dump(prefix, out),
      Statement::FunctionCall(call) => call.dump(prefix, out),
    }
  }
}

impl Dump for FunctionDecl {
  fn dump(&self, prefix: &str, out: &mut dyn fmt::Write) -> fmt::Result {
    writeln!(out, "{prefix}FunctionDecl {}", self.name)?;
    self.body.dump(&format!("{prefix}{INDENT}"), out)
  }
}

impl Dump for FunctionBody {
  fn dump(&self, prefix: &str, out: &mut dyn fmt::Write) -> fmt::Result {
    writeln!(out, "{prefix}FunctionBody")?;
    dump_all(&self.statements, &format!("{prefix}{INDENT}"), out)
  }
}

impl Dump for FunctionCall {
  fn dump(&self, prefix: &str, out: &mut dyn fmt::Write) -> fmt::Result {
    let resolved = if self.is_resolved() { "resolved" } else { "not resolved" };
    writeln!(out, "{prefix}FunctionCall {}, {resolved}", self.name)?;
    for arg in &self.arguments {
      writeln!(out, "{prefix}{INDENT}Parameter: {arg}")?;
    }
    Ok(())
  }
}

impl fmt::Display for Prog {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.dump("", f)
  }
}

fn dump_all(statements: &[Statement], prefix: &str, out: &mut dyn fmt::Write) -> fmt::Result {
  for stmt in statements {
    stmt.dump(prefix, out)?;
  }
  Ok(())
}
