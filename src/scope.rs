use ahash::AHashMap;

use crate::types::TypeExported;

// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~ IDENTIFIERS ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

/// A named, typed binding. Each identifier is owned by exactly one scope.
#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
  pub name: String,
  pub ty: TypeExported,
}

impl Identifier {
  pub fn new(name: &str, ty: TypeExported) -> Self {
    Self { name: name.to_owned(), ty }
  }
}

// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~ SCOPES ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

/// A lexical name table: a local map plus zero or more parent scopes.
/// Multiple parents occur when sibling control-flow branches are merged.
///
/// Shadowing across nested scopes is allowed; re-declaring a name within one
/// scope is not.
#[derive(Debug, Default)]
pub struct Scope<'a> {
  local: AHashMap<String, Identifier>,
  parents: Vec<&'a Scope<'a>>,
}

impl<'a> Scope<'a> {
  pub fn new() -> Self {
    Self::default()
  }

  /// A fresh scope chained beneath a single parent.
  pub fn child(parent: &'a Scope<'a>) -> Self {
    Self { local: AHashMap::new(), parents: vec![parent] }
  }

  /// A fresh scope chained beneath several parents, in lookup order.
  pub fn merged(parents: Vec<&'a Scope<'a>>) -> Self {
    Self { local: AHashMap::new(), parents }
  }

  /// Declare `name` in this scope. Fails (returns `None`) if the name
  /// already exists in this scope's own map; a shadowing binding in a parent
  /// does not block the declaration.
  pub fn add(&mut self, name: &str, ty: TypeExported) -> Option<Identifier> {
    if self.local.contains_key(name) {
      return None;
    }
    let ident = Identifier::new(name, ty);
    self.local.insert(name.to_owned(), ident.clone());
    Some(ident)
  }

  /// Unconditionally (re-)bind a pre-built identifier, used for function
  /// parameters whose identifiers are constructed before scope entry.
  pub fn add_identifier(&mut self, ident: Identifier) {
    self.local.insert(ident.name.clone(), ident);
  }

  /// Look `name` up in the local map first, then in each parent in
  /// declaration order; the first hit wins.
  pub fn get(&self, name: &str) -> Option<&Identifier> {
    if let Some(ident) = self.local.get(name) {
      return Some(ident);
    }
    self.parents.iter().find_map(|parent| parent.get(name))
  }

  /// Structural equality of the local maps only, ignoring parents. Used to
  /// verify that two control-flow branches agree on declared-variable types
  /// before their scopes are merged.
  pub fn check(&self, other: &Scope<'_>) -> bool {
    self.local == other.local
  }
}

// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~ TESTS ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
