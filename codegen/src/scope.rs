use std::collections::HashMap;

use rmc_parser::ast::Width;

use crate::CodegenError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    /// The program entry label, a name but not a storage location.
    Entry,
    Reserved { width: Width },
    Const { width: Width, value: u64 },
}

impl Symbol {
    pub fn width(&self) -> Option<Width> {
        match self {
            Symbol::Entry => None,
            Symbol::Reserved { width } | Symbol::Const { width, .. } => Some(*width),
        }
    }
}

/// Names declared so far in one compilation. A name is declared at most once,
/// and only names declared above the current statement are visible.
#[derive(Debug)]
pub struct Scope {
    symbols: HashMap<String, Symbol>,
}

impl Scope {
    pub fn new(entry: &str) -> Self {
        let mut symbols = HashMap::new();
        symbols.insert(entry.to_owned(), Symbol::Entry);
        Self { symbols }
    }

    fn declare(&mut self, name: &str, symbol: Symbol) -> Result<(), CodegenError> {
        if self.symbols.contains_key(name) {
            return Err(CodegenError::Redeclared(name.to_owned()));
        }
        self.symbols.insert(name.to_owned(), symbol);
        Ok(())
    }

    pub fn declare_reserved(&mut self, name: &str, width: Width) -> Result<(), CodegenError> {
        self.declare(name, Symbol::Reserved { width })
    }

    pub fn declare_const(&mut self, name: &str, width: Width, value: u64) -> Result<(), CodegenError> {
        self.declare(name, Symbol::Const { width, value })
    }

    pub fn resolve(&self, name: &str) -> Result<Symbol, CodegenError> {
        self.symbols
            .get(name)
            .copied()
            .ok_or_else(|| CodegenError::Undeclared(name.to_owned()))
    }

    /// Width of a reserved or constant location.
    pub fn storage_width(&self, name: &str) -> Result<Width, CodegenError> {
        self.resolve(name)?
            .width()
            .ok_or_else(|| CodegenError::NotStorage(name.to_owned()))
    }

    pub(crate) fn len(&self) -> usize {
        self.symbols.len()
    }
}
