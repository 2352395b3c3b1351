//! In-memory symbol table.

use crate::model::format_address;
use crate::utils::error::SymbolError;
use log::{debug, info};
use object::{Object, ObjectSymbol, SymbolKind};
use std::collections::HashMap;
use std::path::Path;

/// A code symbol
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub address: u64,
    pub name: String,
}

/// Address and name lookups over a set of code symbols
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    by_address: HashMap<u64, usize>,
    by_name: HashMap<String, usize>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a symbol. Later symbols win on duplicate addresses or names.
    pub fn add_symbol(&mut self, symbol: Symbol) {
        let idx = self.symbols.len();
        self.by_address.insert(symbol.address, idx);
        self.by_name.insert(symbol.name.clone(), idx);
        self.symbols.push(symbol);
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn by_address(&self, address: u64) -> Option<&Symbol> {
        self.by_address.get(&address).map(|&i| &self.symbols[i])
    }

    pub fn by_name(&self, name: &str) -> Option<&Symbol> {
        self.by_name.get(name).map(|&i| &self.symbols[i])
    }

    /// `0x401126 (main)` when the address is known, plain hex otherwise
    pub fn describe(&self, address: u64) -> String {
        match self.by_address(address) {
            Some(symbol) => format!("{} ({})", format_address(address), symbol.name),
            None => format_address(address),
        }
    }
}

/// Read text symbols straight out of an object file
pub fn load_object_file(path: impl AsRef<Path>) -> Result<SymbolTable, SymbolError> {
    let data = std::fs::read(path.as_ref())?;
    symbols_from_object(&data)
}

pub(crate) fn symbols_from_object(data: &[u8]) -> Result<SymbolTable, SymbolError> {
    let file = object::File::parse(data)?;
    let mut table = SymbolTable::new();

    for symbol in file.symbols() {
        if symbol.kind() != SymbolKind::Text || symbol.address() == 0 {
            continue;
        }
        match symbol.name() {
            Ok(name) if !name.is_empty() => table.add_symbol(Symbol {
                address: symbol.address(),
                name: name.to_string(),
            }),
            Ok(_) => {}
            Err(e) => debug!("Skipping unnamed symbol at {:#x}: {}", symbol.address(), e),
        }
    }

    info!("Loaded {} text symbols from object file", table.len());
    Ok(table)
}
