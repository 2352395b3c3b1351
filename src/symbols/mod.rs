//! Symbol tables mapping function addresses to names.
//!
//! Two sources are supported:
//! - `objdump -t` text output (only `.text` symbols are kept)
//! - ELF or other object files, read directly

pub mod objdump;
pub mod table;

// Re-export main types
pub use objdump::{load_objdump_file, parse_objdump};
pub use table::{load_object_file, Symbol, SymbolTable};

use crate::utils::error::SymbolError;
use std::path::Path;

/// Load a symbol table, sniffing whether the file is an object or objdump text
pub fn load_symbols(path: impl AsRef<Path>) -> Result<SymbolTable, SymbolError> {
    let path = path.as_ref();
    let data = std::fs::read(path)?;
    if object::FileKind::parse(&*data).is_ok() {
        table::symbols_from_object(&data)
    } else {
        parse_objdump(&String::from_utf8_lossy(&data))
    }
}
