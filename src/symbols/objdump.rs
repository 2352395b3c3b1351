//! Parser for `objdump -t` output.
//!
//! ```text
//! SYMBOL TABLE:
//! 0000000000401126 g     F .text	0000000000000016              main
//! ```

use super::table::{Symbol, SymbolTable};
use crate::utils::error::SymbolError;
use log::{debug, warn};
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

const SYMBOL_TABLE_START: &str = "SYMBOL TABLE:";

fn symbol_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?P<addr>[0-9a-fA-F]+) (?P<flags>.{7}) (?P<section>\S+)\s+(?P<size>[0-9a-fA-F]+)\s+(?P<name>.+)$")
            .expect("symbol line regex is valid")
    })
}

/// Load an objdump text file
pub fn load_objdump_file(path: impl AsRef<Path>) -> Result<SymbolTable, SymbolError> {
    let text = std::fs::read_to_string(path)?;
    parse_objdump(&text)
}

/// Parse objdump symbol output, keeping only `.text` symbols
///
/// # Errors
/// * `SymbolError::MissingTable` - No `SYMBOL TABLE:` header in the input
pub fn parse_objdump(text: &str) -> Result<SymbolTable, SymbolError> {
    let mut table = SymbolTable::new();
    let mut found_start = false;

    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        if line == SYMBOL_TABLE_START {
            found_start = true;
            continue;
        }
        if !found_start {
            continue;
        }

        let Some(caps) = symbol_line_re().captures(line) else {
            warn!("unrecognized format in line {}: {}", idx + 1, line);
            continue;
        };
        if &caps["section"] != ".text" {
            continue;
        }

        let Ok(address) = u64::from_str_radix(&caps["addr"], 16) else {
            warn!("invalid symbol address in line {}: {}", idx + 1, line);
            continue;
        };
        // `.hidden foo` and versioned names keep their last token only
        let name = caps["name"]
            .split_whitespace()
            .next_back()
            .unwrap_or_default()
            .to_string();
        table.add_symbol(Symbol { address, name });
    }

    if !found_start {
        return Err(SymbolError::MissingTable);
    }

    debug!("Parsed {} .text symbols from objdump output", table.len());
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
/usr/sbin/mysqld:     file format elf64-x86-64

SYMBOL TABLE:
0000000000000000 l    df *ABS*\t0000000000000000              crtstuff.c
0000000000401126 g     F .text\t0000000000000016              main
000000000059a448 l     F .text\t00000000000000a2              .hidden query_cache_store
0000000000603010 g     O .data\t0000000000000004              counter
";

    #[test]
    fn test_only_text_symbols_kept() {
        let table = parse_objdump(SAMPLE).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.by_name("main").unwrap().address, 0x401126);
        assert_eq!(
            table.by_address(0x59a448).unwrap().name,
            "query_cache_store"
        );
        assert!(table.by_name("counter").is_none());
    }

    #[test]
    fn test_missing_header() {
        assert!(matches!(
            parse_objdump("0000000000401126 g     F .text\t0000000000000016 main"),
            Err(SymbolError::MissingTable)
        ));
    }
}
