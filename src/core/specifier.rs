//! Import specifier parsing.
//!
//! A specifier is `<dotted-path>` or `<dotted-path>:<sym1>,<sym2>,...`.
//! The first form imports a whole namespace; the second extracts the named
//! symbols in listed order. Parsing is a plain tokenizer returning a
//! structured result; nothing here touches the tree.

use crate::core::error::RegistryError;

/// Parsed form of an import specifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpec {
    /// Dotted namespace path, whitespace-trimmed.
    pub path: String,
    /// Listed symbols in declaration order, or `None` for a whole-namespace
    /// import.
    pub symbols: Option<Vec<String>>,
}

/// Tokenize an import specifier.
///
/// Splits on the first colon. The path part must be non-empty; when a
/// colon is present, the symbol list must contain at least one symbol and
/// no empty entries. Symbol names are whitespace-trimmed, not otherwise
/// validated: whether a symbol exists is the resolver's concern.
pub fn parse_specifier(input: &str) -> Result<ImportSpec, RegistryError> {
    let (path_part, symbols_part) = match input.split_once(':') {
        Some((p, s)) => (p, Some(s)),
        None => (input, None),
    };

    let path = path_part.trim();
    if path.is_empty() {
        return Err(RegistryError::Syntax(format!(
            "bad import specifier '{input}': expected 'a.b.c' or 'a.b.c: sym1, sym2'"
        )));
    }

    let symbols = match symbols_part {
        None => None,
        Some(list) => {
            let names: Vec<String> = list.split(',').map(|s| s.trim().to_string()).collect();
            if names.iter().any(String::is_empty) {
                return Err(RegistryError::Syntax(format!(
                    "bad import specifier '{input}': empty symbol name in list"
                )));
            }
            Some(names)
        }
    };

    Ok(ImportSpec {
        path: path.to_string(),
        symbols,
    })
}
