//! Type-level symbol tables mapping wire codes to human-readable names.
//!
//! A table is a per-type constant, attached to a type's configuration rather
//! than looked up through global state. Lookups go both ways: name to code
//! when a setter takes a symbolic argument, code to display name when
//! formatting.

/// Immutable mapping between integer wire codes and symbolic names.
#[derive(Debug, Clone, Copy)]
pub struct SymbolTable {
    entries: &'static [(u64, &'static str)],
}

impl SymbolTable {
    /// Wraps a static entry list.
    pub const fn new(entries: &'static [(u64, &'static str)]) -> Self {
        Self { entries }
    }

    /// Code for a symbolic name, if known.
    pub fn code(&self, name: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|(_, n)| *n == name)
            .map(|(c, _)| *c)
    }

    /// Name for a wire code, if known.
    pub fn name(&self, code: u64) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, n)| *n)
    }

    /// Display form of a code: the symbolic name when known, otherwise the
    /// decimal string.
    pub fn display(&self, code: u64) -> String {
        match self.name(code) {
            Some(name) => name.to_string(),
            None => code.to_string(),
        }
    }

    /// Length of the longest name, for presentation column widths.
    pub fn longest_name(&self) -> usize {
        self.entries.iter().map(|(_, n)| n.len()).max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLORS: SymbolTable = SymbolTable::new(&[(1, "RED"), (2, "GREEN"), (3, "BLUE")]);

    #[test]
    fn test_code_lookup() {
        assert_eq!(COLORS.code("GREEN"), Some(2));
        assert_eq!(COLORS.code("MAUVE"), None);
    }

    #[test]
    fn test_name_lookup() {
        assert_eq!(COLORS.name(3), Some("BLUE"));
        assert_eq!(COLORS.name(99), None);
    }

    #[test]
    fn test_display_falls_back_to_decimal() {
        assert_eq!(COLORS.display(1), "RED");
        assert_eq!(COLORS.display(42), "42");
    }

    #[test]
    fn test_longest_name() {
        assert_eq!(COLORS.longest_name(), 5);
        assert_eq!(SymbolTable::new(&[]).longest_name(), 0);
    }
}
