//! Enumerated tables: small human-authored value ↔ name mappings.

/// Ordered mapping of integer values to names. Lookups are linear scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumTable {
    /// Used in error messages.
    pub name: &'static str,
    pub entries: &'static [(i64, &'static str)],
}

impl EnumTable {
    pub const fn new(name: &'static str, entries: &'static [(i64, &'static str)]) -> Self {
        Self { name, entries }
    }

    pub fn value_of(&self, name: &str) -> Option<i64> {
        self.entries
            .iter()
            .find(|(_, n)| *n == name)
            .map(|(v, _)| *v)
    }

    pub fn name_of(&self, value: i64) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(v, _)| *v == value)
            .map(|(_, n)| *n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static COLORS: EnumTable = EnumTable::new("colors", &[(-1, "off"), (0, "red"), (2, "blue")]);

    #[test]
    fn test_lookup_both_ways() {
        assert_eq!(COLORS.value_of("blue"), Some(2));
        assert_eq!(COLORS.value_of("off"), Some(-1));
        assert_eq!(COLORS.name_of(0), Some("red"));
    }

    #[test]
    fn test_unknown_entries() {
        assert_eq!(COLORS.value_of("green"), None);
        assert_eq!(COLORS.value_of("Blue"), None);
        assert_eq!(COLORS.name_of(1), None);
    }
}
