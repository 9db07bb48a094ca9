//! Composite identifiers built from several source fields.
//!
//! Components are joined with a delimiter. A delimiter or backslash inside a
//! component is escaped with a backslash, so two different component lists
//! never produce the same key.

/// Delimiter of [`composite_key`].
pub const DELIMITER: char = '-';

/// Join `parts` with [`DELIMITER`].
pub fn composite_key<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    composite_key_with(DELIMITER, parts)
}

/// Join `parts` with a custom delimiter.
pub fn composite_key_with<I, S>(delimiter: char, parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut key = String::new();
    for (position, part) in parts.into_iter().enumerate() {
        if position > 0 {
            key.push(delimiter);
        }
        for c in part.as_ref().chars() {
            if c == delimiter || c == '\\' {
                key.push('\\');
            }
            key.push(c);
        }
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_parts_are_joined() {
        insta::assert_snapshot!(composite_key(["S1", "3", "Titel"]), @"S1-3-Titel");
    }

    #[test]
    fn delimiters_inside_parts_are_escaped() {
        insta::assert_snapshot!(composite_key(["a-b", "c"]), @r"a\-b-c");
        assert_ne!(composite_key(["a-b", "c"]), composite_key(["a", "b-c"]));
        assert_ne!(composite_key(["a\\", "b"]), composite_key(["a", "\\b"]));
    }

    #[test]
    fn custom_delimiter_leaves_dashes_alone() {
        assert_eq!(composite_key_with('.', ["S1", "PLATFORM-X"]), "S1.PLATFORM-X");
    }
}
