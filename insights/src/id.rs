use nanoid::nanoid;

/// Alphabet for generated document names (no ambiguous glyphs).
const DOCUMENT_NAME_ALPHABET: &[char] = &[
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'J', 'K', 'L', 'M', 'N', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y',
    'Z', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'j', 'm', 'n', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];
const DOCUMENT_NAME_LENGTH: usize = 20;

/// Generates a name for a document created without one.
pub fn generate_document_name() -> String {
    nanoid!(DOCUMENT_NAME_LENGTH, DOCUMENT_NAME_ALPHABET)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_has_expected_length_and_charset() {
        let name = generate_document_name();
        assert_eq!(name.len(), DOCUMENT_NAME_LENGTH);
        assert!(name.chars().all(|c| DOCUMENT_NAME_ALPHABET.contains(&c)));
    }

    #[test]
    fn names_do_not_repeat() {
        assert_ne!(generate_document_name(), generate_document_name());
    }
}
