//! Title to slug conversion.

/// Derive a URL-safe identifier from a title: lower-case, drop anything that
/// is not a word character or whitespace, join the remaining words with '-'.
pub fn slugify(title: &str) -> String {
    let kept: String = title
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("  Rust & WebAssembly: 2024!  "), "rust-webassembly-2024");
        assert_eq!(slugify("multi   space\ttab"), "multi-space-tab");
        assert_eq!(slugify("snake_case stays"), "snake_case-stays");
        assert_eq!(slugify("Café crème"), "caf-crme");
    }

    #[test]
    fn test_slugify_empty() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("!!! ???"), "");
    }
}
