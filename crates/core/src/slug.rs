/// Fallback used when a heading's text has no word characters at all.
pub const EMPTY_SLUG: &str = "section";

/// Turns heading text into an id candidate.
///
/// Lowercases, drops every character that is not alphanumeric, `_`, `-` or
/// whitespace, and joins the remaining words with single hyphens. Letters
/// outside ASCII count as word characters so non-Latin headings keep
/// readable ids.
pub fn slugify(text: &str) -> String {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-' || c.is_whitespace())
        .collect();

    let mut slug = String::with_capacity(cleaned.len());
    for word in cleaned.split_whitespace() {
        if !slug.is_empty() {
            slug.push('-');
        }
        slug.push_str(word);
    }

    if slug.is_empty() {
        EMPTY_SLUG.to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_slugs() {
        assert_eq!(slugify("Getting Started"), "getting-started");
        assert_eq!(slugify("  Install   the  CLI "), "install-the-cli");
        assert_eq!(slugify("C++ & Rust: tips!"), "c-rust-tips");
        assert_eq!(slugify("don't_panic"), "dont_panic");
        assert_eq!(slugify("pre-release notes"), "pre-release-notes");
    }

    #[test]
    fn test_unicode_words_survive() {
        assert_eq!(slugify("Über Größe"), "über-größe");
        assert_eq!(slugify("安装"), "安装");
    }

    #[test]
    fn test_symbol_only_text_falls_back() {
        assert_eq!(slugify("???"), EMPTY_SLUG);
        assert_eq!(slugify(""), EMPTY_SLUG);
    }
}
