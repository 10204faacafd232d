//! URL slugs for categories.

/// Turn a display name into a URL slug.
///
/// Lower-cases the input, collapses every run of characters outside
/// `[a-z0-9]` into a single `-`, and trims leading and trailing dashes.
///
/// ```
/// use fraz_modern_core::slugify;
///
/// assert_eq!(slugify("Home & Garden"), "home-garden");
/// ```
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_simple() {
        assert_eq!(slugify("Electronics"), "electronics");
    }

    #[test]
    fn test_slugify_collapses_separators() {
        assert_eq!(slugify("Home   &  Garden"), "home-garden");
        assert_eq!(slugify("Men's T-Shirts"), "men-s-t-shirts");
    }

    #[test]
    fn test_slugify_trims_dashes() {
        assert_eq!(slugify("  -- Sale! --"), "sale");
    }

    #[test]
    fn test_slugify_keeps_digits() {
        assert_eq!(slugify("4K TVs 2025"), "4k-tvs-2025");
    }

    #[test]
    fn test_slugify_non_ascii_dropped() {
        assert_eq!(slugify("Café Déco"), "caf-d-co");
        assert_eq!(slugify("!!!"), "");
    }
}
