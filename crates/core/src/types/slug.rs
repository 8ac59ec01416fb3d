//! URL-safe slugs.

/// Build a URL-safe slug from a display name.
///
/// Lowercases, folds common Latin accents, replaces every run of other
/// characters with a single `-`, and trims leading/trailing dashes.
///
/// ```
/// use vitrina_core::slugify;
///
/// assert_eq!(slugify("Café Molido 500g"), "cafe-molido-500g");
/// assert_eq!(slugify("  --Audífonos  Pro!! "), "audifonos-pro");
/// ```
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.chars().flat_map(char::to_lowercase) {
        let c = fold_accent(c);
        if c.is_ascii_alphanumeric() {
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

/// Whether `s` is a non-empty slug of lowercase ASCII alphanumerics and
/// single inner dashes.
#[must_use]
pub fn is_url_safe_slug(s: &str) -> bool {
    !s.is_empty()
        && !s.starts_with('-')
        && !s.ends_with('-')
        && !s.contains("--")
        && s.chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

const fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'ä' | 'â' | 'ã' => 'a',
        'é' | 'è' | 'ë' | 'ê' => 'e',
        'í' | 'ì' | 'ï' | 'î' => 'i',
        'ó' | 'ò' | 'ö' | 'ô' | 'õ' => 'o',
        'ú' | 'ù' | 'ü' | 'û' => 'u',
        'ñ' => 'n',
        'ç' => 'c',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Smart TV 55\""), "smart-tv-55");
        assert_eq!(slugify("Niño & Niña"), "nino-nina");
    }

    #[test]
    fn test_slugify_empty() {
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_slugify_output_is_url_safe() {
        for name in ["Licuadora 3 Velocidades", "  X  ", "ÁÉÍÓÚ 12"] {
            assert!(is_url_safe_slug(&slugify(name)), "{name}");
        }
    }

    #[test]
    fn test_is_url_safe_slug_rejects() {
        assert!(!is_url_safe_slug(""));
        assert!(!is_url_safe_slug("Upper"));
        assert!(!is_url_safe_slug("a--b"));
        assert!(!is_url_safe_slug("-a"));
        assert!(!is_url_safe_slug("a b"));
    }
}
