//! Description normalization used before keyword matching.

/// Strip everything except ASCII letters, ASCII digits and whitespace, then lower-case.
///
/// `normalize(normalize(x)) == normalize(x)` for every input.
pub fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_punctuation_and_lowercases() {
        assert_eq!(normalize("AT&T *Bill-Pay #42"), "att billpay 42");
        assert_eq!(normalize("McDonald's"), "mcdonalds");
    }

    #[test]
    fn test_keeps_whitespace() {
        assert_eq!(normalize("Uber  Eats\tNYC"), "uber  eats\tnyc");
    }

    #[test]
    fn test_empty_and_clean_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("already clean 123"), "already clean 123");
    }

    #[test]
    fn test_drops_non_ascii_letters() {
        assert_eq!(normalize("Café Ñandú"), "caf and");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "",
            "STARBUCKS STORE #1234",
            "Zelle® payment to J. Doe",
            "AMAZON PRIME*2K4 AMZN.COM/BILL WA",
            "   -12.50   ",
            "ÅÄÖ über",
        ];
        for s in samples {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "not idempotent for {s:?}");
        }
    }
}
