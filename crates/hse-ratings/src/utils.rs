const NBSP: char = '\u{a0}';

/// Replace non-breaking spaces with ordinary ones and trim surrounding
/// whitespace.
pub fn sanitize(s: &str) -> String {
    s.replace(NBSP, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_nbsp_and_whitespace() {
        assert_eq!(sanitize(" \u{a0} text \u{a0} "), "text");
        assert_eq!(sanitize("Факультет\u{a0}права"), "Факультет права");
        assert_eq!(sanitize("\n\t"), "");
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        for s in [
            "",
            "plain",
            "  padded  ",
            "\u{a0}\u{a0}",
            " \u{a0} Рейтинг\u{a0}1 курса \u{a0}\n",
            "\u{a0} a \u{a0} b \u{a0}",
        ] {
            let once = sanitize(s);
            assert_eq!(sanitize(&once), once, "not idempotent for {s:?}");
        }
    }
}
