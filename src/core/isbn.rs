use regex::Regex;
use std::sync::OnceLock;

pub const ISBN_COLUMN: &str = "isbn";

fn product_path_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"/p/(\d{13})").expect("static regex is valid"))
}

/// Extracts the 13-digit identifier that follows a `/p/` segment.
///
/// Returns an empty string for missing links and links without the pattern.
pub fn extract_isbn_from_link(link: Option<&str>) -> String {
    let Some(link) = link else {
        return String::new();
    };

    product_path_regex()
        .captures(link)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_thirteen_digits_after_product_segment() {
        assert_eq!(
            extract_isbn_from_link(Some("https://site/p/9788804660415/title")),
            "9788804660415"
        );
        assert_eq!(
            extract_isbn_from_link(Some(
                "https://www.mondadoristore.it/il-nome-della-rosa/p/9788845292613?ref=home#top"
            )),
            "9788845292613"
        );
    }

    #[test]
    fn test_no_match_yields_empty() {
        assert_eq!(extract_isbn_from_link(Some("https://site/no-match-here")), "");
        assert_eq!(extract_isbn_from_link(Some("")), "");
        assert_eq!(extract_isbn_from_link(None), "");
    }

    #[test]
    fn test_short_digit_runs_do_not_match() {
        assert_eq!(extract_isbn_from_link(Some("https://site/p/978880466041/x")), "");
        assert_eq!(extract_isbn_from_link(Some("https://site/p/abc9788804660415")), "");
        assert_eq!(extract_isbn_from_link(Some("https://site/9788804660415")), "");
    }

    #[test]
    fn test_longer_digit_run_keeps_first_thirteen() {
        assert_eq!(
            extract_isbn_from_link(Some("https://site/p/97888046604159999")),
            "9788804660415"
        );
    }

    #[test]
    fn test_first_occurrence_wins() {
        assert_eq!(
            extract_isbn_from_link(Some("https://site/p/9788804660415/p/9788817050289")),
            "9788804660415"
        );
    }
}
