use scraper::Html;

/// Removes markup and collapses whitespace. Idempotent: cleaning already
/// clean text returns it unchanged.
pub fn strip_markup(input: &str) -> String {
    if !input.contains('<') {
        return collapse_whitespace(input);
    }
    let fragment = Html::parse_fragment(input);
    let text: String = fragment.root_element().text().collect::<Vec<_>>().join(" ");
    collapse_whitespace(&text)
}

/// Trims and squeezes internal whitespace runs to single spaces.
pub fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Pulls a non-negative decimal out of noisy price text ("$32.00", "As low
/// as 29,99 €"). Returns `None` when no parseable number remains.
pub fn parse_money(input: &str) -> Option<f64> {
    let digits: String = input
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if digits.is_empty() {
        return None;
    }
    let value: f64 = digits.parse().ok()?;
    value.is_finite().then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tags_and_collapses_whitespace() {
        assert_eq!(strip_markup("<p>Comfy  <b>tee</b>.</p>"), "Comfy tee.");
        assert_eq!(strip_markup("  plain   text "), "plain text");
    }

    #[test]
    fn strip_markup_is_idempotent() {
        let once = strip_markup("<div> a <span>b</span>\n c </div>");
        assert_eq!(strip_markup(&once), once);
    }

    #[test]
    fn money_survives_currency_noise() {
        assert_eq!(parse_money("$32.00"), Some(32.0));
        assert_eq!(parse_money("As low as 29.99"), Some(29.99));
        assert_eq!(parse_money("free"), None);
        assert_eq!(parse_money(""), None);
        // Two decimal points leave nothing parseable.
        assert_eq!(parse_money("1.2.3"), None);
    }
}
