// Formatting utilities

use once_cell::sync::Lazy;
use regex::Regex;

static FACEBOOK_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*\|\s*Facebook\s*$").unwrap());

/// TLD labels dropped when turning a domain into a brand name
const COMMON_TLDS: [&str; 5] = ["com", "org", "net", "co", "io"];

/// Upper-case the first letter of each whitespace-separated word
/// (rest of the word untouched)
pub fn title_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut at_word_start = true;

    for c in s.chars() {
        if c.is_whitespace() {
            at_word_start = true;
            result.push(c);
        } else if at_word_start {
            result.extend(c.to_uppercase());
            at_word_start = false;
        } else {
            result.push(c);
        }
    }

    result
}

/// Replace separator characters with spaces, then title-case
pub fn humanize_slug(slug: &str, separators: &[char]) -> String {
    let spaced: String = slug
        .chars()
        .map(|c| if separators.contains(&c) { ' ' } else { c })
        .collect();
    title_case(spaced.trim())
}

/// Strip a trailing "| Facebook" from a page title
pub fn strip_facebook_suffix(title: &str) -> String {
    FACEBOOK_SUFFIX.replace(title, "").trim().to_string()
}

/// Brand name from a bare domain (e.g., "my-shop.co" -> "My Shop")
pub fn brand_name_from_domain(domain: &str) -> String {
    let mut labels: Vec<&str> = domain.split('.').filter(|l| !l.is_empty()).collect();

    // Country second-level domains: example.co.uk, shop.com.au
    if labels.len() > 2 && labels[labels.len() - 1].len() == 2 {
        let second = labels[labels.len() - 2].to_ascii_lowercase();
        if second == "co" || second == "com" {
            labels.pop();
        }
    }

    while labels.len() > 1
        && labels
            .last()
            .map(|l| COMMON_TLDS.contains(&l.to_ascii_lowercase().as_str()))
            .unwrap_or(false)
    {
        labels.pop();
    }

    humanize_slug(&labels.join("."), &['-', '_', '.'])
}

/// Quote a CSV field when it contains a delimiter, quote or newline
pub fn csv_escape(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Join fields into a single CSV line (no trailing newline)
pub fn csv_line(fields: &[&str]) -> String {
    fields
        .iter()
        .map(|f| csv_escape(f))
        .collect::<Vec<_>>()
        .join(",")
}
