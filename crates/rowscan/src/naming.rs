//! Member name to column name conversion.

/// Converts an identifier such as `FooColumn` or `HTTPServer` into its
/// lowercase, underscore-separated column form (`foo_column`, `http_server`).
///
/// A boundary is placed before an uppercase letter that follows a lowercase
/// letter or a digit, and before the last uppercase letter of an uppercase run
/// when a lowercase letter follows it. Strings that are already lowercase pass
/// through unchanged.
pub fn to_snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, &ch) in chars.iter().enumerate() {
        if ch.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|c| c.is_lowercase());
            let after_word = prev.is_lowercase() || prev.is_ascii_digit();
            let closes_acronym = prev.is_uppercase() && next_is_lower;
            if (after_word || closes_acronym) && !out.ends_with('_') {
                out.push('_');
            }
        }
        out.extend(ch.to_lowercase());
    }

    out
}
