/// Strips invisible characters and collapses all whitespace runs to one space.
pub(crate) fn normalize_text(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}', '\u{00a0}'], " ");
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub(crate) fn tokens(normalized: &str) -> Vec<&str> {
    normalized.split(' ').filter(|token| !token.is_empty()).collect()
}

pub(crate) fn is_course_code(token: &str) -> bool {
    token.len() == 7 && token.bytes().all(|byte| byte.is_ascii_digit())
}

pub(crate) fn is_year(token: &str) -> bool {
    token.len() == 4 && token.starts_with("20") && token.bytes().all(|byte| byte.is_ascii_digit())
}

pub(crate) fn is_credit(token: &str) -> bool {
    (1..=2).contains(&token.len()) && token.bytes().all(|byte| byte.is_ascii_digit())
}

/// `2024-2025` style academic-year span.
pub(crate) fn is_year_span(token: &str) -> bool {
    match token.split_once('-') {
        Some((start, end)) => [start, end]
            .iter()
            .all(|part| part.len() == 4 && part.bytes().all(|byte| byte.is_ascii_digit())),
        None => false,
    }
}

/// Leading `-?\d+` of a token, if any.
pub(crate) fn leading_integer(token: &str) -> Option<&str> {
    let digits_from = usize::from(token.starts_with('-'));
    let digit_count = token[digits_from..]
        .bytes()
        .take_while(|byte| byte.is_ascii_digit())
        .count();
    if digit_count == 0 {
        None
    } else {
        Some(&token[..digits_from + digit_count])
    }
}
