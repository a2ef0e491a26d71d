const MINUS_VARIANTS: &[char] = &['\u{2212}', '\u{2012}', '\u{2013}', '\u{FE63}', '\u{FF0D}'];

/// Whitespace is dropped everywhere (OCR inserts it freely inside `$...$`
/// spans), typographic minus signs become `-`, and a single pair of wrapping
/// inline-math delimiters (`$..$`, `$$..$$`, `\(..\)`) is removed.
pub(crate) fn normalize_answer(text: &str) -> String {
    let compact: String = text
        .chars()
        .filter(|ch| !ch.is_whitespace())
        .map(|ch| if MINUS_VARIANTS.contains(&ch) { '-' } else { ch })
        .collect();

    strip_math_delimiters(&compact).to_string()
}

pub(crate) fn answers_match_exactly(student: &str, reference: &str) -> bool {
    let student = normalize_answer(student);
    !student.is_empty() && student == normalize_answer(reference)
}

fn strip_math_delimiters(text: &str) -> &str {
    for (open, close) in [("$$", "$$"), ("\\(", "\\)"), ("$", "$")] {
        if let Some(inner) = text.strip_prefix(open).and_then(|rest| rest.strip_suffix(close)) {
            if !inner.is_empty() {
                return inner;
            }
        }
    }
    text
}
