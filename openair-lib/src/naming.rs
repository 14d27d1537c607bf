//! Identifier normalization for API tag names.
//!
//! OpenAir tag names mix `snake_case` (`project_id`, `the_custom_thing__c`)
//! with run-together lower case (`thingid`, `approvalprocess`). [`normalize`]
//! maps them to PascalCase identifiers with the usual acronyms kept upper case.

/// Separator used by the API inside tag names.
pub const SEPARATOR: char = '_';

/// Suffix rewrites, applied in order against the current working name.
const SUFFIXES: [(&str, &str); 6] = [
    ("Id", "ID"),
    ("id", "ID"),
    ("Url", "URL"),
    ("url", "URL"),
    ("Api", "API"),
    ("api", "API"),
];

/// Prefix rewrites, applied in order after the suffixes.
const PREFIXES: [(&str, &str); 2] = [("Api", "API"), ("Url", "URL")];

/// Maps a raw tag name to its canonical identifier.
///
/// Pure and total: the same input always yields the same output.
///
/// # Example
///
/// ```
/// use openair_lib::naming::normalize;
///
/// assert_eq!(normalize("time_cardid"), "TimeCardID");
/// assert_eq!(normalize("api_thing"), "APIThing");
/// assert_eq!(normalize("theurl"), "TheURL");
/// ```
pub fn normalize(raw: &str) -> String {
    let mut name = if raw.contains(SEPARATOR) {
        join_segments(raw)
    } else {
        raw.to_string()
    };

    for (from, to) in SUFFIXES {
        if let Some(stem) = name.strip_suffix(from) {
            name = format!("{stem}{to}");
        }
    }
    for (from, to) in PREFIXES {
        if let Some(rest) = name.strip_prefix(from) {
            name = format!("{to}{rest}");
        }
    }

    title_case(&name)
}

/// Lower-cased form of [`normalize`].
pub fn normalize_lower(raw: &str) -> String {
    normalize(raw).to_lowercase()
}

fn join_segments(raw: &str) -> String {
    let mut joined = String::with_capacity(raw.len());
    for segment in raw.split(SEPARATOR).filter(|s| !s.is_empty()) {
        match segment.chars().count() {
            1 => joined.push_str(&segment.to_uppercase()),
            2 if segment.to_uppercase() == "ID" => joined.push_str("ID"),
            _ if segment == "approvalprocess" => joined.push_str("ApprovalProcess"),
            _ => joined.push_str(&capitalize(segment)),
        }
    }
    joined
}

fn capitalize(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Upper-cases the first letter of every word.
///
/// A word starts at the beginning of the string or after any character that
/// is not alphanumeric or `_`.
fn title_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut at_word_start = true;
    for c in name.chars() {
        if at_word_start {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = !(c.is_alphanumeric() || c == SEPARATOR);
    }
    out
}
