use deunicode::deunicode;
use once_cell::sync::Lazy;
use regex::Regex;

static NON_ALNUM_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("static regex is valid"));

/// Reduces a column label to lowercase ASCII words joined by underscores.
///
/// Non-ASCII characters are transliterated rather than decomposed: diacritics
/// are dropped, ligatures and letters without an accented base are spelled out
/// (`Cœur` gives `coeur`, `Maß` gives `mass`). Every run of characters other than `a-z`/`0-9` becomes a
/// single `_`, and leading/trailing underscores are trimmed. The function is total
/// and idempotent; the result may be empty.
///
/// # Examples
///
/// ```
/// use eco2mix::canonicalize;
///
/// assert_eq!(canonicalize("Nucléaire"), "nucleaire");
/// assert_eq!(canonicalize("Déstockage batterie"), "destockage_batterie");
/// assert_eq!(canonicalize(" Heures (UTC) "), "heures_utc");
/// ```
pub fn canonicalize(label: &str) -> String {
    let ascii = deunicode(label).to_lowercase();
    NON_ALNUM_RUN
        .replace_all(&ascii, "_")
        .trim_matches('_')
        .to_string()
}
