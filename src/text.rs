//! Label text utilities.
//!
//! Diagram editors export labels as HTML fragments (`&lt;div&gt;Analizar
//! muestra&lt;/div&gt;`), so every label goes through a cleaning pass before
//! it reaches the model. Normalization (lower-case, diacritic-free, single
//! spaces) gives the stable form used for mapping-table lookups and
//! duplicate-element merging; identifier derivation produces the UVL-legal
//! names used in the output tree.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Decode HTML entities, drop markup tags, and collapse whitespace.
///
/// The result is the presentation form of a label: original casing and
/// accents are preserved.
pub fn clean_label(raw: &str) -> String {
    let decoded = htmlize::unescape(raw);
    let mut without_tags = String::with_capacity(decoded.len());
    let mut in_tag = false;
    for c in decoded.chars() {
        match c {
            '<' => {
                in_tag = true;
                without_tags.push(' ');
            }
            '>' => in_tag = false,
            _ if !in_tag => without_tags.push(c),
            _ => {}
        }
    }
    collapse_whitespace(&without_tags)
}

/// Lower-cased, diacritic-free, single-spaced form of a label.
///
/// This is the lookup key for mapping tables and the merge key for
/// duplicate elements. Idempotent: normalizing an already-normalized
/// label returns it unchanged.
pub fn normalize_label(text: &str) -> String {
    let lowered = text.trim().to_lowercase();
    collapse_whitespace(&strip_diacritics(&lowered))
}

/// Remove combining marks after NFD decomposition ("Síntesis" → "Sintesis").
pub fn strip_diacritics(text: &str) -> String {
    text.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Collapse internal whitespace runs to single spaces and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Derive a UVL-legal identifier from a label, preserving word casing.
///
/// Diacritics are stripped and words are joined with underscores:
/// "Análizar muestra" → "Analizar_muestra". Returns an empty string when
/// the label has no identifier characters at all; callers fall back to a
/// kind-derived name in that case.
pub fn to_identifier(text: &str) -> String {
    let folded = strip_diacritics(text);
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    for c in folded.chars() {
        if c == '_' || unicode_ident::is_xid_continue(c) {
            current.push(c);
        } else if !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        words.push(current);
    }
    let ident = words.join("_");
    match ident.chars().next() {
        None => String::new(),
        Some(c) if c == '_' || unicode_ident::is_xid_start(c) => ident,
        Some(_) => format!("_{ident}"),
    }
}

/// Derive a PascalCase identifier ("Protein Folding" → "ProteinFolding").
///
/// Used for synthetic root features named after the model's top-level
/// actor. Returns an empty string for labels with no usable words.
pub fn to_pascal_identifier(text: &str) -> String {
    let folded = strip_diacritics(text);
    let mut out = String::new();
    for word in folded.replace('_', " ").split_whitespace() {
        if !word.chars().all(char::is_alphanumeric) {
            continue;
        }
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.extend(chars.flat_map(char::to_lowercase));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_label_strips_tags_and_entities() {
        assert_eq!(clean_label("<div>Analizar muestra</div>"), "Analizar muestra");
        assert_eq!(clean_label("Extraer&nbsp;datos"), "Extraer datos");
        assert_eq!(clean_label("a &amp; b"), "a & b");
        assert_eq!(clean_label("linea<br>partida"), "linea partida");
    }

    #[test]
    fn test_clean_label_empty_and_whitespace() {
        assert_eq!(clean_label(""), "");
        assert_eq!(clean_label("   "), "");
        assert_eq!(clean_label("<div><br></div>"), "");
    }

    #[test]
    fn test_normalize_label() {
        assert_eq!(normalize_label("Síntesis"), "sintesis");
        assert_eq!(normalize_label("  Método   A "), "metodo a");
        assert_eq!(normalize_label("BASE DE DATOS"), "base de datos");
    }

    #[test]
    fn test_normalize_label_idempotent() {
        let once = normalize_label("  Análisis  Químico ");
        assert_eq!(normalize_label(&once), once);
    }

    #[test]
    fn test_strip_diacritics() {
        assert_eq!(strip_diacritics("Método"), "Metodo");
        assert_eq!(strip_diacritics("àéîõü"), "aeiou");
        assert_eq!(strip_diacritics("plain"), "plain");
    }

    #[test]
    fn test_to_identifier() {
        assert_eq!(to_identifier("Analizar muestra"), "Analizar_muestra");
        assert_eq!(to_identifier("Método A"), "Metodo_A");
        assert_eq!(to_identifier("Base_de_datos"), "Base_de_datos");
        assert_eq!(to_identifier("a + b"), "a_b");
    }

    #[test]
    fn test_to_identifier_degenerate() {
        assert_eq!(to_identifier(""), "");
        assert_eq!(to_identifier("++"), "");
        assert_eq!(to_identifier("2da fase"), "_2da_fase");
    }

    #[test]
    fn test_to_pascal_identifier() {
        assert_eq!(to_pascal_identifier("Protein Folding"), "ProteinFolding");
        assert_eq!(to_pascal_identifier("análisis químico"), "AnalisisQuimico");
        assert_eq!(to_pascal_identifier("lab_central"), "LabCentral");
        assert_eq!(to_pascal_identifier(""), "");
    }
}
