// Ingredient key normalization and allergen detection
use lazy_static::lazy_static;
use std::collections::{BTreeSet, HashMap, HashSet};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref SYNONYMS: HashMap<&'static str, &'static str> = [
        ("paradajz", "rajcica"),
        ("tomato", "rajcica"),
        ("rice", "riza"),
        ("onion", "luk"),
        ("garlic", "cesnjak"),
        ("krompir", "krumpir"),
        ("orasi", "orah"),
    ]
    .into_iter()
    .collect();

    /// Allergen tag -> ingredient tokens that trigger it
    static ref ALLERGEN_RULES: Vec<(&'static str, HashSet<&'static str>)> = vec![
        ("orasasti_plodovi", [
            "orah", "orasi", "badem", "badam", "ljesnjak", "kikiriki", "pistacija",
            "indijski_orascic", "indijski_orascici", "ljesnjaci",
        ].into_iter().collect()),
        ("mlijeko", [
            "mlijeko", "sir", "vrhnje", "maslac", "jogurt", "kefir", "skuta",
        ].into_iter().collect()),
        ("jaja", ["jaje", "jaja"].into_iter().collect()),
        ("gluten", [
            "tjestenina", "kruh", "brasno", "psenica", "jecam", "raz",
        ].into_iter().collect()),
        ("soja", ["soja", "sojin_umak", "tofu"].into_iter().collect()),
        ("riba", ["riba", "tuna", "losos", "sardina", "incun"].into_iter().collect()),
    ];
}

/// Lowercase, NFKD-decompose and drop combining marks, keep `[a-z0-9_-]` and join words with `_`.
///
/// `"  Zobene  Pahuljice "` becomes `"zobene_pahuljice"`, `"Češnjak"` becomes `"cesnjak"`.
pub fn normalize_key(text: &str) -> String {
    let cleaned: String = text
        .trim()
        .to_lowercase()
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        // đ has no decomposition
        .map(|c| if c == 'đ' { 'd' } else { c })
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() || *c == '_' || *c == '-')
        .collect();

    cleaned.split_whitespace().collect::<Vec<_>>().join("_")
}

/// Maps a synonym ("paradajz", "tomato") to the key the app stores ("rajcica")
pub fn canonicalize_key(key: &str) -> String {
    SYNONYMS.get(key).copied().unwrap_or(key).to_string()
}

/// Allergen tags triggered by the given keys or by any word of the ingredient names.
/// Result is sorted and deduplicated.
pub fn detect_allergens(ingredient_keys: &[String], ingredient_names: &[String]) -> Vec<String> {
    let mut tokens: HashSet<String> = ingredient_keys.iter().cloned().collect();

    for name in ingredient_names {
        let key = normalize_key(name);
        tokens.extend(key.split('_').map(str::to_string));
        tokens.insert(key);
    }

    let found: BTreeSet<&str> = ALLERGEN_RULES
        .iter()
        .filter(|(_, triggers)| tokens.iter().any(|t| triggers.contains(t.as_str())))
        .map(|(allergen, _)| *allergen)
        .collect();

    found.into_iter().map(str::to_string).collect()
}
