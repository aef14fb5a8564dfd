//! Comparaison de chaînes selon l'usage français
//!
//! Ordre à trois niveaux, comme une collation ICU `fr`:
//! 1. lettres de base (accents et casse ignorés, ligatures développées)
//! 2. accents: la forme sans accent précède la forme accentuée
//! 3. casse: minuscule avant majuscule
//!
//! L'ordre des points de code départage en dernier, ce qui rend la
//! comparaison totale.

use std::cmp::Ordering;

/// Compare deux chaînes selon l'ordre alphabétique français
pub fn compare_fr(a: &str, b: &str) -> Ordering {
    primary_key(a)
        .cmp(&primary_key(b))
        .then_with(|| accent_key(a).cmp(&accent_key(b)))
        .then_with(|| case_key(a).cmp(&case_key(b)))
        .then_with(|| a.cmp(b))
}

/// Clé primaire: lettres de base en minuscules
fn primary_key(s: &str) -> String {
    let mut key = String::with_capacity(s.len());
    for c in s.chars() {
        for lower in c.to_lowercase() {
            match fold_char(lower) {
                Folded::One(base) => key.push(base),
                Folded::Two(first, second) => {
                    key.push(first);
                    key.push(second);
                }
            }
        }
    }
    key
}

fn accent_key(s: &str) -> Vec<bool> {
    s.chars()
        .flat_map(char::to_lowercase)
        .map(|c| !matches!(fold_char(c), Folded::One(base) if base == c))
        .collect()
}

fn case_key(s: &str) -> Vec<bool> {
    s.chars().map(char::is_uppercase).collect()
}

enum Folded {
    One(char),
    Two(char, char),
}

/// Retire le diacritique d'une lettre minuscule
fn fold_char(c: char) -> Folded {
    let base = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'ç' => 'c',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'ñ' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' => 'o',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'ý' | 'ÿ' => 'y',
        'æ' => return Folded::Two('a', 'e'),
        'œ' => return Folded::Two('o', 'e'),
        other => other,
    };
    Folded::One(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accents_ignored_at_primary_level() {
        assert_eq!(compare_fr("Élu", "Maire"), Ordering::Less);
        assert_eq!(compare_fr("Délégué", "Conseiller"), Ordering::Greater);
        assert_eq!(compare_fr("Vice-président", "Élu"), Ordering::Greater);
    }

    #[test]
    fn test_unaccented_before_accented() {
        assert_eq!(compare_fr("elu", "élu"), Ordering::Less);
        assert_eq!(compare_fr("élu", "elu"), Ordering::Greater);
    }

    #[test]
    fn test_lowercase_before_uppercase() {
        assert_eq!(compare_fr("maire", "Maire"), Ordering::Less);
        assert_eq!(compare_fr("Maire", "maire"), Ordering::Greater);
    }

    #[test]
    fn test_ligatures() {
        assert_eq!(compare_fr("Œuvre", "Oeuvrf"), Ordering::Less);
        assert_eq!(compare_fr("cœur", "coeur"), Ordering::Greater);
    }

    #[test]
    fn test_equal() {
        assert_eq!(compare_fr("Maire", "Maire"), Ordering::Equal);
        assert_eq!(compare_fr("", ""), Ordering::Equal);
        assert_eq!(compare_fr("", "a"), Ordering::Less);
    }

    #[test]
    fn test_sort_function_labels() {
        let mut labels = vec![
            "Vice-président",
            "Conseiller communautaire",
            "Président",
            "Délégué",
            "conseiller communautaire",
        ];
        labels.sort_by(|a, b| compare_fr(a, b));
        assert_eq!(
            labels,
            vec![
                "conseiller communautaire",
                "Conseiller communautaire",
                "Délégué",
                "Président",
                "Vice-président",
            ]
        );
    }
}
