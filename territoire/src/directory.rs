//! Annuaire des élus, une collection par échelle
//!
//! Les trois collections sont chargées indépendamment et remplacées en bloc
//! lors d'un rechargement; elles ne sont jamais modifiées sur place.

use std::cmp::Ordering;

use tracing::debug;

use crate::collate::compare_fr;
use crate::official::Official;
use crate::scale::Scale;

/// Les trois listes d'élus
#[derive(Debug, Clone, Default)]
pub struct OfficialDirectory {
    departements: Vec<Official>,
    epci: Vec<Official>,
    communes: Vec<Official>,
}

impl OfficialDirectory {
    /// Crée un annuaire à partir des trois listes
    pub fn new(departements: Vec<Official>, epci: Vec<Official>, communes: Vec<Official>) -> Self {
        Self {
            departements,
            epci,
            communes,
        }
    }

    /// Collection complète d'une échelle, dans l'ordre de la source
    pub fn collection(&self, scale: Scale) -> &[Official] {
        match scale {
            Scale::Department => &self.departements,
            Scale::IntercommunalGroup => &self.epci,
            Scale::Commune => &self.communes,
        }
    }

    /// Remplace la collection d'une échelle (rechargement)
    pub fn replace(&mut self, scale: Scale, officials: Vec<Official>) {
        debug!(scale = %scale, count = officials.len(), "Replacing official collection");
        match scale {
            Scale::Department => self.departements = officials,
            Scale::IntercommunalGroup => self.epci = officials,
            Scale::Commune => self.communes = officials,
        }
    }

    /// Élus rattachés à l'entité de clé `key`.
    ///
    /// - EPCI: `Siren` == `key`
    /// - Commune: `Code commune` == `key`
    /// - Département: toute la collection, sans filtre
    ///
    /// Les clés sont comparées comme chaînes, sans changement de casse.
    /// Aucune correspondance donne une liste vide.
    pub fn find_officials(&self, scale: Scale, key: &str) -> Vec<Official> {
        let collection = self.collection(scale);

        let found: Vec<Official> = match scale {
            Scale::Department => collection.to_vec(),
            Scale::IntercommunalGroup | Scale::Commune => collection
                .iter()
                .filter(|official| official.join_value(scale) == Some(key))
                .cloned()
                .collect(),
        };

        debug!(scale = %scale, key, found = found.len(), "Resolved officials");
        found
    }

    /// Nombre total d'élus, toutes échelles confondues
    pub fn len(&self) -> usize {
        self.departements.len() + self.epci.len() + self.communes.len()
    }

    /// Aucune liste chargée ?
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Ordre d'affichage des élus dans le panneau d'une entité.
///
/// Les élus ayant un libellé de fonction passent en premier. Aux échelles EPCI
/// et commune, les libellés sont ensuite comparés dans l'ordre alphabétique
/// français. Le tri est stable et renvoie une nouvelle séquence: la collection
/// d'origine garde son ordre d'un affichage à l'autre.
pub fn sort_for_display(officials: &[Official], scale: Scale) -> Vec<&Official> {
    let mut sorted: Vec<&Official> = officials.iter().collect();
    sorted.sort_by(|a, b| display_order(a, b, scale));
    sorted
}

fn display_order(a: &Official, b: &Official, scale: Scale) -> Ordering {
    let by_presence = b.has_function().cmp(&a.has_function());
    if by_presence != Ordering::Equal || !scale.sorts_by_function_label() {
        return by_presence;
    }

    compare_fr(
        a.fonction.as_deref().unwrap_or(""),
        b.fonction.as_deref().unwrap_or(""),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_directory() -> OfficialDirectory {
        OfficialDirectory::new(
            vec![
                Official::new("A", "Dep"),
                Official::new("B", "Dep").with_fonction("Président du conseil départemental"),
                Official::new("C", "Dep"),
                Official::new("D", "Dep").with_fonction("Conseiller départemental"),
            ],
            vec![
                Official::new("DUPONT", "Marie")
                    .with_siren("123456789")
                    .with_fonction("Vice-présidente"),
                Official::new("MARTIN", "Paul").with_siren("123456789"),
                Official::new("LEROY", "Jean")
                    .with_siren("987654321")
                    .with_fonction("Président"),
                Official::new("BERNARD", "Lucie")
                    .with_siren("123456789")
                    .with_fonction("Conseillère communautaire"),
            ],
            vec![
                Official::new("DURAND", "Luc").with_code_commune("34172"),
                Official::new("PETIT", "Anne").with_code_commune("34301"),
            ],
        )
    }

    #[test]
    fn test_find_officials_epci() {
        let directory = sample_directory();
        let found = directory.find_officials(Scale::IntercommunalGroup, "123456789");
        let names: Vec<_> = found.iter().map(|o| o.nom.as_str()).collect();
        assert_eq!(names, vec!["DUPONT", "MARTIN", "BERNARD"]);
    }

    #[test]
    fn test_find_officials_commune() {
        let directory = sample_directory();
        let found = directory.find_officials(Scale::Commune, "34172");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].nom, "DURAND");
    }

    #[test]
    fn test_find_officials_no_match() {
        let directory = sample_directory();
        assert!(directory.find_officials(Scale::Commune, "99999").is_empty());
        assert!(directory
            .find_officials(Scale::IntercommunalGroup, "12345678")
            .is_empty());
    }

    #[test]
    fn test_find_officials_department_unfiltered() {
        let directory = sample_directory();
        let found = directory.find_officials(Scale::Department, "ignored");
        assert_eq!(found.len(), 4);
    }

    #[test]
    fn test_find_officials_empty_directory() {
        let directory = OfficialDirectory::default();
        for scale in Scale::ALL {
            assert!(directory.find_officials(scale, "34172").is_empty());
        }
        assert!(directory.is_empty());
    }

    #[test]
    fn test_replace_collection() {
        let mut directory = sample_directory();
        directory.replace(Scale::Commune, vec![Official::new("NEUF", "Elu").with_code_commune("34172")]);
        let found = directory.find_officials(Scale::Commune, "34172");
        assert_eq!(found[0].nom, "NEUF");
        assert_eq!(directory.collection(Scale::Commune).len(), 1);
    }

    #[test]
    fn test_sort_department_partial() {
        let directory = sample_directory();
        let sorted = sort_for_display(directory.collection(Scale::Department), Scale::Department);
        let names: Vec<_> = sorted.iter().map(|o| o.nom.as_str()).collect();
        // Fonction d'abord, ordre source conservé sinon
        assert_eq!(names, vec!["B", "D", "A", "C"]);
    }

    #[test]
    fn test_sort_epci_by_function_label() {
        let directory = sample_directory();
        let found = directory.find_officials(Scale::IntercommunalGroup, "123456789");
        let sorted = sort_for_display(&found, Scale::IntercommunalGroup);
        let names: Vec<_> = sorted.iter().map(|o| o.nom.as_str()).collect();
        assert_eq!(names, vec!["BERNARD", "DUPONT", "MARTIN"]);
    }

    #[test]
    fn test_sort_does_not_mutate_source() {
        let directory = sample_directory();
        let before: Vec<_> = directory
            .collection(Scale::Department)
            .iter()
            .map(|o| o.nom.clone())
            .collect();

        for _ in 0..3 {
            let _ = sort_for_display(directory.collection(Scale::Department), Scale::Department);
        }

        let after: Vec<_> = directory
            .collection(Scale::Department)
            .iter()
            .map(|o| o.nom.clone())
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_sort_with_function_before_without() {
        let officials = vec![
            Official::new("Z", "1"),
            Official::new("Y", "2").with_fonction("Maire"),
            Official::new("X", "3"),
            Official::new("W", "4").with_fonction("Adjoint au maire"),
        ];

        for scale in Scale::ALL {
            let sorted = sort_for_display(&officials, scale);
            let first_without = sorted.iter().position(|o| !o.has_function()).unwrap();
            assert!(sorted[..first_without].iter().all(|o| o.has_function()));
            assert!(sorted[first_without..].iter().all(|o| !o.has_function()));
        }
    }
}
