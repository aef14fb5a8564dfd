//! Échelles administratives affichables sur la carte
//!
//! Chaque échelle porte sa propre clé de jointure entre la feature GeoJSON et
//! la liste d'élus correspondante:
//!
//! | échelle | champ feature | champ élu      |
//! |---------|---------------|----------------|
//! | 0       | -             | -              |
//! | 1       | `code`        | `Siren`        |
//! | 2       | `INSEE_COM`   | `Code commune` |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::{property_text, Properties};
use crate::TerritoireError;

/// Échelle administrative active
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scale {
    /// Départements (0)
    #[default]
    Department,
    /// Établissements publics de coopération intercommunale (1)
    IntercommunalGroup,
    /// Communes (2)
    Commune,
}

impl Scale {
    /// Toutes les échelles, dans l'ordre du sélecteur
    pub const ALL: [Scale; 3] = [Scale::Department, Scale::IntercommunalGroup, Scale::Commune];

    /// Position sur le sélecteur (0, 1 ou 2)
    pub fn index(self) -> u8 {
        match self {
            Scale::Department => 0,
            Scale::IntercommunalGroup => 1,
            Scale::Commune => 2,
        }
    }

    /// Libellé du sélecteur
    pub fn label(self) -> &'static str {
        match self {
            Scale::Department => "Départements",
            Scale::IntercommunalGroup => "EPCI",
            Scale::Commune => "Communes",
        }
    }

    /// Titre affiché quand l'entité sélectionnée n'a pas de nom
    pub fn placeholder_title(self) -> &'static str {
        match self {
            Scale::Department => "Département non renseigné",
            Scale::IntercommunalGroup => "EPCI non renseigné",
            Scale::Commune => "Commune non renseignée",
        }
    }

    /// Champ de la feature servant de clé de jointure
    pub fn feature_join_field(self) -> Option<&'static str> {
        match self {
            Scale::Department => None,
            Scale::IntercommunalGroup => Some("code"),
            Scale::Commune => Some("INSEE_COM"),
        }
    }

    /// Champ de l'élu servant de clé de jointure
    pub fn official_join_field(self) -> Option<&'static str> {
        match self {
            Scale::Department => None,
            Scale::IntercommunalGroup => Some("Siren"),
            Scale::Commune => Some("Code commune"),
        }
    }

    /// Extrait la clé de jointure d'une feature, convertie en chaîne
    pub fn join_key(self, properties: &Properties) -> Option<String> {
        self.feature_join_field()
            .and_then(|field| property_text(properties, field))
    }

    /// Couleur de contour quand aucun filtre ne s'applique
    pub fn default_color(self) -> &'static str {
        match self {
            Scale::Department => "#DBFF3B",
            Scale::IntercommunalGroup => "#FF4ACC",
            Scale::Commune => "#9747FF",
        }
    }

    /// Opacité de remplissage (absente: valeur par défaut du moteur de rendu)
    pub fn fill_opacity(self) -> Option<f64> {
        match self {
            Scale::Department => None,
            Scale::IntercommunalGroup => Some(0.3),
            Scale::Commune => Some(0.2),
        }
    }

    /// Le tri d'affichage départage-t-il par libellé de fonction ?
    pub fn sorts_by_function_label(self) -> bool {
        !matches!(self, Scale::Department)
    }
}

impl TryFrom<u8> for Scale {
    type Error = TerritoireError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Scale::Department),
            1 => Ok(Scale::IntercommunalGroup),
            2 => Ok(Scale::Commune),
            other => Err(TerritoireError::InvalidScale(other)),
        }
    }
}

impl FromStr for Scale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "0" | "departement" | "departements" | "département" | "départements" => {
                Ok(Scale::Department)
            }
            "1" | "epci" => Ok(Scale::IntercommunalGroup),
            "2" | "commune" | "communes" => Ok(Scale::Commune),
            _ => Err(format!(
                "Invalid scale: {}. Use: 0 (departements), 1 (epci), 2 (communes)",
                s
            )),
        }
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_try_from_u8() {
        assert_eq!(Scale::try_from(0).unwrap(), Scale::Department);
        assert_eq!(Scale::try_from(1).unwrap(), Scale::IntercommunalGroup);
        assert_eq!(Scale::try_from(2).unwrap(), Scale::Commune);
        assert!(matches!(
            Scale::try_from(3),
            Err(TerritoireError::InvalidScale(3))
        ));
    }

    #[test]
    fn test_from_str() {
        assert_eq!("epci".parse::<Scale>().unwrap(), Scale::IntercommunalGroup);
        assert_eq!("Communes".parse::<Scale>().unwrap(), Scale::Commune);
        assert_eq!("0".parse::<Scale>().unwrap(), Scale::Department);
        assert!("region".parse::<Scale>().is_err());
    }

    #[test]
    fn test_join_key_per_scale() {
        let props = json!({ "code": 200011773, "INSEE_COM": "34172", "nom": "X" });
        let props = props.as_object().unwrap();

        assert_eq!(Scale::Department.join_key(props), None);
        assert_eq!(
            Scale::IntercommunalGroup.join_key(props),
            Some("200011773".to_string())
        );
        assert_eq!(Scale::Commune.join_key(props), Some("34172".to_string()));
    }

    #[test]
    fn test_index_roundtrip() {
        for scale in Scale::ALL {
            assert_eq!(Scale::try_from(scale.index()).unwrap(), scale);
        }
    }
}
