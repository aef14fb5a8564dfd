//! Fusion des attributs d'une feature cliquée avec ses élus

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use crate::directory::{sort_for_display, OfficialDirectory};
use crate::official::Official;
use crate::scale::Scale;
use crate::types::{property_text, Properties, LABEL_KEYS};

/// Clé sous laquelle les élus sont ajoutés aux attributs
pub const ELUS_KEY: &str = "elus";

/// Entité sélectionnée sur la carte
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedEntity {
    /// Échelle active au moment du clic
    pub scale: Scale,

    /// Copie des attributs de la feature
    pub properties: Properties,

    /// Élus rattachés (EPCI et communes). `None` à l'échelle départementale,
    /// où le panneau affiche la liste départementale complète.
    pub elus: Option<Vec<Official>>,
}

impl SelectedEntity {
    /// Nom de l'entité (`nom`, puis `NOM`, puis `NOM_M`)
    pub fn title(&self) -> Option<String> {
        std::iter::once("nom")
            .chain(LABEL_KEYS.iter().copied())
            .find_map(|key| property_text(&self.properties, key))
    }

    /// Valeur texte d'un attribut
    pub fn property(&self, key: &str) -> Option<String> {
        property_text(&self.properties, key)
    }

    /// Élus du panneau, dans l'ordre d'affichage
    pub fn drawer_officials<'a>(&'a self, directory: &'a OfficialDirectory) -> Vec<&'a Official> {
        match &self.elus {
            Some(elus) => sort_for_display(elus, self.scale),
            None => sort_for_display(directory.collection(Scale::Department), Scale::Department),
        }
    }

    /// Forme JSON: attributs ⊕ `{ "elus": [...] }`
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl Serialize for SelectedEntity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (key, value) in &self.properties {
            if self.elus.is_some() && key == ELUS_KEY {
                continue;
            }
            map.serialize_entry(key, value)?;
        }
        if let Some(elus) = &self.elus {
            map.serialize_entry(ELUS_KEY, elus)?;
        }
        map.end()
    }
}

/// Construit l'entité sélectionnée au clic sur une feature.
///
/// - Département: attributs inchangés, sans élus attachés
/// - EPCI: élus dont `Siren` == `code`
/// - Commune: élus dont `Code commune` == `INSEE_COM`
///
/// Une clé absente donne une liste d'élus vide. Les attributs d'origine ne
/// sont jamais modifiés.
pub fn merge_on_click(
    scale: Scale,
    properties: &Properties,
    directory: &OfficialDirectory,
) -> SelectedEntity {
    let elus = match scale {
        Scale::Department => None,
        Scale::IntercommunalGroup | Scale::Commune => Some(
            scale
                .join_key(properties)
                .map(|key| directory.find_officials(scale, &key))
                .unwrap_or_default(),
        ),
    };

    SelectedEntity {
        scale,
        properties: properties.clone(),
        elus,
    }
}
