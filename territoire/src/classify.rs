//! Coloration des features selon les filtres actifs

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::scale::Scale;
use crate::types::{property_text, Properties, LABEL_KEYS};

/// Valeur d'attribut qui active un filtre
pub const FLAG_YES: &str = "oui";

/// Filtres booléens indépendants
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filters {
    /// Mettre en évidence les entités `finance = "oui"`
    pub finance: bool,
    /// Mettre en évidence les entités `contact = "oui"`
    pub contact: bool,
}

/// Couleur imposée par un filtre
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorToken {
    Finance,
    Contact,
}

impl ColorToken {
    pub fn hex(self) -> &'static str {
        match self {
            ColorToken::Finance => "#00FF00",
            ColorToken::Contact => "#FF0000",
        }
    }
}

/// Style d'une feature transmis au moteur de rendu
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureStyle {
    pub color: &'static str,
    pub weight: u8,
    #[serde(rename = "fillOpacity", skip_serializing_if = "Option::is_none")]
    pub fill_opacity: Option<f64>,
}

/// Couleur d'une feature selon les filtres.
///
/// Le filtre finance l'emporte quand les deux s'appliquent. `None` laisse
/// l'appelant choisir la couleur par défaut de l'échelle.
pub fn color_for(properties: &Properties, filters: Filters) -> Option<ColorToken> {
    if filters.finance && is_flagged(properties, "finance") {
        Some(ColorToken::Finance)
    } else if filters.contact && is_flagged(properties, "contact") {
        Some(ColorToken::Contact)
    } else {
        None
    }
}

/// Style complet: couleur du filtre ou couleur par défaut de l'échelle
pub fn style_for(scale: Scale, properties: &Properties, filters: Filters) -> FeatureStyle {
    let color = color_for(properties, filters)
        .map(ColorToken::hex)
        .unwrap_or_else(|| scale.default_color());

    FeatureStyle {
        color,
        weight: 1,
        fill_opacity: scale.fill_opacity(),
    }
}

/// Libellé de survol: premier champ non vide parmi `NOM`, `nom`, `NOM_M`
pub fn tooltip_label(properties: &Properties) -> Option<String> {
    LABEL_KEYS
        .iter()
        .find_map(|key| property_text(properties, key))
}

fn is_flagged(properties: &Properties, key: &str) -> bool {
    matches!(properties.get(key), Some(Value::String(s)) if s == FLAG_YES)
}
