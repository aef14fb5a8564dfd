//! Types de données partagés: propriétés GeoJSON et entités géographiques

use serde_json::Value;

/// Propriétés d'une feature GeoJSON (forme inconnue, clés sensibles à la casse)
pub type Properties = serde_json::Map<String, Value>;

/// Clés candidates pour le libellé d'une feature, dans l'ordre de priorité
pub const LABEL_KEYS: &[&str] = &["NOM", "nom", "NOM_M"];

/// Une entité géographique (département, EPCI ou commune)
#[derive(Debug, Clone)]
pub struct GeoFeature {
    /// Identifiant GeoJSON de la feature (optionnel)
    pub id: Option<String>,

    /// Géométrie brute, conservée pour l'export uniquement
    pub geometry: Option<geojson::Geometry>,

    /// Attributs de la feature
    pub properties: Properties,
}

impl GeoFeature {
    /// Crée une feature sans géométrie (tests, données tabulaires)
    pub fn from_properties(properties: Properties) -> Self {
        Self {
            id: None,
            geometry: None,
            properties,
        }
    }

    /// Valeur texte d'une propriété, vide si absente
    pub fn property(&self, key: &str) -> Option<String> {
        property_text(&self.properties, key)
    }

    /// Libellé affiché au survol (`NOM`, puis `nom`, puis `NOM_M`)
    pub fn label(&self) -> Option<String> {
        crate::classify::tooltip_label(&self.properties)
    }
}

impl From<geojson::Feature> for GeoFeature {
    fn from(feature: geojson::Feature) -> Self {
        let id = feature.id.map(|id| match id {
            geojson::feature::Id::String(s) => s,
            geojson::feature::Id::Number(n) => n.to_string(),
        });

        Self {
            id,
            geometry: feature.geometry,
            properties: feature.properties.unwrap_or_default(),
        }
    }
}

/// Convertit une valeur JSON scalaire en chaîne.
///
/// Les nombres entiers stockés en flottant (`123456789.0`) sont rendus sans
/// partie décimale, pour que `Siren` numérique et `code` texte se comparent.
/// `null`, tableaux et objets n'ont pas de représentation.
pub fn coerce_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else if let Some(u) = n.as_u64() {
                Some(u.to_string())
            } else {
                let f = n.as_f64()?;
                if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
                    Some(format!("{}", f as i64))
                } else {
                    Some(n.to_string())
                }
            }
        }
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Texte non vide d'une propriété
pub fn property_text(properties: &Properties, key: &str) -> Option<String> {
    properties
        .get(key)
        .and_then(coerce_to_string)
        .filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce_to_string() {
        assert_eq!(coerce_to_string(&json!("200011773")), Some("200011773".into()));
        assert_eq!(coerce_to_string(&json!(200011773)), Some("200011773".into()));
        assert_eq!(coerce_to_string(&json!(200011773.0)), Some("200011773".into()));
        assert_eq!(coerce_to_string(&json!(1.5)), Some("1.5".into()));
        assert_eq!(coerce_to_string(&json!(null)), None);
        assert_eq!(coerce_to_string(&json!(["a"])), None);
    }

    #[test]
    fn test_property_text_skips_blank() {
        let props = json!({ "nom": "Sète", "email": "  ", "population": 44000 });
        let props = props.as_object().unwrap();

        assert_eq!(property_text(props, "nom"), Some("Sète".into()));
        assert_eq!(property_text(props, "email"), None);
        assert_eq!(property_text(props, "population"), Some("44000".into()));
        assert_eq!(property_text(props, "absent"), None);
    }

    #[test]
    fn test_from_geojson_feature() {
        let feature: geojson::Feature = serde_json::from_value(json!({
            "type": "Feature",
            "id": 34,
            "geometry": { "type": "Point", "coordinates": [3.7, 43.4] },
            "properties": { "NOM": "Hérault" }
        }))
        .unwrap();

        let geo = GeoFeature::from(feature);
        assert_eq!(geo.id.as_deref(), Some("34"));
        assert!(geo.geometry.is_some());
        assert_eq!(geo.label(), Some("Hérault".into()));
    }
}
