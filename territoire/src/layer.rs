//! Couches géographiques (une FeatureCollection par échelle)

use geojson::GeoJson;
use serde_json::Value;

use crate::scale::Scale;
use crate::types::GeoFeature;
use crate::TerritoireError;

/// Les features d'une échelle, dans l'ordre de la source
#[derive(Debug, Clone, Default)]
pub struct GeoLayer {
    pub scale: Scale,
    pub features: Vec<GeoFeature>,
}

impl GeoLayer {
    pub fn new(scale: Scale, features: Vec<GeoFeature>) -> Self {
        Self { scale, features }
    }

    /// Couche vide (source pas encore chargée ou en échec)
    pub fn empty(scale: Scale) -> Self {
        Self::new(scale, Vec::new())
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Recherche une feature par clé de jointure ou par libellé.
    ///
    /// La clé de jointure (`code`, `INSEE_COM`) est comparée exactement; le
    /// libellé sans tenir compte de la casse.
    pub fn find(&self, query: &str) -> Option<(usize, &GeoFeature)> {
        let query = query.trim();

        let by_key = self
            .features
            .iter()
            .enumerate()
            .find(|(_, f)| self.scale.join_key(&f.properties).as_deref() == Some(query));
        if by_key.is_some() {
            return by_key;
        }

        let by_label = |exact: bool| {
            self.features.iter().enumerate().find(|(_, f)| {
                f.label().is_some_and(|label| {
                    if exact {
                        label == query
                    } else {
                        label.to_lowercase() == query.to_lowercase()
                    }
                })
            })
        };

        by_label(true).or_else(|| by_label(false))
    }
}

/// Décode une FeatureCollection GeoJSON.
///
/// Une Feature isolée est acceptée comme collection d'un élément.
///
/// # Errors
///
/// Retourne `TerritoireError` si le document n'est pas du GeoJSON, ou s'il
/// s'agit d'une géométrie nue.
pub fn parse_feature_collection(
    data: &[u8],
    resource: &str,
) -> Result<Vec<GeoFeature>, TerritoireError> {
    let value: Value = serde_json::from_slice(data)?;
    let geojson = GeoJson::from_json_value(value)?;

    match geojson {
        GeoJson::FeatureCollection(collection) => Ok(collection
            .features
            .into_iter()
            .map(GeoFeature::from)
            .collect()),
        GeoJson::Feature(feature) => Ok(vec![GeoFeature::from(feature)]),
        GeoJson::Geometry(_) => Err(TerritoireError::unexpected_shape(
            resource,
            "expected a FeatureCollection, got a bare geometry",
        )),
    }
}
