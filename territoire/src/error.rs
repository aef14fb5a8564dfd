//! Types d'erreurs pour le crate territoire

use thiserror::Error;

/// Erreurs pouvant survenir lors du décodage des jeux de données
#[derive(Debug, Error)]
pub enum TerritoireError {
    /// Échelle hors de 0..=2
    #[error("Invalid scale: {0} (expected 0, 1 or 2)")]
    InvalidScale(u8),

    /// JSON illisible
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// GeoJSON illisible
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// Document valide mais de forme inattendue (ex: objet au lieu d'un tableau)
    #[error("Unexpected shape for {resource}: {reason}")]
    UnexpectedShape { resource: String, reason: String },

    /// Ligne de liste d'élus inexploitable
    #[error("Invalid record #{index}: {reason}")]
    InvalidRecord { index: usize, reason: String },

    /// Ligne conservée mais incomplète (nom ou prénom vide)
    #[error("Incomplete record #{index}: missing {field}")]
    IncompleteRecord { index: usize, field: &'static str },
}

impl TerritoireError {
    /// Crée une erreur de forme avec contexte
    pub fn unexpected_shape(resource: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnexpectedShape {
            resource: resource.into(),
            reason: reason.into(),
        }
    }

    /// Crée une erreur de ligne invalide
    pub fn invalid_record(index: usize, reason: impl Into<String>) -> Self {
        Self::InvalidRecord {
            index,
            reason: reason.into(),
        }
    }

    /// Crée un avertissement de ligne incomplète
    pub fn incomplete_record(index: usize, field: &'static str) -> Self {
        Self::IncompleteRecord { index, field }
    }
}
