//! Élus et décodage des listes d'élus (tableur exporté en JSON)
//!
//! Chaque liste est un tableau d'objets plats dont les clés sont les en-têtes
//! de colonnes du tableur, accents compris. Les valeurs peuvent être des
//! chaînes ou des nombres selon la cellule source.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::scale::Scale;
use crate::types::coerce_to_string;
use crate::TerritoireError;

/// Un élu tel que décrit dans les listes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Official {
    #[serde(rename = "Nom", default, deserialize_with = "name_text")]
    pub nom: String,

    #[serde(rename = "Prénom", default, deserialize_with = "name_text")]
    pub prenom: String,

    #[serde(
        rename = "Libellé de la fonction",
        default,
        deserialize_with = "optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub fonction: Option<String>,

    #[serde(
        rename = "Délégation",
        default,
        deserialize_with = "optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub delegation: Option<String>,

    /// Date de naissance brute (JJ/MM/AAAA attendu)
    #[serde(
        rename = "Date de naissance",
        default,
        deserialize_with = "optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub date_naissance: Option<String>,

    #[serde(
        rename = "Libellé de la catégorie socio-professionnelle",
        default,
        deserialize_with = "optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub categorie_socio_pro: Option<String>,

    #[serde(
        rename = "Date de début du mandat",
        default,
        deserialize_with = "optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub debut_mandat: Option<String>,

    /// Clé de jointure EPCI
    #[serde(
        rename = "Siren",
        default,
        deserialize_with = "optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub siren: Option<String>,

    /// Clé de jointure commune (code INSEE)
    #[serde(
        rename = "Code commune",
        default,
        deserialize_with = "optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub code_commune: Option<String>,

    /// Colonnes non interprétées, conservées telles quelles
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl Official {
    /// Crée un élu avec seulement nom et prénom
    pub fn new(nom: impl Into<String>, prenom: impl Into<String>) -> Self {
        Self {
            nom: nom.into(),
            prenom: prenom.into(),
            fonction: None,
            delegation: None,
            date_naissance: None,
            categorie_socio_pro: None,
            debut_mandat: None,
            siren: None,
            code_commune: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Ajoute un libellé de fonction
    pub fn with_fonction(mut self, fonction: impl Into<String>) -> Self {
        self.fonction = Some(fonction.into());
        self
    }

    /// Ajoute une date de naissance brute
    pub fn with_date_naissance(mut self, date: impl Into<String>) -> Self {
        self.date_naissance = Some(date.into());
        self
    }

    /// Rattache l'élu à un EPCI
    pub fn with_siren(mut self, siren: impl Into<String>) -> Self {
        self.siren = Some(siren.into());
        self
    }

    /// Rattache l'élu à une commune
    pub fn with_code_commune(mut self, code: impl Into<String>) -> Self {
        self.code_commune = Some(code.into());
        self
    }

    /// "Nom Prénom", tel qu'affiché dans la liste
    pub fn display_name(&self) -> String {
        format!("{} {}", self.nom, self.prenom).trim().to_string()
    }

    /// "Prénom Nom", tel qu'affiché dans la fiche de l'élu
    pub fn full_name(&self) -> String {
        format!("{} {}", self.prenom, self.nom).trim().to_string()
    }

    /// L'élu a-t-il un libellé de fonction non vide ?
    pub fn has_function(&self) -> bool {
        self.fonction.is_some()
    }

    /// Valeur de la clé de jointure pour l'échelle donnée
    pub fn join_value(&self, scale: Scale) -> Option<&str> {
        match scale {
            Scale::Department => None,
            Scale::IntercommunalGroup => self.siren.as_deref(),
            Scale::Commune => self.code_commune.as_deref(),
        }
    }
}

/// Nom ou prénom: absent, `null` ou non textuel donne une chaîne vide
fn name_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(coerce_to_string)
        .map(|s| s.trim().to_string())
        .unwrap_or_default())
}

fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(coerce_to_string)
        .filter(|s| !s.trim().is_empty()))
}

/// Résultat du décodage d'une liste d'élus
#[derive(Debug, Default)]
pub struct Roster {
    /// Élus décodés, dans l'ordre de la source
    pub officials: Vec<Official>,

    /// Lignes ignorées (non fatales)
    pub skipped: Vec<TerritoireError>,

    /// Lignes conservées avec un nom ou un prénom vide
    pub incomplete: Vec<TerritoireError>,
}

/// Décode une liste d'élus.
///
/// Le document doit être un tableau JSON. Une ligne qui n'est pas un objet
/// est ignorée et consignée dans [`Roster::skipped`], sans interrompre le
/// décodage des autres lignes. Une ligne sans `Nom` ou `Prénom` est conservée
/// avec un nom vide et signalée dans [`Roster::incomplete`].
///
/// # Errors
///
/// Retourne `TerritoireError` si le document n'est pas du JSON ou n'est pas
/// un tableau (le service de tableur renvoie `{"error": ...}` en cas d'échec).
pub fn parse_roster(data: &[u8], resource: &str) -> Result<Roster, TerritoireError> {
    let document: Value = serde_json::from_slice(data)?;

    let rows = match document {
        Value::Array(rows) => rows,
        Value::Object(map) => {
            let reason = map
                .get("error")
                .and_then(coerce_to_string)
                .unwrap_or_else(|| "expected an array of records, got an object".to_string());
            return Err(TerritoireError::unexpected_shape(resource, reason));
        }
        other => {
            return Err(TerritoireError::unexpected_shape(
                resource,
                format!("expected an array of records, got {}", json_kind(&other)),
            ))
        }
    };

    let mut roster = Roster {
        officials: Vec::with_capacity(rows.len()),
        skipped: Vec::new(),
        incomplete: Vec::new(),
    };

    for (index, row) in rows.into_iter().enumerate() {
        if !row.is_object() {
            warn!(resource, index, "Skipping non-object roster row");
            roster
                .skipped
                .push(TerritoireError::invalid_record(index, "row is not an object"));
            continue;
        }

        match serde_json::from_value::<Official>(row) {
            Ok(official) => {
                for (field, value) in [("Nom", &official.nom), ("Prénom", &official.prenom)] {
                    if value.is_empty() {
                        warn!(resource, index, field, "Roster row without name, kept");
                        roster
                            .incomplete
                            .push(TerritoireError::incomplete_record(index, field));
                    }
                }
                roster.officials.push(official);
            }
            Err(e) => {
                warn!(resource, index, error = %e, "Skipping invalid roster row");
                roster
                    .skipped
                    .push(TerritoireError::invalid_record(index, e.to_string()));
            }
        }
    }

    Ok(roster)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
