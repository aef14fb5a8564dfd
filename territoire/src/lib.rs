//! # territoire
//!
//! Résolution des entités territoriales cliquées sur la carte (départements,
//! EPCI, communes) et des élus qui leur sont rattachés.
//!
//! ## Features
//!
//! - Annuaire des élus par échelle, jointure par `Siren` ou `Code commune`
//! - Tri d'affichage stable, fonction d'abord puis ordre alphabétique français
//! - Coloration des features selon les filtres finance / contact
//! - Machine d'état de la sélection (échelle, entité, élu, panneaux)
//! - Dates de naissance `JJ/MM/AAAA` et calcul d'âge
//!
//! ## Usage
//!
//! ```rust
//! use territoire::{OfficialDirectory, Official, Scale, SelectionState};
//! use serde_json::json;
//!
//! let directory = OfficialDirectory::new(
//!     vec![],
//!     vec![],
//!     vec![Official::new("DURAND", "Luc").with_code_commune("34301")],
//! );
//!
//! let mut state = SelectionState::new();
//! state.set_scale(Scale::Commune);
//!
//! let properties = json!({ "nom": "Sète", "INSEE_COM": "34301" });
//! let entity = state.click_feature(properties.as_object().unwrap(), &directory);
//! assert_eq!(entity.elus.as_ref().map(Vec::len), Some(1));
//! assert!(state.is_entity_drawer_open());
//! ```

pub mod classify;
pub mod collate;
pub mod date;
pub mod directory;
pub mod error;
pub mod layer;
pub mod merge;
pub mod official;
pub mod scale;
pub mod selection;
pub mod types;

pub use classify::{color_for, style_for, tooltip_label, ColorToken, FeatureStyle, Filters};
pub use date::{age_from_birth_date, age_status, parse_french_date, AgeStatus, ParsedDate};
pub use directory::{sort_for_display, OfficialDirectory};
pub use error::TerritoireError;
pub use layer::{parse_feature_collection, GeoLayer};
pub use merge::{merge_on_click, SelectedEntity};
pub use official::{parse_roster, Official, Roster};
pub use scale::Scale;
pub use selection::{Event, ScaleChangePolicy, SelectionState};
pub use types::{GeoFeature, Properties};
