//! # carte-elus
//!
//! Carte interactive des élus de l'Hérault: départements, EPCI et communes.
//!
//! ## Features
//!
//! - Chargement parallèle des couches GeoJSON et des listes d'élus (HTTP ou fichiers)
//! - Rapport de chargement (ressources en échec, lignes ignorées, empreintes)
//! - Session interactive: échelle, filtres, clic sur une entité puis sur un élu
//! - Export GeoJSON stylé (couleur, libellé de survol)
//!
//! ## Usage CLI
//!
//! ```bash
//! # Fiche d'une commune et de son premier élu
//! carte-elus inspect --scale 2 --feature Sète --elu 0
//!
//! # Couche EPCI stylée avec le filtre finance
//! carte-elus styles --scale 1 --finance --output epci.geojson
//!
//! # Session interactive
//! carte-elus session
//! ```

pub mod config;
pub mod export;
pub mod loader;
pub mod report;
pub mod session;
pub mod view;

pub use config::Config;
pub use loader::{Datasets, LoadOutcome, Loader};
pub use report::{LoadReport, LoadStatus};
pub use session::{Command, Session};
