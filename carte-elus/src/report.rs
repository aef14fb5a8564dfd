//! Rapport de chargement des ressources
//!
//! Le chargement ne bloque jamais la session: une ressource absente ou
//! illisible devient une collection vide. Ce module rend ces dégradations
//! visibles (console ou JSON).

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use serde::Serialize;
use territoire::TerritoireError;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::config::ResourceKind;

/// Statut global du chargement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LoadStatus {
    /// Toutes les ressources chargées
    Success,
    /// Certaines ressources vides ou en échec
    PartialSuccess,
    /// Aucune ressource exploitable
    Failed,
}

/// Statut d'une ressource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ResourceStatus {
    Loaded,
    Empty,
    Failed,
}

/// Ligne du rapport pour une ressource
#[derive(Debug, Clone, Serialize)]
pub struct ResourceEntry {
    /// Ressource concernée
    pub resource: ResourceKind,
    /// URL ou chemin
    pub location: String,
    /// Statut
    pub status: ResourceStatus,
    /// Nombre de features ou d'élus retenus
    pub records: usize,
    /// Nombre de lignes ignorées
    pub skipped: usize,
    /// Taille du contenu récupéré
    pub bytes: usize,
    /// Empreinte blake3 du contenu (hex)
    pub checksum: Option<String>,
    /// Message d'erreur (optionnel)
    pub error: Option<String>,
}

/// Avertissement non fatal (ligne ignorée)
#[derive(Debug, Clone, Serialize)]
pub struct LoadWarning {
    /// Ressource concernée
    pub resource: ResourceKind,
    /// Index de la ligne dans la source (optionnel)
    pub index: Option<usize>,
    /// Message
    pub message: String,
}

/// Rapport complet de chargement
#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    /// Horodatage du chargement (RFC 3339)
    pub loaded_at: String,
    /// Durée du chargement
    pub duration_secs: f64,
    /// Statut global
    pub status: LoadStatus,
    /// Une entrée par ressource
    pub resources: Vec<ResourceEntry>,
    /// Liste des warnings
    pub warnings: Vec<LoadWarning>,
}

impl Default for LoadReport {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadReport {
    /// Crée un rapport vide, horodaté maintenant
    pub fn new() -> Self {
        Self {
            loaded_at: OffsetDateTime::now_utc()
                .format(&Rfc3339)
                .unwrap_or_default(),
            duration_secs: 0.0,
            status: LoadStatus::Success,
            resources: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Enregistre une ressource chargée
    pub fn record_loaded(
        &mut self,
        resource: ResourceKind,
        location: &str,
        records: usize,
        bytes: usize,
        checksum: Option<String>,
    ) {
        self.resources.push(ResourceEntry {
            resource,
            location: location.to_string(),
            status: ResourceStatus::Loaded,
            records,
            skipped: 0,
            bytes,
            checksum,
            error: None,
        });
    }

    /// Enregistre une ressource chargée mais vide
    pub fn record_empty(
        &mut self,
        resource: ResourceKind,
        location: &str,
        bytes: usize,
        checksum: Option<String>,
    ) {
        self.resources.push(ResourceEntry {
            resource,
            location: location.to_string(),
            status: ResourceStatus::Empty,
            records: 0,
            skipped: 0,
            bytes,
            checksum,
            error: None,
        });
    }

    /// Enregistre une ressource en échec
    pub fn record_failure(&mut self, resource: ResourceKind, location: &str, message: &str) {
        self.resources.push(ResourceEntry {
            resource,
            location: location.to_string(),
            status: ResourceStatus::Failed,
            records: 0,
            skipped: 0,
            bytes: 0,
            checksum: None,
            error: Some(message.to_string()),
        });
    }

    /// Enregistre une ligne ignorée d'une liste d'élus
    pub fn record_skipped_row(&mut self, resource: ResourceKind, error: &TerritoireError) {
        if let Some(entry) = self.resources.iter_mut().rev().find(|e| e.resource == resource) {
            entry.skipped += 1;
        }
        self.record_row_warning(resource, error);
    }

    /// Enregistre une ligne conservée malgré un nom ou un prénom manquant
    pub fn record_incomplete_row(&mut self, resource: ResourceKind, error: &TerritoireError) {
        self.record_row_warning(resource, error);
    }

    fn record_row_warning(&mut self, resource: ResourceKind, error: &TerritoireError) {
        let index = match error {
            TerritoireError::InvalidRecord { index, .. }
            | TerritoireError::IncompleteRecord { index, .. } => Some(*index),
            _ => None,
        };

        self.warnings.push(LoadWarning {
            resource,
            index,
            message: error.to_string(),
        });
    }

    /// Définit la durée du chargement
    pub fn set_duration(&mut self, duration: Duration) {
        self.duration_secs = duration.as_secs_f64();
    }

    /// Détermine le statut final
    pub fn finalize(&mut self) {
        let loaded = self
            .resources
            .iter()
            .filter(|e| e.status == ResourceStatus::Loaded)
            .count();

        self.status = if loaded == 0 {
            LoadStatus::Failed
        } else if loaded < self.resources.len() {
            LoadStatus::PartialSuccess
        } else {
            LoadStatus::Success
        };
    }

    /// Entrée d'une ressource
    pub fn entry(&self, resource: ResourceKind) -> Option<&ResourceEntry> {
        self.resources.iter().find(|e| e.resource == resource)
    }

    /// Nombre total d'enregistrements chargés
    pub fn total_records(&self) -> usize {
        self.resources.iter().map(|e| e.records).sum()
    }

    /// Nombre de ressources en échec
    pub fn failed_count(&self) -> usize {
        self.resources
            .iter()
            .filter(|e| e.status == ResourceStatus::Failed)
            .count()
    }

    /// Affiche le rapport sur la console
    pub fn display(&self) {
        println!("\n{}", "=".repeat(60));
        println!("LOAD REPORT - {}", self.loaded_at);
        println!("{}", "=".repeat(60));

        println!("\nStatus: {:?}", self.status);
        println!("Duration: {:.2}s", self.duration_secs);

        println!("\n--- RESOURCES ---");
        for e in &self.resources {
            println!(
                "  {}: {:?}, {} records, {} skipped, {} bytes",
                e.resource, e.status, e.records, e.skipped, e.bytes
            );
            println!("    {}", e.location);
            if let Some(ref error) = e.error {
                println!("    error: {}", error);
            }
        }

        if !self.warnings.is_empty() {
            println!("\n--- WARNINGS ({}) ---", self.warnings.len());
            for w in self.warnings.iter().take(10) {
                println!("  [{}] {}", w.resource, w.message);
            }
            if self.warnings.len() > 10 {
                println!("  ... and {} more", self.warnings.len() - 10);
            }
        }

        println!("\n{}", "=".repeat(60));
    }

    /// Sauvegarde le rapport en JSON
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Affichage compact pour le résumé
    pub fn summary(&self) -> String {
        let loaded = self
            .resources
            .iter()
            .filter(|e| e.status == ResourceStatus::Loaded)
            .count();
        format!(
            "{}/{} resources loaded, {} records, {} failed, {} warnings",
            loaded,
            self.resources.len(),
            self.total_records(),
            self.failed_count(),
            self.warnings.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_report_default() {
        let report = LoadReport::default();
        assert_eq!(report.status, LoadStatus::Success);
        assert!(report.resources.is_empty());
        assert_eq!(report.total_records(), 0);
    }

    #[test]
    fn test_finalize_success() {
        let mut report = LoadReport::new();
        report.record_loaded(ResourceKind::EpciGeo, "/epci.geojson", 12, 1024, None);
        report.record_loaded(ResourceKind::ElusEpci, "https://x", 80, 2048, None);
        report.finalize();

        assert_eq!(report.status, LoadStatus::Success);
        assert_eq!(report.total_records(), 92);
    }

    #[test]
    fn test_finalize_partial_success() {
        let mut report = LoadReport::new();
        report.record_loaded(ResourceKind::EpciGeo, "/epci.geojson", 12, 1024, None);
        report.record_failure(ResourceKind::ElusEpci, "https://x", "HTTP 404");
        report.finalize();

        assert_eq!(report.status, LoadStatus::PartialSuccess);
        assert_eq!(report.failed_count(), 1);
        assert_eq!(
            report.entry(ResourceKind::ElusEpci).unwrap().error.as_deref(),
            Some("HTTP 404")
        );
    }

    #[test]
    fn test_finalize_failed() {
        let mut report = LoadReport::new();
        report.record_empty(ResourceKind::CommunesGeo, "/communes.geojson", 2, None);
        report.record_failure(ResourceKind::ElusCommunes, "https://x", "timeout");
        report.finalize();

        assert_eq!(report.status, LoadStatus::Failed);
    }

    #[test]
    fn test_record_skipped_row() {
        let mut report = LoadReport::new();
        report.record_loaded(ResourceKind::ElusCommunes, "c.json", 3, 300, None);
        report.record_skipped_row(
            ResourceKind::ElusCommunes,
            &TerritoireError::invalid_record(4, "row is not an object"),
        );

        assert_eq!(report.entry(ResourceKind::ElusCommunes).unwrap().skipped, 1);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].index, Some(4));
    }

    #[test]
    fn test_record_incomplete_row() {
        let mut report = LoadReport::new();
        report.record_loaded(ResourceKind::ElusDepartements, "d.json", 4, 400, None);
        report.record_incomplete_row(
            ResourceKind::ElusDepartements,
            &TerritoireError::incomplete_record(3, "Prénom"),
        );

        let entry = report.entry(ResourceKind::ElusDepartements).unwrap();
        assert_eq!(entry.skipped, 0);
        assert_eq!(entry.records, 4);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].index, Some(3));
        assert!(report.warnings[0].message.contains("Prénom"));
    }

    #[test]
    fn test_summary() {
        let mut report = LoadReport::new();
        report.record_loaded(ResourceKind::DepartementsGeo, "d", 1, 10, None);
        report.record_failure(ResourceKind::ElusDepartements, "e", "boom");

        let summary = report.summary();
        assert!(summary.contains("1/2 resources loaded"));
        assert!(summary.contains("1 failed"));
    }

    #[test]
    fn test_save_to_file() {
        let mut report = LoadReport::new();
        report.record_loaded(ResourceKind::EpciGeo, "e", 1, 10, Some("abc".into()));
        report.finalize();

        let path = std::env::temp_dir().join("carte_elus_test_report.json");
        report.save_to_file(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"epci_geo\""));
        assert!(content.contains("\"Success\""));

        std::fs::remove_file(path).ok();
    }
}
