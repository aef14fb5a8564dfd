//! Configuration: emplacement des six ressources et comportement de la session

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use territoire::{Scale, ScaleChangePolicy};
use tracing::debug;

/// Presets embarqués
pub const PRESETS: &[&str] = &["herault"];

/// Configuration principale
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Emplacement des jeux de données
    pub resources: ResourceConfig,

    /// Options HTTP
    #[serde(default)]
    pub http: HttpConfig,

    /// Comportement de la sélection
    #[serde(default)]
    pub selection: SelectionConfig,
}

/// Emplacement des ressources: URL `http(s)://` ou chemin local
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResourceConfig {
    /// Répertoire racine des chemins locaux (les chemins `/x.geojson` y sont résolus)
    #[serde(default)]
    pub base_dir: Option<PathBuf>,

    pub departements_geo: String,
    pub epci_geo: String,
    pub communes_geo: String,

    pub elus_departements: String,
    pub elus_epci: String,
    pub elus_communes: String,
}

/// Options HTTP
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct HttpConfig {
    /// Délai maximal par requête (aucun par défaut)
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// Comportement de la sélection
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SelectionConfig {
    /// Effet d'un changement d'échelle (`keep` ou `reset`)
    #[serde(default)]
    pub scale_change: ScaleChangePolicy,
}

/// Les six ressources chargées au démarrage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    DepartementsGeo,
    EpciGeo,
    CommunesGeo,
    ElusDepartements,
    ElusEpci,
    ElusCommunes,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 6] = [
        ResourceKind::DepartementsGeo,
        ResourceKind::EpciGeo,
        ResourceKind::CommunesGeo,
        ResourceKind::ElusDepartements,
        ResourceKind::ElusEpci,
        ResourceKind::ElusCommunes,
    ];

    /// Nom de la ressource (clé de configuration)
    pub fn name(self) -> &'static str {
        match self {
            ResourceKind::DepartementsGeo => "departements_geo",
            ResourceKind::EpciGeo => "epci_geo",
            ResourceKind::CommunesGeo => "communes_geo",
            ResourceKind::ElusDepartements => "elus_departements",
            ResourceKind::ElusEpci => "elus_epci",
            ResourceKind::ElusCommunes => "elus_communes",
        }
    }

    pub fn scale(self) -> Scale {
        match self {
            ResourceKind::DepartementsGeo | ResourceKind::ElusDepartements => Scale::Department,
            ResourceKind::EpciGeo | ResourceKind::ElusEpci => Scale::IntercommunalGroup,
            ResourceKind::CommunesGeo | ResourceKind::ElusCommunes => Scale::Commune,
        }
    }

    /// Couche GeoJSON (sinon liste d'élus)
    pub fn is_geo(self) -> bool {
        matches!(
            self,
            ResourceKind::DepartementsGeo | ResourceKind::EpciGeo | ResourceKind::CommunesGeo
        )
    }

    /// Couche GeoJSON d'une échelle
    pub fn geo(scale: Scale) -> Self {
        match scale {
            Scale::Department => ResourceKind::DepartementsGeo,
            Scale::IntercommunalGroup => ResourceKind::EpciGeo,
            Scale::Commune => ResourceKind::CommunesGeo,
        }
    }

    /// Liste d'élus d'une échelle
    pub fn roster(scale: Scale) -> Self {
        match scale {
            Scale::Department => ResourceKind::ElusDepartements,
            Scale::IntercommunalGroup => ResourceKind::ElusEpci,
            Scale::Commune => ResourceKind::ElusCommunes,
        }
    }

    /// Variable d'environnement surchargeant l'emplacement
    pub fn env_var(self) -> &'static str {
        match self {
            ResourceKind::DepartementsGeo => "CARTE_ELUS_DEPARTEMENTS_GEO",
            ResourceKind::EpciGeo => "CARTE_ELUS_EPCI_GEO",
            ResourceKind::CommunesGeo => "CARTE_ELUS_COMMUNES_GEO",
            ResourceKind::ElusDepartements => "CARTE_ELUS_ELUS_DEPARTEMENTS",
            ResourceKind::ElusEpci => "CARTE_ELUS_ELUS_EPCI",
            ResourceKind::ElusCommunes => "CARTE_ELUS_ELUS_COMMUNES",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Emplacement résolu d'une ressource
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Url(String),
    Path(PathBuf),
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Url(url) => f.write_str(url),
            Location::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

impl ResourceConfig {
    /// Valeur brute configurée pour une ressource
    pub fn raw(&self, kind: ResourceKind) -> &str {
        match kind {
            ResourceKind::DepartementsGeo => &self.departements_geo,
            ResourceKind::EpciGeo => &self.epci_geo,
            ResourceKind::CommunesGeo => &self.communes_geo,
            ResourceKind::ElusDepartements => &self.elus_departements,
            ResourceKind::ElusEpci => &self.elus_epci,
            ResourceKind::ElusCommunes => &self.elus_communes,
        }
    }

    fn raw_mut(&mut self, kind: ResourceKind) -> &mut String {
        match kind {
            ResourceKind::DepartementsGeo => &mut self.departements_geo,
            ResourceKind::EpciGeo => &mut self.epci_geo,
            ResourceKind::CommunesGeo => &mut self.communes_geo,
            ResourceKind::ElusDepartements => &mut self.elus_departements,
            ResourceKind::ElusEpci => &mut self.elus_epci,
            ResourceKind::ElusCommunes => &mut self.elus_communes,
        }
    }

    /// Résout l'emplacement d'une ressource.
    ///
    /// Les chemins commençant par `/` désignent la racine web: ils sont
    /// résolus dans `base_dir` quand celui-ci est défini.
    pub fn location(&self, kind: ResourceKind) -> Location {
        let raw = self.raw(kind).trim();

        if raw.starts_with("http://") || raw.starts_with("https://") {
            return Location::Url(raw.to_string());
        }

        match &self.base_dir {
            Some(base) => Location::Path(base.join(raw.trim_start_matches('/'))),
            None => Location::Path(PathBuf::from(raw)),
        }
    }
}

impl Config {
    /// Charge une configuration depuis un fichier
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        serde_json::from_str(&content).context("Failed to parse config JSON")
    }

    /// Charge une configuration depuis un preset embarqué
    pub fn from_preset(preset: &str) -> Result<Self> {
        match preset {
            "herault" => Self::load_embedded(include_str!("presets/herault.json")),
            _ => anyhow::bail!("Unknown preset: {}. Use: {}", preset, PRESETS.join(", ")),
        }
    }

    fn load_embedded(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse embedded config")
    }

    /// Preset par nom, sinon fichier JSON
    pub fn resolve(spec: &str) -> Result<Self> {
        if PRESETS.contains(&spec) {
            Self::from_preset(spec)
        } else {
            Self::load(Path::new(spec))
        }
    }

    /// Applique les surcharges `CARTE_ELUS_*` de l'environnement
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(base) = lookup("CARTE_ELUS_BASE_DIR") {
            debug!(base_dir = %base, "Override from environment");
            self.resources.base_dir = Some(PathBuf::from(base));
        }

        for kind in ResourceKind::ALL {
            if let Some(value) = lookup(kind.env_var()) {
                debug!(resource = %kind, value = %value, "Override from environment");
                *self.resources.raw_mut(kind) = value;
            }
        }

        if let Some(timeout) = lookup("CARTE_ELUS_TIMEOUT").and_then(|t| t.parse().ok()) {
            self.http.timeout_secs = Some(timeout);
        }

        if let Some(policy) = lookup("CARTE_ELUS_SCALE_CHANGE") {
            match policy.to_lowercase().as_str() {
                "keep" => self.selection.scale_change = ScaleChangePolicy::KeepSelection,
                "reset" => self.selection.scale_change = ScaleChangePolicy::ResetSelection,
                _ => {}
            }
        }
    }
}
