//! Chargement des six ressources (trois couches GeoJSON, trois listes d'élus)
//!
//! Les ressources sont récupérées en parallèle, sans ordre garanti et sans
//! nouvel essai. Chaque ressource produit un [`LoadOutcome`]: une ressource en
//! échec laisse une collection vide, l'échec est journalisé et consigné dans
//! le rapport de chargement.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use bytes::Bytes;
use futures::future::join_all;
use territoire::{
    parse_feature_collection, parse_roster, GeoFeature, GeoLayer, OfficialDirectory, Roster,
    Scale, TerritoireError,
};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{Config, Location, ResourceConfig, ResourceKind};
use crate::report::LoadReport;

/// Erreurs de récupération d'une ressource
#[derive(Debug, Error)]
pub enum FetchError {
    /// Requête HTTP impossible
    #[error("HTTP request failed for {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Réponse HTTP en erreur
    #[error("HTTP {status} for {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    /// Délai dépassé
    #[error("Timed out fetching {url}")]
    Timeout { url: String },

    /// Lecture d'un fichier local impossible
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Contenu illisible
    #[error("Decode error: {0}")]
    Decode(#[from] TerritoireError),
}

/// Issue du chargement d'une ressource
#[derive(Debug)]
pub enum LoadOutcome<T> {
    /// Chargée avec au moins un enregistrement
    Loaded(T),
    /// Chargée mais vide
    Empty,
    /// En échec: la collection reste vide
    Failed(FetchError),
}

/// Données disponibles pour la session
#[derive(Debug, Clone)]
pub struct Datasets {
    departements: GeoLayer,
    epci: GeoLayer,
    communes: GeoLayer,
    pub directory: OfficialDirectory,
}

impl Default for Datasets {
    fn default() -> Self {
        Self {
            departements: GeoLayer::empty(Scale::Department),
            epci: GeoLayer::empty(Scale::IntercommunalGroup),
            communes: GeoLayer::empty(Scale::Commune),
            directory: OfficialDirectory::default(),
        }
    }
}

impl Datasets {
    /// Couche d'une échelle
    pub fn layer(&self, scale: Scale) -> &GeoLayer {
        match scale {
            Scale::Department => &self.departements,
            Scale::IntercommunalGroup => &self.epci,
            Scale::Commune => &self.communes,
        }
    }

    /// Remplace la couche d'une échelle
    pub fn set_layer(&mut self, scale: Scale, features: Vec<GeoFeature>) {
        let layer = GeoLayer::new(scale, features);
        match scale {
            Scale::Department => self.departements = layer,
            Scale::IntercommunalGroup => self.epci = layer,
            Scale::Commune => self.communes = layer,
        }
    }
}

/// Contenu décodé d'une ressource
#[derive(Debug)]
enum Payload {
    Geo(Vec<GeoFeature>),
    Roster(Roster),
}

impl Payload {
    fn records(&self) -> usize {
        match self {
            Payload::Geo(features) => features.len(),
            Payload::Roster(roster) => roster.officials.len(),
        }
    }
}

/// Résultat brut du chargement d'une ressource
#[derive(Debug)]
struct ResourceLoad {
    kind: ResourceKind,
    location: Location,
    outcome: LoadOutcome<Payload>,
    bytes: usize,
    checksum: Option<String>,
}

/// Client de chargement
pub struct Loader {
    client: reqwest::Client,
    resources: ResourceConfig,
}

impl Loader {
    /// Crée un chargeur à partir de la configuration
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.http.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            resources: config.resources.clone(),
        })
    }

    /// Récupère le contenu brut d'une ressource
    pub async fn fetch(&self, kind: ResourceKind) -> Result<Bytes, FetchError> {
        match self.resources.location(kind) {
            Location::Url(url) => self.fetch_url(&url).await,
            Location::Path(path) => match tokio::fs::read(&path).await {
                Ok(data) => Ok(Bytes::from(data)),
                Err(source) => Err(FetchError::Io { path, source }),
            },
        }
    }

    async fn fetch_url(&self, url: &str) -> Result<Bytes, FetchError> {
        let map_err = |source: reqwest::Error| {
            if source.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                }
            } else {
                FetchError::Http {
                    url: url.to_string(),
                    source,
                }
            }
        };

        let resp = self.client.get(url).send().await.map_err(map_err)?;

        if !resp.status().is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: resp.status(),
            });
        }

        resp.bytes().await.map_err(map_err)
    }

    /// Charge et décode une ressource, sans jamais échouer
    async fn load_one(&self, kind: ResourceKind) -> ResourceLoad {
        let location = self.resources.location(kind);

        let data = match self.fetch(kind).await {
            Ok(data) => data,
            Err(e) => {
                warn!(resource = %kind, location = %location, error = %e, "Resource unavailable, using empty collection");
                return ResourceLoad {
                    kind,
                    location,
                    outcome: LoadOutcome::Failed(e),
                    bytes: 0,
                    checksum: None,
                };
            }
        };

        let checksum = hex::encode(blake3::hash(&data).as_bytes());

        let decoded = if kind.is_geo() {
            parse_feature_collection(&data, kind.name()).map(Payload::Geo)
        } else {
            parse_roster(&data, kind.name()).map(Payload::Roster)
        };

        let outcome = match decoded {
            Ok(payload) if payload.records() == 0 => {
                warn!(resource = %kind, "Resource loaded but empty");
                LoadOutcome::Empty
            }
            Ok(payload) => {
                info!(resource = %kind, records = payload.records(), "Resource loaded");
                LoadOutcome::Loaded(payload)
            }
            Err(e) => {
                warn!(resource = %kind, location = %location, error = %e, "Resource unreadable, using empty collection");
                LoadOutcome::Failed(FetchError::Decode(e))
            }
        };

        ResourceLoad {
            kind,
            location,
            outcome,
            bytes: data.len(),
            checksum: Some(checksum),
        }
    }

    /// Charge les six ressources en parallèle
    pub async fn load_all(&self) -> (Datasets, LoadReport) {
        let start = Instant::now();
        let mut report = LoadReport::new();

        let loads = join_all(ResourceKind::ALL.into_iter().map(|kind| self.load_one(kind))).await;

        let mut datasets = Datasets::default();
        for load in loads {
            let location = load.location.to_string();
            match load.outcome {
                LoadOutcome::Loaded(payload) => {
                    let records = payload.records();
                    let (skipped, incomplete) = match payload {
                        Payload::Geo(features) => {
                            datasets.set_layer(load.kind.scale(), features);
                            (Vec::new(), Vec::new())
                        }
                        Payload::Roster(roster) => {
                            datasets
                                .directory
                                .replace(load.kind.scale(), roster.officials);
                            (roster.skipped, roster.incomplete)
                        }
                    };
                    report.record_loaded(
                        load.kind,
                        &location,
                        records,
                        load.bytes,
                        load.checksum,
                    );
                    for error in &skipped {
                        report.record_skipped_row(load.kind, error);
                    }
                    for warning in &incomplete {
                        report.record_incomplete_row(load.kind, warning);
                    }
                }
                LoadOutcome::Empty => {
                    report.record_empty(load.kind, &location, load.bytes, load.checksum);
                }
                LoadOutcome::Failed(e) => {
                    report.record_failure(load.kind, &location, &e.to_string());
                }
            }
        }

        report.set_duration(start.elapsed());
        report.finalize();

        info!(
            status = ?report.status,
            records = report.total_records(),
            failed = report.failed_count(),
            "Datasets loaded"
        );

        (datasets, report)
    }
}
