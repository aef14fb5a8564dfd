//! Définition et implémentation des commandes CLI
//!
//! - `inspect`: fiche d'une entité (et d'un élu)
//! - `styles`: export GeoJSON stylé d'une couche
//! - `report`: rapport de chargement des ressources
//! - `session`: mode interactif sur l'entrée standard

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use carte_elus::config::ResourceKind;
use carte_elus::export::export_styled_layer;
use carte_elus::{Command, Config, Datasets, LoadReport, Loader, Session};
use clap::Subcommand;
use territoire::{Filters, Scale, SelectedEntity};
use tracing::{info, warn};

#[derive(Subcommand)]
pub enum Commands {
    /// Show the drawer of a feature (and optionally of one of its officials)
    Inspect {
        /// Scale: 0 (departements), 1 (epci), 2 (communes)
        #[arg(short, long, default_value = "0")]
        scale: Scale,

        /// Feature name, join code (SIREN / INSEE) or #index
        #[arg(short, long)]
        feature: String,

        /// Index of the official row to open (display order)
        #[arg(short, long)]
        elu: Option<usize>,

        /// Highlight features with finance = "oui"
        #[arg(long)]
        finance: bool,

        /// Highlight features with contact = "oui"
        #[arg(long)]
        contact: bool,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Export a layer as GeoJSON with per-feature style and tooltip
    Styles {
        /// Scale: 0 (departements), 1 (epci), 2 (communes)
        #[arg(short, long, default_value = "0")]
        scale: Scale,

        /// Output GeoJSON file
        #[arg(short, long)]
        output: PathBuf,

        /// Highlight features with finance = "oui"
        #[arg(long)]
        finance: bool,

        /// Highlight features with contact = "oui"
        #[arg(long)]
        contact: bool,
    },

    /// Load every resource and print the load report
    Report {
        /// Save the report as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Interactive session on stdin (scale, click, elu, close, finance, contact, list, show, quit)
    Session,
}

/// Charge la configuration: preset ou fichier, puis surcharges d'environnement
pub fn load_config(spec: &str) -> Result<Config> {
    let mut config =
        Config::resolve(spec).with_context(|| format!("Failed to load config '{}'", spec))?;
    config.apply_env_overrides();
    Ok(config)
}

/// Charge les six ressources
async fn load_datasets(config: &Config) -> Result<(Datasets, LoadReport)> {
    let loader = Loader::new(config).context("Failed to build HTTP client")?;
    let (datasets, report) = loader.load_all().await;

    if report.failed_count() > 0 {
        warn!(summary = %report.summary(), "Some resources could not be loaded");
    } else {
        info!(summary = %report.summary(), "All resources loaded");
    }

    Ok((datasets, report))
}

fn new_session(config: &Config, datasets: Datasets) -> Session {
    Session::new(datasets, config.selection.scale_change)
}

#[allow(clippy::too_many_arguments)]
pub async fn cmd_inspect(
    config: &Config,
    scale: Scale,
    feature: &str,
    elu: Option<usize>,
    finance: bool,
    contact: bool,
    json: bool,
) -> Result<()> {
    let (datasets, _report) = load_datasets(config).await?;
    if datasets.directory.collection(scale).is_empty() {
        warn!(resource = %ResourceKind::roster(scale), "No officials loaded for this scale");
    }
    let mut session = new_session(config, datasets);

    session.set_scale(scale);
    session.set_finance_filter(finance);
    session.set_contact_filter(contact);

    let entity = session.click_feature_by(feature)?;
    info!(
        scale = %scale,
        feature,
        elus = entity.elus.as_ref().map(Vec::len),
        "Feature selected"
    );

    if let Some(index) = elu {
        session.click_official(index)?;
    }

    if json {
        let state = session.state();
        let output = serde_json::json!({
            "scale": state.scale(),
            "filters": state.filters(),
            "selected": state.selected_entity().map(SelectedEntity::to_json),
            "entity": session.entity_view(),
            "official": session.official_view(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", session.render_open_drawers());
    }

    Ok(())
}

pub async fn cmd_styles(
    config: &Config,
    scale: Scale,
    output: &Path,
    finance: bool,
    contact: bool,
) -> Result<()> {
    let (datasets, _report) = load_datasets(config).await?;
    let layer = datasets.layer(scale);

    if layer.is_empty() {
        warn!(
            resource = %ResourceKind::geo(scale),
            "Layer is empty, exporting an empty FeatureCollection"
        );
    }

    let written = export_styled_layer(layer, Filters { finance, contact }, output)?;
    println!("{} features written to {}", written, output.display());
    Ok(())
}

pub async fn cmd_report(config: &Config, output: Option<&Path>) -> Result<()> {
    let (_datasets, report) = load_datasets(config).await?;
    report.display();

    if let Some(path) = output {
        report
            .save_to_file(path)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        info!(output = %path.display(), "Report saved");
    }

    Ok(())
}

pub async fn cmd_session(config: &Config) -> Result<()> {
    let (datasets, report) = load_datasets(config).await?;
    println!("{}", report.summary());

    let session = new_session(config, datasets);

    // Lecture bloquante de stdin hors du runtime
    tokio::task::spawn_blocking(move || run_session(session, std::io::stdin().lock(), std::io::stdout()))
        .await
        .context("Session task panicked")?
}

/// Boucle de lecture des commandes
fn run_session<R: BufRead, W: Write>(mut session: Session, input: R, mut output: W) -> Result<()> {
    write!(output, "> ")?;
    output.flush()?;

    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            write!(output, "> ")?;
            output.flush()?;
            continue;
        }

        match line.parse::<Command>() {
            Ok(command) => match session.execute(command) {
                Ok(Some(text)) => writeln!(output, "{}", text)?,
                Ok(None) => break,
                Err(e) => writeln!(output, "Erreur : {:#}", e)?,
            },
            Err(e) => writeln!(output, "Erreur : {}", e)?,
        }

        write!(output, "> ")?;
        output.flush()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use territoire::{GeoFeature, Official, ScaleChangePolicy};

    fn session() -> Session {
        let mut datasets = Datasets::default();
        datasets.set_layer(
            Scale::IntercommunalGroup,
            vec![GeoFeature::from_properties(
                json!({ "nom": "Sète Agglopôle Méditerranée", "code": 200066355 })
                    .as_object()
                    .cloned()
                    .unwrap(),
            )],
        );
        datasets.directory.replace(
            Scale::IntercommunalGroup,
            vec![Official::new("DUPONT", "Marie")
                .with_siren("200066355")
                .with_fonction("Présidente")],
        );
        Session::new(datasets, ScaleChangePolicy::KeepSelection)
    }

    #[test]
    fn test_run_session() {
        let input = "scale 1\nclick 200066355\n\nelu 0\nzoom 4\nelu 7\nquit\nshow\n";
        let mut output = Vec::new();

        run_session(session(), input.as_bytes(), &mut output).unwrap();

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("Échelle : EPCI (1 features)"));
        assert!(text.contains("[0] DUPONT Marie - Présidente"));
        assert!(text.contains("Marie DUPONT"));
        assert!(text.contains("Erreur : Unknown command: 'zoom 4'"));
        assert!(text.contains("Erreur : No official #7"));
        assert!(!text.contains("aucun panneau"), "stops at quit");
    }

    #[test]
    fn test_load_config_unknown_file() {
        assert!(load_config("/nonexistent/carte-elus.json").is_err());
    }
}
