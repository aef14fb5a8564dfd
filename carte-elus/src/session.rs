//! Session interactive: frontière avec la couche de rendu
//!
//! La session expose, pour la couche active: le style et le libellé de
//! chaque feature, un point d'entrée de clic, et les deux fiches à afficher
//! selon l'état des panneaux.

use std::str::FromStr;

use anyhow::{bail, Context, Result};
use territoire::{
    Event, FeatureStyle, GeoFeature, GeoLayer, Official, Properties, Scale, ScaleChangePolicy,
    SelectedEntity, SelectionState,
};
use time::Date;

use crate::loader::Datasets;
use crate::view::{EntityDrawerView, OfficialDrawerView};

/// Commandes du mode interactif
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `scale 1`
    Scale(Scale),
    /// `click <nom|code>` ou `click #<index>`
    Click(String),
    /// `elu 2`
    Official(usize),
    /// `close`
    CloseEntity,
    /// `close-elu`
    CloseOfficial,
    /// `finance on|off`
    Finance(bool),
    /// `contact on|off`
    Contact(bool),
    /// `list`: features de la couche active
    List,
    /// `show`: panneaux ouverts
    Show,
    /// `quit`
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (verb, arg) = match line.split_once(char::is_whitespace) {
            Some((verb, arg)) => (verb, arg.trim()),
            None => (line, ""),
        };

        let switch = |arg: &str| match arg {
            "on" | "oui" | "true" | "1" => Ok(true),
            "off" | "non" | "false" | "0" => Ok(false),
            _ => Err(format!("Expected on/off, got '{}'", arg)),
        };

        match verb {
            "scale" | "echelle" => arg.parse().map(Command::Scale),
            "click" if !arg.is_empty() => Ok(Command::Click(arg.to_string())),
            "elu" => arg
                .parse()
                .map(Command::Official)
                .map_err(|_| format!("Invalid official index: '{}'", arg)),
            "close" => Ok(Command::CloseEntity),
            "close-elu" => Ok(Command::CloseOfficial),
            "finance" => switch(arg).map(Command::Finance),
            "contact" => switch(arg).map(Command::Contact),
            "list" => Ok(Command::List),
            "show" => Ok(Command::Show),
            "quit" | "exit" => Ok(Command::Quit),
            _ => Err(format!("Unknown command: '{}'", line)),
        }
    }
}

/// Données chargées + état de la sélection
pub struct Session {
    datasets: Datasets,
    state: SelectionState,
    today: Date,
}

impl Session {
    /// Crée une session sur les données chargées
    pub fn new(datasets: Datasets, policy: ScaleChangePolicy) -> Self {
        Self {
            datasets,
            state: SelectionState::with_policy(policy),
            today: territoire::date::today(),
        }
    }

    /// Fixe la date de référence pour le calcul des âges
    pub fn with_today(mut self, today: Date) -> Self {
        self.today = today;
        self
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn datasets(&self) -> &Datasets {
        &self.datasets
    }

    /// Couche de l'échelle active
    pub fn active_layer(&self) -> &GeoLayer {
        self.datasets.layer(self.state.scale())
    }

    /// Transmet un événement à la machine d'état
    fn dispatch(&mut self, event: Event) {
        self.state.apply(event, &self.datasets.directory);
    }

    pub fn set_scale(&mut self, scale: Scale) {
        self.dispatch(Event::SetScale(scale));
    }

    pub fn set_finance_filter(&mut self, active: bool) {
        self.dispatch(Event::SetFinanceFilter(active));
    }

    pub fn set_contact_filter(&mut self, active: bool) {
        self.dispatch(Event::SetContactFilter(active));
    }

    /// Style d'une feature de la couche active
    pub fn style_of(&self, feature: &GeoFeature) -> FeatureStyle {
        self.state.style_for(&feature.properties)
    }

    /// Libellé de survol d'une feature
    pub fn tooltip_of(&self, feature: &GeoFeature) -> Option<String> {
        feature.label()
    }

    /// Clic sur la n-ième feature de la couche active
    pub fn click_feature(&mut self, index: usize) -> Result<&SelectedEntity> {
        let layer = self.datasets.layer(self.state.scale());
        let properties = layer
            .features
            .get(index)
            .map(|feature| feature.properties.clone())
            .with_context(|| {
                format!(
                    "No feature #{} in layer {} ({} features)",
                    index,
                    layer.scale,
                    layer.len()
                )
            })?;

        self.select(properties)
    }

    /// Clic sur une feature désignée par code ou par nom
    pub fn click_feature_by(&mut self, query: &str) -> Result<&SelectedEntity> {
        if let Some(index) = query.strip_prefix('#') {
            let index = index
                .parse()
                .with_context(|| format!("Invalid feature index: {}", query))?;
            return self.click_feature(index);
        }

        let layer = self.datasets.layer(self.state.scale());
        let Some((_, feature)) = layer.find(query) else {
            bail!("No feature matching '{}' in layer {}", query, layer.scale);
        };
        let properties = feature.properties.clone();

        self.select(properties)
    }

    fn select(&mut self, properties: Properties) -> Result<&SelectedEntity> {
        self.dispatch(Event::ClickFeature(properties));
        self.state
            .selected_entity()
            .context("Click did not select an entity")
    }

    /// Clic sur la n-ième ligne de la fiche de l'entité
    pub fn click_official(&mut self, index: usize) -> Result<&Official> {
        if self.state.selected_entity().is_none() {
            bail!("No entity selected");
        }

        self.state
            .click_official_at(index, &self.datasets.directory)
            .with_context(|| format!("No official #{} for the selected entity", index))
    }

    pub fn close_entity_drawer(&mut self) {
        self.dispatch(Event::CloseEntityDrawer);
    }

    pub fn close_official_drawer(&mut self) {
        self.dispatch(Event::CloseOfficialDrawer);
    }

    /// Fiche de l'entité, si son panneau est ouvert
    pub fn entity_view(&self) -> Option<EntityDrawerView> {
        if !self.state.is_entity_drawer_open() {
            return None;
        }
        let entity = self.state.selected_entity()?;
        Some(EntityDrawerView::build(
            entity,
            self.state.scale(),
            &self.datasets.directory,
        ))
    }

    /// Fiche de l'élu, si son panneau est ouvert
    pub fn official_view(&self) -> Option<OfficialDrawerView> {
        if !self.state.is_official_drawer_open() {
            return None;
        }
        let official = self.state.selected_official()?;
        Some(OfficialDrawerView::build(
            official,
            self.state.selected_entity(),
            self.state.scale(),
            self.today,
        ))
    }

    /// Exécute une commande et renvoie le texte à afficher.
    ///
    /// `Ok(None)` signale la fin de session.
    pub fn execute(&mut self, command: Command) -> Result<Option<String>> {
        let output = match command {
            Command::Scale(scale) => {
                self.set_scale(scale);
                format!(
                    "Échelle : {} ({} features)",
                    scale,
                    self.active_layer().len()
                )
            }
            Command::Click(query) => {
                self.click_feature_by(&query)?;
                self.render_open_drawers()
            }
            Command::Official(index) => {
                self.click_official(index)?;
                self.render_open_drawers()
            }
            Command::CloseEntity => {
                self.close_entity_drawer();
                self.render_open_drawers()
            }
            Command::CloseOfficial => {
                self.close_official_drawer();
                self.render_open_drawers()
            }
            Command::Finance(active) => {
                self.set_finance_filter(active);
                format!("Finance : {}", if active { "on" } else { "off" })
            }
            Command::Contact(active) => {
                self.set_contact_filter(active);
                format!("Contact : {}", if active { "on" } else { "off" })
            }
            Command::List => self.render_layer(),
            Command::Show => self.render_open_drawers(),
            Command::Quit => return Ok(None),
        };

        Ok(Some(output))
    }

    /// Liste des features de la couche active avec leur couleur
    pub fn render_layer(&self) -> String {
        let layer = self.active_layer();
        let mut out = format!("{} ({} features)\n", layer.scale, layer.len());
        for (index, feature) in layer.features.iter().enumerate() {
            let style = self.style_of(feature);
            let label = self.tooltip_of(feature).unwrap_or_default();
            let key = layer
                .scale
                .join_key(&feature.properties)
                .map(|k| format!(" ({})", k))
                .unwrap_or_default();
            out.push_str(&format!("  #{} {}{} {}\n", index, label, key, style.color));
        }
        out
    }

    /// Rendu texte des panneaux ouverts
    pub fn render_open_drawers(&self) -> String {
        let mut out = String::new();
        if let Some(view) = self.entity_view() {
            out.push_str(&view.to_string());
        }
        if let Some(view) = self.official_view() {
            if !out.is_empty() {
                out.push_str(&format!("\n{}\n", "-".repeat(40)));
            }
            out.push_str(&view.to_string());
        }
        if out.is_empty() {
            out.push_str("(aucun panneau ouvert)");
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use territoire::Official;
    use time::macros::date;

    fn feature(value: serde_json::Value) -> GeoFeature {
        GeoFeature::from_properties(value.as_object().cloned().unwrap())
    }

    fn session() -> Session {
        let mut datasets = Datasets::default();
        datasets.set_layer(
            Scale::Commune,
            vec![
                feature(json!({ "nom": "Sète", "INSEE_COM": "34301", "finance": "oui" })),
                feature(json!({ "nom": "Montpellier", "INSEE_COM": "34172", "contact": "oui" })),
            ],
        );
        datasets.directory.replace(
            Scale::Commune,
            vec![
                Official::new("DURAND", "Luc")
                    .with_code_commune("34301")
                    .with_date_naissance("14/07/1958"),
                Official::new("PETIT", "Anne")
                    .with_code_commune("34301")
                    .with_fonction("Maire"),
            ],
        );
        Session::new(datasets, ScaleChangePolicy::KeepSelection).with_today(date!(2024 - 07 - 14))
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!("scale 2".parse(), Ok(Command::Scale(Scale::Commune)));
        assert_eq!("scale epci".parse(), Ok(Command::Scale(Scale::IntercommunalGroup)));
        assert_eq!("click Sète".parse(), Ok(Command::Click("Sète".into())));
        assert_eq!(
            "click  Saint-Jean de Védas ".parse(),
            Ok(Command::Click("Saint-Jean de Védas".into()))
        );
        assert_eq!("elu 1".parse(), Ok(Command::Official(1)));
        assert_eq!("finance on".parse(), Ok(Command::Finance(true)));
        assert_eq!("contact off".parse(), Ok(Command::Contact(false)));
        assert_eq!("close-elu".parse(), Ok(Command::CloseOfficial));
        assert_eq!("quit".parse(), Ok(Command::Quit));
        assert!("click".parse::<Command>().is_err());
        assert!("elu deux".parse::<Command>().is_err());
        assert!("finance peut-être".parse::<Command>().is_err());
        assert!("zoom 3".parse::<Command>().is_err());
    }

    #[test]
    fn test_click_by_name_and_code() {
        let mut session = session();
        session.set_scale(Scale::Commune);

        let entity = session.click_feature_by("34301").unwrap();
        assert_eq!(entity.elus.as_ref().map(Vec::len), Some(2));

        let entity = session.click_feature_by("montpellier").unwrap();
        assert_eq!(entity.elus, Some(vec![]));
        assert!(session.state().is_entity_drawer_open());

        let entity = session.click_feature_by("#0").unwrap();
        assert_eq!(entity.title(), Some("Sète".into()));

        assert!(session.click_feature_by("Lunel").is_err());
        assert!(session.click_feature(9).is_err());
    }

    #[test]
    fn test_click_official_and_views() {
        let mut session = session();
        session.set_scale(Scale::Commune);

        assert!(session.click_official(0).is_err());
        session.click_feature_by("Sète").unwrap();

        let official = session.click_official(1).unwrap();
        assert_eq!(official.nom, "DURAND");

        let entity_view = session.entity_view().unwrap();
        assert_eq!(entity_view.officials[0].name, "PETIT Anne");

        let official_view = session.official_view().unwrap();
        assert_eq!(official_view.header, "Sète");
        assert_eq!(official_view.to_string().lines().nth(1), Some("Luc DURAND"));

        session.close_official_drawer();
        assert!(session.official_view().is_none());
        session.close_entity_drawer();
        assert!(session.entity_view().is_none());
        assert_eq!(session.render_open_drawers(), "(aucun panneau ouvert)");
    }

    #[test]
    fn test_styles_follow_filters() {
        let mut session = session();
        session.set_scale(Scale::Commune);
        let layer = session.active_layer().clone();

        assert_eq!(session.style_of(&layer.features[0]).color, "#9747FF");

        session.set_finance_filter(true);
        session.set_contact_filter(true);
        assert_eq!(session.style_of(&layer.features[0]).color, "#00FF00");
        assert_eq!(session.style_of(&layer.features[1]).color, "#FF0000");
        assert_eq!(
            session.tooltip_of(&layer.features[1]),
            Some("Montpellier".into())
        );
    }

    #[test]
    fn test_execute_flow() {
        let mut session = session();

        let out = session.execute(Command::Scale(Scale::Commune)).unwrap().unwrap();
        assert!(out.contains("Communes (2 features)"));

        let out = session.execute(Command::Click("Sète".into())).unwrap().unwrap();
        assert!(out.contains("[0] PETIT Anne - Maire"));

        let out = session.execute(Command::Official(1)).unwrap().unwrap();
        assert!(out.contains("Age : 66 ans"));

        let out = session.execute(Command::List).unwrap().unwrap();
        assert!(out.contains("#1 Montpellier (34172)"));

        assert!(session.execute(Command::Click("Lunel".into())).is_err());
        assert_eq!(session.execute(Command::Quit).unwrap(), None);
    }

    #[test]
    fn test_reset_policy_applies_through_session() {
        let datasets = session().datasets().clone();
        let mut session = Session::new(datasets, ScaleChangePolicy::ResetSelection);

        session.set_scale(Scale::Commune);
        session.click_feature_by("Sète").unwrap();
        session.click_official(0).unwrap();
        assert!(session.state().is_official_drawer_open());

        session.set_scale(Scale::IntercommunalGroup);
        assert!(session.state().selected_entity().is_none());
        assert!(session.state().selected_official().is_none());
        assert!(session.entity_view().is_none());
    }

    #[test]
    fn test_empty_datasets_tolerated() {
        let mut session = Session::new(Datasets::default(), ScaleChangePolicy::KeepSelection);
        for scale in Scale::ALL {
            session.set_scale(scale);
            assert!(session.active_layer().is_empty());
            assert!(session.click_feature_by("34172").is_err());
        }
        assert_eq!(session.render_open_drawers(), "(aucun panneau ouvert)");
    }
}
