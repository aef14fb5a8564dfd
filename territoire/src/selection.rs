//! Machine d'état de la sélection
//!
//! Seul propriétaire de l'état d'interface: échelle active, entité et élu
//! sélectionnés, ouverture des deux panneaux, filtres. Toute modification
//! passe par une transition explicite.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classify::{style_for, FeatureStyle, Filters};
use crate::directory::OfficialDirectory;
use crate::merge::{merge_on_click, SelectedEntity};
use crate::official::Official;
use crate::scale::Scale;
use crate::types::Properties;

/// Effet d'un changement d'échelle sur la sélection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScaleChangePolicy {
    /// Sélection et panneaux conservés (comportement historique)
    #[default]
    #[serde(rename = "keep")]
    KeepSelection,
    /// Panneaux fermés et sélection effacée
    #[serde(rename = "reset")]
    ResetSelection,
}

/// Événements d'interface
#[derive(Debug, Clone)]
pub enum Event {
    SetScale(Scale),
    ClickFeature(Properties),
    CloseEntityDrawer,
    ClickOfficial(Official),
    CloseOfficialDrawer,
    SetFinanceFilter(bool),
    SetContactFilter(bool),
}

/// État de la sélection
#[derive(Debug, Clone, Default, Serialize)]
pub struct SelectionState {
    scale: Scale,
    entity_drawer_open: bool,
    official_drawer_open: bool,
    selected_entity: Option<SelectedEntity>,
    selected_official: Option<Official>,
    filters: Filters,
    #[serde(skip)]
    policy: ScaleChangePolicy,
}

impl SelectionState {
    /// État initial: départements, panneaux fermés, rien de sélectionné
    pub fn new() -> Self {
        Self::default()
    }

    /// État initial avec une politique de changement d'échelle
    pub fn with_policy(policy: ScaleChangePolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn scale(&self) -> Scale {
        self.scale
    }

    pub fn filters(&self) -> Filters {
        self.filters
    }

    pub fn policy(&self) -> ScaleChangePolicy {
        self.policy
    }

    pub fn is_entity_drawer_open(&self) -> bool {
        self.entity_drawer_open
    }

    pub fn is_official_drawer_open(&self) -> bool {
        self.official_drawer_open
    }

    pub fn selected_entity(&self) -> Option<&SelectedEntity> {
        self.selected_entity.as_ref()
    }

    pub fn selected_official(&self) -> Option<&Official> {
        self.selected_official.as_ref()
    }

    /// Change l'échelle active.
    ///
    /// Avec [`ScaleChangePolicy::KeepSelection`], une entité d'une autre
    /// échelle peut rester affichée.
    pub fn set_scale(&mut self, scale: Scale) {
        debug!(from = %self.scale, to = %scale, policy = ?self.policy, "set_scale");
        self.scale = scale;

        if self.policy == ScaleChangePolicy::ResetSelection {
            self.entity_drawer_open = false;
            self.official_drawer_open = false;
            self.selected_entity = None;
            self.selected_official = None;
        }
    }

    /// Clic sur une feature: fusion avec les élus et ouverture du panneau
    pub fn click_feature(
        &mut self,
        properties: &Properties,
        directory: &OfficialDirectory,
    ) -> &SelectedEntity {
        let entity = merge_on_click(self.scale, properties, directory);
        debug!(
            scale = %self.scale,
            title = ?entity.title(),
            elus = entity.elus.as_ref().map(Vec::len),
            "click_feature"
        );

        self.entity_drawer_open = true;
        self.selected_entity.insert(entity)
    }

    /// Ferme le panneau de l'entité, sans effacer la sélection
    pub fn close_entity_drawer(&mut self) {
        debug!("close_entity_drawer");
        self.entity_drawer_open = false;
    }

    /// Clic sur une ligne d'élu
    pub fn click_official(&mut self, official: Official) {
        debug!(official = %official.display_name(), "click_official");
        self.selected_official = Some(official);
        self.official_drawer_open = true;
    }

    /// Clic sur la n-ième ligne du panneau de l'entité (ordre d'affichage).
    ///
    /// Renvoie `None` sans changer l'état si aucune entité n'est sélectionnée
    /// ou si l'index dépasse la liste.
    pub fn click_official_at(
        &mut self,
        index: usize,
        directory: &OfficialDirectory,
    ) -> Option<&Official> {
        let official = self
            .selected_entity
            .as_ref()?
            .drawer_officials(directory)
            .get(index)
            .map(|o| (*o).clone())?;

        self.click_official(official);
        self.selected_official.as_ref()
    }

    /// Ferme le panneau de l'élu, sans effacer la sélection
    pub fn close_official_drawer(&mut self) {
        debug!("close_official_drawer");
        self.official_drawer_open = false;
    }

    pub fn set_finance_filter(&mut self, active: bool) {
        debug!(active, "set_finance_filter");
        self.filters.finance = active;
    }

    pub fn set_contact_filter(&mut self, active: bool) {
        debug!(active, "set_contact_filter");
        self.filters.contact = active;
    }

    /// Applique un événement d'interface
    pub fn apply(&mut self, event: Event, directory: &OfficialDirectory) {
        match event {
            Event::SetScale(scale) => self.set_scale(scale),
            Event::ClickFeature(properties) => {
                self.click_feature(&properties, directory);
            }
            Event::CloseEntityDrawer => self.close_entity_drawer(),
            Event::ClickOfficial(official) => self.click_official(official),
            Event::CloseOfficialDrawer => self.close_official_drawer(),
            Event::SetFinanceFilter(active) => self.set_finance_filter(active),
            Event::SetContactFilter(active) => self.set_contact_filter(active),
        }
    }

    /// Style d'une feature à l'échelle et avec les filtres courants
    pub fn style_for(&self, properties: &Properties) -> FeatureStyle {
        style_for(self.scale, properties, self.filters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn directory() -> OfficialDirectory {
        OfficialDirectory::new(
            vec![Official::new("DEP", "Elu")],
            vec![
                Official::new("DUPONT", "Marie")
                    .with_siren("200011773")
                    .with_fonction("Président"),
                Official::new("MARTIN", "Paul").with_siren("200011773"),
            ],
            vec![],
        )
    }

    fn props(value: serde_json::Value) -> Properties {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_initial_state() {
        let state = SelectionState::new();
        assert_eq!(state.scale(), Scale::Department);
        assert!(!state.is_entity_drawer_open());
        assert!(!state.is_official_drawer_open());
        assert!(state.selected_entity().is_none());
        assert!(state.selected_official().is_none());
        assert_eq!(state.filters(), Filters::default());
        assert_eq!(state.policy(), ScaleChangePolicy::KeepSelection);
    }

    #[test]
    fn test_click_commune_without_officials_opens_drawer() {
        let mut state = SelectionState::new();
        state.set_scale(Scale::Commune);
        let entity = state.click_feature(
            &props(json!({ "nom": "Montpellier", "INSEE_COM": "34172" })),
            &directory(),
        );

        assert_eq!(entity.elus, Some(vec![]));
        assert!(state.is_entity_drawer_open());
    }

    #[test]
    fn test_close_entity_drawer_keeps_selection() {
        let mut state = SelectionState::new();
        state.click_feature(&props(json!({ "nom": "Hérault" })), &directory());
        state.close_entity_drawer();

        assert!(!state.is_entity_drawer_open());
        assert_eq!(
            state.selected_entity().and_then(|e| e.title()),
            Some("Hérault".into())
        );
    }

    #[test]
    fn test_scale_change_keeps_stale_selection() {
        let mut state = SelectionState::new();
        state.set_scale(Scale::IntercommunalGroup);
        state.click_feature(
            &props(json!({ "nom": "Sète Agglopôle", "code": "200011773" })),
            &directory(),
        );
        state.set_scale(Scale::Commune);

        assert_eq!(state.scale(), Scale::Commune);
        assert!(state.is_entity_drawer_open());
        let entity = state.selected_entity().unwrap();
        assert_eq!(entity.scale, Scale::IntercommunalGroup);
        assert_eq!(entity.elus.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn test_scale_change_reset_policy() {
        let dir = directory();
        let mut state = SelectionState::with_policy(ScaleChangePolicy::ResetSelection);
        state.click_feature(&props(json!({ "nom": "Hérault" })), &dir);
        state.click_official_at(0, &dir);
        state.set_scale(Scale::Commune);

        assert!(!state.is_entity_drawer_open());
        assert!(!state.is_official_drawer_open());
        assert!(state.selected_entity().is_none());
        assert!(state.selected_official().is_none());
    }

    #[test]
    fn test_click_official_at_uses_display_order() {
        let dir = directory();
        let mut state = SelectionState::new();
        state.set_scale(Scale::IntercommunalGroup);
        state.click_feature(&props(json!({ "code": 200011773 })), &dir);

        let official = state.click_official_at(0, &dir).unwrap();
        assert_eq!(official.nom, "DUPONT");
        assert!(state.is_official_drawer_open());

        assert!(state.click_official_at(5, &dir).is_none());
        assert_eq!(state.selected_official().unwrap().nom, "DUPONT");
    }

    #[test]
    fn test_click_official_without_entity() {
        let mut state = SelectionState::new();
        assert!(state.click_official_at(0, &directory()).is_none());

        state.click_official(Official::new("LIBRE", "Elu"));
        assert!(state.is_official_drawer_open());
        assert!(state.selected_entity().is_none());
    }

    #[test]
    fn test_close_official_drawer_keeps_selection() {
        let mut state = SelectionState::new();
        state.click_official(Official::new("DUPONT", "Marie"));
        state.close_official_drawer();

        assert!(!state.is_official_drawer_open());
        assert_eq!(state.selected_official().unwrap().nom, "DUPONT");
    }

    #[test]
    fn test_apply_events() {
        let dir = directory();
        let mut state = SelectionState::new();

        state.apply(Event::SetScale(Scale::IntercommunalGroup), &dir);
        state.apply(Event::SetFinanceFilter(true), &dir);
        state.apply(Event::SetContactFilter(true), &dir);
        state.apply(
            Event::ClickFeature(props(json!({ "code": "200011773", "finance": "oui" }))),
            &dir,
        );
        state.apply(Event::ClickOfficial(Official::new("MARTIN", "Paul")), &dir);
        state.apply(Event::CloseOfficialDrawer, &dir);
        state.apply(Event::CloseEntityDrawer, &dir);

        assert_eq!(state.scale(), Scale::IntercommunalGroup);
        assert!(state.filters().finance && state.filters().contact);
        assert!(!state.is_entity_drawer_open());
        assert!(!state.is_official_drawer_open());

        let entity = state.selected_entity().unwrap();
        assert_eq!(state.style_for(&entity.properties).color, "#00FF00");
    }

    #[test]
    fn test_new_click_replaces_entity() {
        let dir = directory();
        let mut state = SelectionState::new();
        state.click_feature(&props(json!({ "nom": "Hérault" })), &dir);
        state.click_feature(&props(json!({ "nom": "Gard" })), &dir);
        assert_eq!(
            state.selected_entity().and_then(|e| e.title()),
            Some("Gard".into())
        );
    }
}
