//! Panneaux d'affichage: fiche de l'entité et fiche de l'élu
//!
//! Les vues sont des modèles prêts à afficher, sérialisables en JSON et
//! rendus en texte par `Display`.

use std::fmt;

use serde::Serialize;
use territoire::{age_status, AgeStatus, Official, OfficialDirectory, Scale, SelectedEntity};
use time::Date;

/// Champs d'adresse, dans l'ordre d'affichage
const ADDRESS_KEYS: &[&str] = &["lieu", "lieu_deux", "lieu_trois", "lieu_quatre"];

/// Ligne cliquable de la liste des élus
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OfficialRow {
    /// Position dans l'ordre d'affichage
    pub index: usize,
    /// "Nom Prénom"
    pub name: String,
    /// Libellé de fonction, vide si absent
    pub fonction: String,
}

/// Bloc contact de l'entité
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContactBlock {
    pub telephone: Option<String>,
    pub site_web: Option<String>,
    pub email: Option<String>,
}

impl ContactBlock {
    fn is_empty(&self) -> bool {
        self.telephone.is_none() && self.site_web.is_none() && self.email.is_none()
    }
}

/// Fiche de l'entité sélectionnée
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityDrawerView {
    pub title: String,
    pub population: Option<String>,
    /// Lignes d'adresse (bloc absent si vide)
    pub address: Vec<String>,
    /// Bloc contact (absent si aucun champ)
    pub contact: Option<ContactBlock>,
    pub officials: Vec<OfficialRow>,
}

impl EntityDrawerView {
    /// Construit la fiche.
    ///
    /// Le titre de repli dépend de l'échelle active; la liste des élus est
    /// celle de l'entité, dans l'ordre d'affichage.
    pub fn build(entity: &SelectedEntity, scale: Scale, directory: &OfficialDirectory) -> Self {
        let title = entity
            .title()
            .unwrap_or_else(|| scale.placeholder_title().to_string());

        let address = ADDRESS_KEYS
            .iter()
            .filter_map(|key| entity.property(key))
            .collect();

        let contact = ContactBlock {
            telephone: entity.property("telephone"),
            site_web: entity.property("site_web"),
            email: entity.property("email"),
        };

        let officials = entity
            .drawer_officials(directory)
            .into_iter()
            .enumerate()
            .map(|(index, official)| OfficialRow {
                index,
                name: official.display_name(),
                fonction: official.fonction.clone().unwrap_or_default(),
            })
            .collect();

        Self {
            title,
            population: entity.property("population"),
            address,
            contact: (!contact.is_empty()).then_some(contact),
            officials,
        }
    }
}

impl fmt::Display for EntityDrawerView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(
            f,
            "{} habitants",
            self.population.as_deref().unwrap_or_default()
        )?;

        if !self.address.is_empty() {
            writeln!(f)?;
            writeln!(f, "Adresse :")?;
            for line in &self.address {
                writeln!(f, "  {}", line)?;
            }
        }

        if let Some(contact) = &self.contact {
            writeln!(f)?;
            writeln!(f, "Contact")?;
            if let Some(telephone) = &contact.telephone {
                writeln!(f, "  Tél. {}", telephone)?;
            }
            if let Some(site_web) = &contact.site_web {
                writeln!(f, "  Web  {}", site_web)?;
            }
            if let Some(email) = &contact.email {
                writeln!(f, "  Mail mailto:{}", email)?;
            }
        }

        writeln!(f)?;
        writeln!(f, "Élus")?;
        for row in &self.officials {
            if row.fonction.is_empty() {
                writeln!(f, "  [{}] {}", row.index, row.name)?;
            } else {
                writeln!(f, "  [{}] {} - {}", row.index, row.name, row.fonction)?;
            }
        }

        Ok(())
    }
}

/// Fiche de l'élu sélectionné
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OfficialDrawerView {
    /// Rappel de l'entité ("Département : Hérault")
    pub header: String,
    /// "Prénom Nom"
    pub name: String,
    pub fonction: Option<String>,
    pub delegation: Option<String>,
    pub age: AgeStatus,
    pub csp: String,
    pub debut_mandat: String,
}

impl OfficialDrawerView {
    /// Construit la fiche de l'élu à la date `today`
    pub fn build(
        official: &Official,
        entity: Option<&SelectedEntity>,
        scale: Scale,
        today: Date,
    ) -> Self {
        let entity_name = entity
            .and_then(SelectedEntity::title)
            .unwrap_or_else(|| scale.placeholder_title().to_string());

        let header = match scale {
            Scale::Department => format!("Département : {}", entity_name),
            Scale::IntercommunalGroup | Scale::Commune => entity_name,
        };

        Self {
            header,
            name: official.full_name(),
            fonction: official.fonction.clone(),
            delegation: official.delegation.clone(),
            age: age_status(official.date_naissance.as_deref(), today),
            csp: official.categorie_socio_pro.clone().unwrap_or_default(),
            debut_mandat: official.debut_mandat.clone().unwrap_or_default(),
        }
    }
}

impl fmt::Display for OfficialDrawerView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.header)?;
        writeln!(f, "{}", self.name)?;
        writeln!(f)?;
        if let Some(fonction) = &self.fonction {
            writeln!(f, "Fonction : {}", fonction)?;
        }
        if let Some(delegation) = &self.delegation {
            writeln!(f, "Délégation : {}", delegation)?;
        }
        writeln!(f, "{}", self.age)?;
        writeln!(f, "CSP : {}", self.csp)?;
        writeln!(f, "Date de début du mandat : {}", self.debut_mandat)
    }
}
