//! Dates de naissance et calcul d'âge
//!
//! Les listes d'élus fournissent les dates au format français `JJ/MM/AAAA`.
//! Toute autre forme est tentée telle quelle (année seule, ISO 8601, RFC 3339).

use std::fmt;

use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, Month, OffsetDateTime, PrimitiveDateTime};

/// Résultat du décodage d'une date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedDate {
    Valid(Date),
    Invalid,
}

impl ParsedDate {
    pub fn is_valid(&self) -> bool {
        matches!(self, ParsedDate::Valid(_))
    }

    pub fn date(self) -> Option<Date> {
        match self {
            ParsedDate::Valid(date) => Some(date),
            ParsedDate::Invalid => None,
        }
    }
}

/// Décode une date `JJ/MM/AAAA`, sinon tente la chaîne brute.
///
/// Une date sans existence calendaire (`31/02/2000`) est invalide.
pub fn parse_french_date(s: &str) -> ParsedDate {
    let s = s.trim();
    let parts: Vec<&str> = s.split('/').collect();

    if let [day, month, year] = parts.as_slice() {
        return from_day_month_year(day, month, year);
    }

    parse_raw(s)
}

fn from_day_month_year(day: &str, month: &str, year: &str) -> ParsedDate {
    let (Some(day), Some(month), Some(year)) = (
        numeric_component(day, 1, 2),
        numeric_component(month, 1, 2),
        numeric_component(year, 4, 4),
    ) else {
        return ParsedDate::Invalid;
    };

    let Ok(month) = Month::try_from(month as u8) else {
        return ParsedDate::Invalid;
    };

    match Date::from_calendar_date(year as i32, month, day as u8) {
        Ok(date) => ParsedDate::Valid(date),
        Err(_) => ParsedDate::Invalid,
    }
}

fn numeric_component(s: &str, min_len: usize, max_len: usize) -> Option<u32> {
    let s = s.trim();
    if !(min_len..=max_len).contains(&s.len()) || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Formes ISO acceptées: `AAAA`, `AAAA-MM`, `AAAA-MM-JJ`, date et heure
/// séparées par une espace, RFC 3339. Les composants absents valent 1.
fn parse_raw(s: &str) -> ParsedDate {
    if let Some(year) = numeric_component(s, 4, 4) {
        return from_year_month(year, 1);
    }

    if let Some((year, month)) = s.split_once('-') {
        if let (Some(year), Some(month)) =
            (numeric_component(year, 4, 4), numeric_component(month, 2, 2))
        {
            return from_year_month(year, month);
        }
    }

    let iso_date = format_description!("[year]-[month]-[day]");
    if let Ok(date) = Date::parse(s, iso_date) {
        return ParsedDate::Valid(date);
    }

    let local_minutes = format_description!("[year]-[month]-[day] [hour]:[minute]");
    let local_seconds = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    if let Ok(datetime) = PrimitiveDateTime::parse(s, local_minutes)
        .or_else(|_| PrimitiveDateTime::parse(s, local_seconds))
    {
        return ParsedDate::Valid(datetime.date());
    }

    if let Ok(datetime) = OffsetDateTime::parse(s, &Rfc3339) {
        return ParsedDate::Valid(datetime.date());
    }

    ParsedDate::Invalid
}

fn from_year_month(year: u32, month: u32) -> ParsedDate {
    let Ok(month) = Month::try_from(month as u8) else {
        return ParsedDate::Invalid;
    };

    match Date::from_calendar_date(year as i32, month, 1) {
        Ok(date) => ParsedDate::Valid(date),
        Err(_) => ParsedDate::Invalid,
    }
}

/// Âge en années révolues à la date `today`.
///
/// Une date de naissance future donne un âge négatif, sans erreur.
pub fn age_from_birth_date(birth: Date, today: Date) -> i32 {
    let mut age = today.year() - birth.year();
    if (today.month() as u8, today.day()) < (birth.month() as u8, birth.day()) {
        age -= 1;
    }
    age
}

/// Date du jour (UTC)
pub fn today() -> Date {
    OffsetDateTime::now_utc().date()
}

/// Âge affichable d'un élu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "years", rename_all = "snake_case")]
pub enum AgeStatus {
    Known(i32),
    /// Date présente mais illisible
    InvalidDate,
    /// Pas de date
    Missing,
}

/// Âge à partir de la date brute, en distinguant date absente et date invalide
pub fn age_status(raw: Option<&str>, today: Date) -> AgeStatus {
    let Some(raw) = raw.filter(|s| !s.trim().is_empty()) else {
        return AgeStatus::Missing;
    };

    match parse_french_date(raw).date() {
        Some(birth) => AgeStatus::Known(age_from_birth_date(birth, today)),
        None => AgeStatus::InvalidDate,
    }
}

impl fmt::Display for AgeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgeStatus::Known(years) => write!(f, "Age : {} ans", years),
            AgeStatus::InvalidDate => f.write_str("Âge non disponible (date invalide)"),
            AgeStatus::Missing => f.write_str("Âge non disponible (date manquante)"),
        }
    }
}
