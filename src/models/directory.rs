// src/models/directory.rs
//
// Modelos do diretório (clínicas, usuários, pets). A gestão dessas
// entidades é de outros serviços; aqui só as lemos para autorização,
// horário de atendimento e posse de pets.

use std::collections::HashSet;

use chrono::{DateTime, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    ClinicAdmin,
    Veterinarian,
    Client,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub role: UserRole,
    pub clinic_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Clinic {
    pub id: Uuid,
    pub name: String,
    pub open_time: NaiveTime,
    pub close_time: NaiveTime,
    // Dias de atendimento ('monday'..'sunday'). NULL = atende todos os dias.
    pub attendance_days: Option<Vec<String>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Converte um nome de dia da semana ('monday'..'sunday') no `Weekday`.
pub fn parse_weekday(name: &str) -> Option<Weekday> {
    match name.trim().to_ascii_lowercase().as_str() {
        "monday" => Some(Weekday::Mon),
        "tuesday" => Some(Weekday::Tue),
        "wednesday" => Some(Weekday::Wed),
        "thursday" => Some(Weekday::Thu),
        "friday" => Some(Weekday::Fri),
        "saturday" => Some(Weekday::Sat),
        "sunday" => Some(Weekday::Sun),
        _ => None,
    }
}

impl Clinic {
    /// Conjunto de dias de atendimento da clínica.
    ///
    /// `None` quando a clínica não declarou dias (lista ausente ou vazia):
    /// nesse caso ela atende todos os dias. Nomes desconhecidos são
    /// ignorados.
    pub fn attendance_weekdays(&self) -> Option<HashSet<Weekday>> {
        let names = self.attendance_days.as_ref()?;
        let days: HashSet<Weekday> = names.iter().filter_map(|n| parse_weekday(n)).collect();
        if days.is_empty() {
            None
        } else {
            Some(days)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clinic(attendance_days: Option<Vec<String>>) -> Clinic {
        Clinic {
            id: Uuid::new_v4(),
            name: "Clínica Teste".to_string(),
            open_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            close_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            attendance_days,
            is_active: true,
            created_at: DateTime::<Utc>::MIN_UTC,
        }
    }

    #[test]
    fn parses_known_weekday_names() {
        assert_eq!(parse_weekday("monday"), Some(Weekday::Mon));
        assert_eq!(parse_weekday("Sunday"), Some(Weekday::Sun));
        assert_eq!(parse_weekday(" friday "), Some(Weekday::Fri));
        assert_eq!(parse_weekday("segunda"), None);
        assert_eq!(parse_weekday(""), None);
    }

    #[test]
    fn missing_or_empty_day_list_means_open_every_day() {
        assert_eq!(clinic(None).attendance_weekdays(), None);
        assert_eq!(clinic(Some(vec![])).attendance_weekdays(), None);
    }

    #[test]
    fn declared_days_become_a_weekday_set() {
        let c = clinic(Some(vec!["monday".into(), "wednesday".into()]));
        let days = c.attendance_weekdays().unwrap();

        assert!(days.contains(&Weekday::Mon));
        assert!(days.contains(&Weekday::Wed));
        assert_eq!(days.len(), 2);
    }

    #[test]
    fn unknown_names_are_ignored() {
        let c = clinic(Some(vec!["monday".into(), "feriado".into()]));
        assert_eq!(c.attendance_weekdays().unwrap().len(), 1);

        // Só nomes inválidos: equivale a não ter declarado nada.
        let c = clinic(Some(vec!["feriado".into()]));
        assert_eq!(c.attendance_weekdays(), None);
    }
}
