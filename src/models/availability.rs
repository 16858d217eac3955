// src/models/availability.rs

use std::collections::HashSet;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::clock;

/// Janela de disponibilidade declarada por um veterinário: intervalo de
/// datas + expediente diário + duração do turno. É a matéria-prima da
/// geração de turnos.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityWindow {
    pub id: Uuid,
    pub veterinarian_id: Uuid,
    pub clinic_id: Uuid,
    pub date_start: NaiveDate,
    pub date_end: NaiveDate,
    pub daily_time_start: NaiveTime,
    pub daily_time_end: NaiveTime,
    pub slot_duration_minutes: i32,
    pub created_at: DateTime<Utc>,
}

impl AvailabilityWindow {
    /// Horários de início dos turnos dentro do expediente diário.
    ///
    /// O cursor avança de `slot_duration_minutes` em `slot_duration_minutes`
    /// a partir de `daily_time_start` e para assim que o fim do candidato
    /// ultrapassaria `daily_time_end`: sobra de expediente menor que um
    /// turno é descartada, nunca vira um turno curto.
    pub fn daily_slot_starts(&self) -> Vec<NaiveTime> {
        let step = Duration::minutes(self.slot_duration_minutes as i64);
        let day_end = clock::combine(self.date_start, self.daily_time_end);

        let mut starts = Vec::new();
        let mut cursor = clock::combine(self.date_start, self.daily_time_start);
        while cursor + step <= day_end {
            starts.push(cursor.time());
            cursor += step;
        }
        starts
    }

    /// Datas do intervalo em que a clínica atende.
    ///
    /// Sem conjunto declarado de dias de atendimento, toda data do
    /// intervalo conta.
    pub fn attendance_dates(&self, attendance_days: Option<&HashSet<Weekday>>) -> Vec<NaiveDate> {
        self.date_start
            .iter_days()
            .take_while(|d| *d <= self.date_end)
            .filter(|d| attendance_days.is_none_or(|days| days.contains(&d.weekday())))
            .collect()
    }

    /// O par `(date, time_start)` cai dentro desta janela?
    /// É o critério usado para apagar os turnos gerados por ela.
    pub fn covers(&self, date: NaiveDate, time_start: NaiveTime) -> bool {
        self.date_start <= date
            && date <= self.date_end
            && self.daily_time_start <= time_start
            && time_start < self.daily_time_end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn window(
        date_start: NaiveDate,
        date_end: NaiveDate,
        daily_time_start: NaiveTime,
        daily_time_end: NaiveTime,
        slot_duration_minutes: i32,
    ) -> AvailabilityWindow {
        AvailabilityWindow {
            id: Uuid::new_v4(),
            veterinarian_id: Uuid::new_v4(),
            clinic_id: Uuid::new_v4(),
            date_start,
            date_end,
            daily_time_start,
            daily_time_end,
            slot_duration_minutes,
            created_at: DateTime::<Utc>::MIN_UTC,
        }
    }

    #[test]
    fn two_hour_window_with_half_hour_slots_gives_four_starts() {
        let w = window(
            date(2025, 3, 1),
            date(2025, 3, 1),
            time(10, 0),
            time(12, 0),
            30,
        );

        assert_eq!(
            w.daily_slot_starts(),
            vec![time(10, 0), time(10, 30), time(11, 0), time(11, 30)]
        );
    }

    #[test]
    fn trailing_partial_slot_is_dropped() {
        // 10:00-10:50 com turnos de 30: só 10:00-10:30 cabe inteiro.
        let w = window(
            date(2025, 3, 1),
            date(2025, 3, 1),
            time(10, 0),
            time(10, 50),
            30,
        );

        assert_eq!(w.daily_slot_starts(), vec![time(10, 0)]);
    }

    #[test]
    fn window_shorter_than_one_slot_yields_nothing() {
        let w = window(
            date(2025, 3, 1),
            date(2025, 3, 1),
            time(10, 0),
            time(10, 20),
            30,
        );

        assert!(w.daily_slot_starts().is_empty());
    }

    #[test]
    fn exact_fit_keeps_last_slot() {
        let w = window(
            date(2025, 3, 1),
            date(2025, 3, 1),
            time(9, 0),
            time(10, 0),
            20,
        );

        assert_eq!(
            w.daily_slot_starts(),
            vec![time(9, 0), time(9, 20), time(9, 40)]
        );
    }

    #[test]
    fn attendance_dates_without_declared_days_covers_whole_range() {
        let w = window(
            date(2025, 3, 1),
            date(2025, 3, 4),
            time(10, 0),
            time(12, 0),
            30,
        );

        assert_eq!(
            w.attendance_dates(None),
            vec![
                date(2025, 3, 1),
                date(2025, 3, 2),
                date(2025, 3, 3),
                date(2025, 3, 4)
            ]
        );
    }

    #[test]
    fn attendance_dates_skips_non_attendance_weekdays() {
        // 2025-03-01 é sábado; clínica só atende segunda e quarta.
        let days: HashSet<Weekday> = [Weekday::Mon, Weekday::Wed].into_iter().collect();
        let w = window(
            date(2025, 3, 1),
            date(2025, 3, 7),
            time(10, 0),
            time(12, 0),
            30,
        );

        assert_eq!(
            w.attendance_dates(Some(&days)),
            vec![date(2025, 3, 3), date(2025, 3, 5)]
        );
    }

    #[test]
    fn single_day_range_generates_for_that_day() {
        let w = window(
            date(2024, 1, 15),
            date(2024, 1, 15),
            time(8, 0),
            time(9, 0),
            30,
        );

        assert_eq!(w.attendance_dates(None), vec![date(2024, 1, 15)]);
    }

    #[test]
    fn covers_matches_date_range_and_daily_span() {
        let w = window(
            date(2025, 3, 1),
            date(2025, 3, 5),
            time(10, 0),
            time(12, 0),
            30,
        );

        assert!(w.covers(date(2025, 3, 3), time(10, 0)));
        assert!(w.covers(date(2025, 3, 3), time(11, 30)));
        // hora_fin é exclusivo.
        assert!(!w.covers(date(2025, 3, 3), time(12, 0)));
        assert!(!w.covers(date(2025, 3, 6), time(10, 0)));
        assert!(!w.covers(date(2025, 3, 3), time(9, 30)));
    }
}
