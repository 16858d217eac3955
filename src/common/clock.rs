// src/common/clock.rs

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

/// Combina data e hora em um instante local à clínica.
/// Nenhum fuso horário é modelado: todos os horários são "de parede".
pub fn combine(date: NaiveDate, time: NaiveTime) -> NaiveDateTime {
    date.and_time(time)
}

/// Hora de fim de um turno a partir do início e da duração.
pub fn end_time(time_start: NaiveTime, duration_minutes: i32) -> NaiveTime {
    time_start
        .overflowing_add_signed(Duration::minutes(duration_minutes as i64))
        .0
}

/// O instante do turno já passou?
pub fn is_past(now: NaiveDateTime, date: NaiveDate, time_start: NaiveTime) -> bool {
    combine(date, time_start) <= now
}

/// Faltam menos de `hours` horas para o início do turno?
/// Turnos já passados também contam como "menos de `hours` horas".
pub fn starts_in_less_than(
    now: NaiveDateTime,
    date: NaiveDate,
    time_start: NaiveTime,
    hours: i64,
) -> bool {
    combine(date, time_start) - now < Duration::hours(hours)
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

    #[test]
    fn end_time_adds_duration() {
        assert_eq!(end_time(time(10, 0), 30), time(10, 30));
        assert_eq!(end_time(time(11, 45), 45), time(12, 30));
    }

    #[test]
    fn is_past_compares_full_instant() {
        let now = combine(date(2025, 3, 1), time(12, 0));

        assert!(is_past(now, date(2025, 3, 1), time(11, 30)));
        assert!(is_past(now, date(2025, 2, 28), time(18, 0)));
        // Início exatamente agora já não é mais reservável.
        assert!(is_past(now, date(2025, 3, 1), time(12, 0)));
        assert!(!is_past(now, date(2025, 3, 1), time(12, 1)));
        assert!(!is_past(now, date(2025, 3, 2), time(8, 0)));
    }

    #[test]
    fn starts_in_less_than_two_hours() {
        let now = combine(date(2025, 3, 1), time(10, 0));

        assert!(starts_in_less_than(now, date(2025, 3, 1), time(11, 59), 2));
        // Exatamente 2 horas de antecedência ainda é permitido.
        assert!(!starts_in_less_than(now, date(2025, 3, 1), time(12, 0), 2));
        assert!(!starts_in_less_than(now, date(2025, 3, 2), time(9, 0), 2));
        // Turno no passado conta como dentro da janela.
        assert!(starts_in_less_than(now, date(2025, 3, 1), time(9, 0), 2));
    }
}
