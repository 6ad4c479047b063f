//! Hausa greeting and date line for the home header

use chrono::{Datelike, Weekday};

const WEEKDAYS: [&str; 7] = [
    "Litinin", "Talata", "Laraba", "Alhamis", "Jumma'a", "Asabar", "Lahadi",
];

const MONTHS: [&str; 12] = [
    "Janairu", "Fabrairu", "Maris", "Afrilu", "Mayu", "Yuni", "Yuli", "Agusta", "Satumba",
    "Oktoba", "Nuwamba", "Disamba",
];

/// Time-of-day greeting for a 0-23 hour
pub fn greeting_for_hour(hour: u32) -> &'static str {
    match hour {
        0..=11 => "Ina kwana, Barka da Safiya",
        12..=15 => "Barka da Rana, ya aikin gona?",
        _ => "Barka da Yamma, ya hutu?",
    }
}

pub fn weekday_name(weekday: Weekday) -> &'static str {
    WEEKDAYS[weekday.num_days_from_monday() as usize]
}

/// Long date, e.g. "Litinin, 19 Oktoba"
pub fn hausa_date<D: Datelike>(date: &D) -> String {
    format!(
        "{}, {} {}",
        weekday_name(date.weekday()),
        date.day(),
        MONTHS[date.month0() as usize]
    )
}
