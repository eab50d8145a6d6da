//! Trip-state reconciliation.
//!
//! Pure functions that derive what the trip page shows from a fetched trip
//! document, and that fold a participant submission into the roster that gets
//! written back. Nothing in here touches the store.

use std::fmt::{self, Write};

use chrono::NaiveDate;
use thiserror::Error;

use crate::models::trip::{Trip, TripParticipant};

/// Shown instead of an empty list once every requirement is covered.
pub const NOTHING_MORE: &str = "Nothing more";

/// Short day.month.year rendering, e.g. `1.8.2020`.
pub const SHORT_DATE_FORMAT: &str = "%-d.%-m.%Y";

const DRIVER_MARKER: &str = "🚘";
const HINT_ITEMS: usize = 3;

/// Seats left across all cars.
///
/// Every participant contributes `driver - 1`, so a participant without a car
/// takes one seat away.
pub fn seats_remaining(trip: &Trip) -> i64 {
    trip.participants
        .iter()
        .fold(0, |acc, participant| acc + i64::from(participant.driver) - 1)
}

/// Everything participants bring, in roster order, duplicates kept.
pub fn consolidated_have(trip: &Trip) -> Vec<String> {
    trip.participants
        .iter()
        .flat_map(|participant| participant.brings.iter().cloned())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Needs {
    Items(Vec<String>),
    NothingMore,
}

impl fmt::Display for Needs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Needs::Items(items) => write!(f, "{}", items.join(",")),
            Needs::NothingMore => write!(f, "{NOTHING_MORE}"),
        }
    }
}

/// Requirements nobody has signed up to bring yet.
///
/// Each brought item covers at most one requirement: the first equal item in
/// the consolidated list is consumed per satisfied requirement.
pub fn outstanding_needs(trip: &Trip) -> Needs {
    let mut have = consolidated_have(trip);
    let missing: Vec<String> = trip
        .requirements
        .iter()
        .filter(|requirement| match have.iter().position(|item| item == *requirement) {
            Some(index) => {
                have.remove(index);
                false
            }
            None => true,
        })
        .cloned()
        .collect();

    if missing.is_empty() {
        Needs::NothingMore
    } else {
        Needs::Items(missing)
    }
}

/// The roster to persist after `submission`: any entry with the same name is
/// dropped and the submission goes to the end.
pub fn merge_participant(trip: &Trip, submission: TripParticipant) -> Vec<TripParticipant> {
    let mut next: Vec<TripParticipant> = trip
        .participants
        .iter()
        .filter(|participant| participant.name != submission.name)
        .cloned()
        .collect();
    next.push(submission);
    next
}

pub fn format_date_range(trip: &Trip) -> String {
    format_date_range_with(trip, SHORT_DATE_FORMAT)
}

/// `<start>-<end>` rendered with a strftime pattern, or empty text unless both
/// dates are set. A pattern a plain date cannot render also yields empty text.
pub fn format_date_range_with(trip: &Trip, pattern: &str) -> String {
    let (Some(start), Some(end)) = (trip.start_date, trip.end_date) else {
        return String::new();
    };
    let mut out = String::new();
    match write!(out, "{}-{}", start.format(pattern), end.format(pattern)) {
        Ok(()) => out,
        Err(_) => String::new(),
    }
}

/// Whether `pattern` renders a plain calendar date without error.
pub fn is_date_pattern(pattern: &str) -> bool {
    let sample = NaiveDate::from_ymd_opt(2020, 8, 1).unwrap_or_default();
    let mut out = String::new();
    write!(out, "{}", sample.format(pattern)).is_ok()
}

/// Roster entries as displayed, drivers marked.
pub fn going_list(trip: &Trip) -> Vec<String> {
    trip.participants
        .iter()
        .map(|participant| {
            if participant.is_driver() {
                format!("{} {DRIVER_MARKER}", participant.name)
            } else {
                participant.name.clone()
            }
        })
        .collect()
}

/// Placeholder for the "brings" input: the first few requirements.
pub fn requirement_hint(trip: &Trip) -> String {
    let head: Vec<&str> = trip
        .requirements
        .iter()
        .take(HINT_ITEMS)
        .map(String::as_str)
        .collect();
    format!("{}...", head.join(","))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Driver(u32),
    Brings(Vec<String>),
    Text(String),
}

pub fn parse_form_field(field: &str, raw: &str) -> FieldValue {
    match field {
        "driver" => FieldValue::Driver(parse_driver(raw)),
        "brings" => FieldValue::Brings(parse_brings(raw)),
        _ => FieldValue::Text(raw.to_owned()),
    }
}

/// Leading-integer parse: optional whitespace and sign, then digits; anything
/// after the digits is ignored. Unparseable, negative or overflowing input is 0.
fn parse_driver(raw: &str) -> u32 {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let digits = &rest[..end];
    if negative || digits.is_empty() {
        return 0;
    }
    digits.parse().unwrap_or(0)
}

// Only the first space goes, not every space.
fn parse_brings(raw: &str) -> Vec<String> {
    raw.replacen(' ', "", 1)
        .split(',')
        .map(str::to_owned)
        .collect()
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("{0} is required")]
    Missing(&'static str),
}

/// A participant submission being assembled from raw form fields.
#[derive(Debug, Clone, Default)]
pub struct ParticipantForm {
    name: String,
    driver: u32,
    driving_with: String,
    brings: Option<Vec<String>>,
}

impl ParticipantForm {
    pub fn from_fields<'a, I>(fields: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut form = Self::default();
        for (field, raw) in fields {
            form.apply(field, raw);
        }
        form
    }

    /// Later values for the same field replace earlier ones.
    pub fn apply(&mut self, field: &str, raw: &str) {
        match parse_form_field(field, raw) {
            FieldValue::Driver(seats) => self.driver = seats,
            FieldValue::Brings(items) => self.brings = Some(items),
            FieldValue::Text(text) => match field {
                "name" => self.name = text,
                "drivingWith" => self.driving_with = text,
                _ => {}
            },
        }
    }

    pub fn into_participant(self) -> Result<TripParticipant, FormError> {
        if self.name.trim().is_empty() {
            return Err(FormError::Missing("name"));
        }
        let brings = match self.brings {
            Some(items) if items.iter().any(|item| !item.is_empty()) => items,
            _ => return Err(FormError::Missing("brings")),
        };
        Ok(TripParticipant {
            name: self.name,
            driver: self.driver,
            driving_with: self.driving_with,
            brings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn participant(name: &str, driver: u32, brings: &[&str]) -> TripParticipant {
        TripParticipant {
            name: name.into(),
            driver,
            driving_with: String::new(),
            brings: brings.iter().map(|item| item.to_string()).collect(),
        }
    }

    fn trip_with(participants: Vec<TripParticipant>, requirements: &[&str]) -> Trip {
        Trip {
            participants,
            requirements: requirements.iter().map(|item| item.to_string()).collect(),
            ..Trip::default()
        }
    }

    #[test]
    fn non_drivers_take_a_seat() {
        let trip = trip_with(
            vec![
                participant("a", 2, &[]),
                participant("b", 0, &[]),
                participant("c", 1, &[]),
            ],
            &[],
        );
        assert_eq!(seats_remaining(&trip), 0);

        let crowded = trip_with(vec![participant("a", 0, &[]), participant("b", 0, &[])], &[]);
        assert_eq!(seats_remaining(&crowded), -2);
    }

    #[test]
    fn empty_roster_has_no_seats() {
        assert_eq!(seats_remaining(&Trip::default()), 0);
    }

    #[test]
    fn have_list_keeps_roster_order_and_duplicates() {
        let trip = trip_with(
            vec![
                participant("a", 0, &["tent", "stove"]),
                participant("b", 0, &["tent"]),
            ],
            &[],
        );
        assert_eq!(consolidated_have(&trip), vec!["tent", "stove", "tent"]);
    }

    #[test]
    fn each_item_covers_one_requirement() {
        let trip = trip_with(vec![participant("a", 0, &["tent"])], &["tent", "stove", "tent"]);
        assert_eq!(
            outstanding_needs(&trip),
            Needs::Items(vec!["stove".into(), "tent".into()])
        );
        assert_eq!(outstanding_needs(&trip).to_string(), "stove,tent");
    }

    #[test]
    fn covered_requirements_yield_sentinel() {
        let trip = trip_with(
            vec![
                participant("a", 0, &["tent", "water"]),
                participant("b", 0, &["tent", "rope"]),
            ],
            &["tent", "tent", "water"],
        );
        let needs = outstanding_needs(&trip);
        assert_eq!(needs, Needs::NothingMore);
        assert_eq!(needs.to_string(), NOTHING_MORE);

        assert_eq!(outstanding_needs(&Trip::default()), Needs::NothingMore);
    }

    #[test]
    fn needs_match_exactly() {
        let trip = trip_with(vec![participant("a", 0, &["Tent", " stove"])], &["tent", "stove"]);
        assert_eq!(
            outstanding_needs(&trip),
            Needs::Items(vec!["tent".into(), "stove".into()])
        );
    }

    #[test]
    fn merge_replaces_by_name_and_appends() {
        let trip = trip_with(
            vec![
                participant("a", 0, &["tent"]),
                participant("b", 3, &[]),
                participant("c", 0, &[]),
            ],
            &[],
        );
        let next = merge_participant(&trip, participant("a", 2, &["stove"]));
        let names: Vec<&str> = next.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["b", "c", "a"]);
        assert_eq!(next[2].driver, 2);

        let cased = merge_participant(&trip, participant("A", 0, &[]));
        assert_eq!(cased.len(), 4);
    }

    #[test]
    fn merge_is_idempotent() {
        let mut trip = trip_with(vec![participant("a", 0, &["tent"])], &[]);
        let submission = participant("b", 4, &["stove", "gas"]);

        trip.participants = merge_participant(&trip, submission.clone());
        let once = trip.participants.clone();
        trip.participants = merge_participant(&trip, submission);
        assert_eq!(trip.participants, once);
    }

    #[test]
    fn date_range_needs_both_ends() {
        let mut trip = Trip {
            start_date: NaiveDate::from_ymd_opt(2020, 8, 1),
            end_date: NaiveDate::from_ymd_opt(2020, 8, 13),
            ..Trip::default()
        };
        assert_eq!(format_date_range(&trip), "1.8.2020-13.8.2020");
        assert_eq!(format_date_range_with(&trip, "%Y-%m-%d"), "2020-08-01-2020-08-13");

        assert_eq!(format_date_range_with(&trip, "%H:%M"), "");

        trip.end_date = None;
        assert_eq!(format_date_range(&trip), "");
    }

    #[test]
    fn time_specifiers_are_not_date_patterns() {
        assert!(is_date_pattern(SHORT_DATE_FORMAT));
        assert!(is_date_pattern("%d/%m/%Y"));
        assert!(!is_date_pattern("%H:%M"));
        assert!(!is_date_pattern("%z"));
        assert!(!is_date_pattern("%Q"));
    }

    #[test]
    fn driver_field_coerces_to_zero() {
        assert_eq!(parse_form_field("driver", "abc"), FieldValue::Driver(0));
        assert_eq!(parse_form_field("driver", "3"), FieldValue::Driver(3));
        assert_eq!(parse_form_field("driver", " 4 seats"), FieldValue::Driver(4));
        assert_eq!(parse_form_field("driver", "-2"), FieldValue::Driver(0));
        assert_eq!(parse_form_field("driver", ""), FieldValue::Driver(0));
        assert_eq!(parse_form_field("driver", "99999999999"), FieldValue::Driver(0));
    }

    #[test]
    fn brings_field_drops_first_space_only() {
        fn strings(items: &[&str]) -> Vec<String> {
            items.iter().map(|item| item.to_string()).collect()
        }

        assert_eq!(
            parse_form_field("brings", "a, b,c"),
            FieldValue::Brings(strings(&["a", "b", "c"]))
        );
        assert_eq!(
            parse_form_field("brings", " a, b,c"),
            FieldValue::Brings(strings(&["a", " b", "c"]))
        );
        assert_eq!(parse_form_field("brings", ""), FieldValue::Brings(strings(&[""])));
    }

    #[test]
    fn other_fields_pass_through() {
        assert_eq!(
            parse_form_field("name", "  Dana "),
            FieldValue::Text("  Dana ".into())
        );
    }

    #[test]
    fn form_builds_participant_from_fields() {
        let form = ParticipantForm::from_fields([
            ("name", "Dana"),
            ("brings", "tent, stove"),
            ("driver", "x"),
            ("driver", "4"),
            ("drivingWith", "Omer"),
            ("unknown", "ignored"),
        ]);
        let submission = form.into_participant().unwrap();
        assert_eq!(submission.name, "Dana");
        assert_eq!(submission.brings, vec!["tent", "stove"]);
        assert_eq!(submission.driver, 4);
        assert_eq!(submission.driving_with, "Omer");
    }

    #[test]
    fn form_requires_name_and_brings() {
        let no_name = ParticipantForm::from_fields([("name", " "), ("brings", "tent")]);
        assert_eq!(no_name.into_participant(), Err(FormError::Missing("name")));

        let no_brings = ParticipantForm::from_fields([("name", "Dana")]);
        assert_eq!(no_brings.into_participant(), Err(FormError::Missing("brings")));

        let blank_brings = ParticipantForm::from_fields([("name", "Dana"), ("brings", " ")]);
        assert_eq!(blank_brings.into_participant(), Err(FormError::Missing("brings")));
    }

    #[test]
    fn display_helpers() {
        let trip = trip_with(
            vec![participant("Dana", 4, &[]), participant("Omer", 0, &[])],
            &["tent", "stove", "gas", "water"],
        );
        assert_eq!(going_list(&trip), vec!["Dana 🚘", "Omer"]);
        assert_eq!(requirement_hint(&trip), "tent,stove,gas...");
    }
}
