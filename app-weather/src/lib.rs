use chrono::NaiveDateTime;
use common::declare_app;
use common::{App, Counters, KeyValue};
use itertools::Itertools;
use log::debug;
use std::num::ParseIntError;
use thiserror::Error;

pub const RECORDS_BY_DAY: &str = "Number of Weather Records by day";

const SEP: char = '^';
const DATETIME_FORMAT: &str = "%b %d %H:%M:%S %Y";

/// Zone names accepted in the datetime field, matched ignoring case.
const ZONES: &[&str] = &[
    "UTC", "UT", "GMT", "Z", "PST", "PDT", "MST", "MDT", "CST", "CDT", "EST", "EDT", "AKST", "AKDT",
    "HST", "AST", "NST", "WET", "WEST", "BST", "IST", "CET", "CEST", "EET", "EEST", "MSK", "JST",
    "KST", "HKT", "SGT", "AWST", "ACST", "AEST", "AEDT", "NZST", "NZDT",
];

#[derive(Debug, Error, PartialEq)]
pub enum RecordError {
    #[error("expected 4 fields, found {fields}")]
    Malformed { fields: usize },
    #[error("unparseable datetime {0:?}")]
    UnparseableDate(String),
    #[error("unparseable temperature: {0}")]
    UnparseableNumber(#[from] ParseIntError),
}

/// One sensor reading, reduced to what the aggregation needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reading {
    pub city: String,
    /// `YYYY-MM-DD`
    pub date: String,
    pub temperature: i32,
}

/// Parses `city^sensor^Mon DD HH:MM:SS TZ YYYY^temperature`.
pub fn parse_reading(line: &str) -> Result<Reading, RecordError> {
    let mut fields = line.split(SEP).collect_vec();
    while fields.last() == Some(&"") {
        fields.pop();
    }
    let (city, datetime, temperature) = match fields.as_slice() {
        [city, _sensor, datetime, temperature] => (*city, *datetime, *temperature),
        _ => {
            return Err(RecordError::Malformed {
                fields: fields.len(),
            })
        }
    };

    let date = parse_date(datetime)?;
    let temperature = temperature.parse::<i32>()?;

    Ok(Reading {
        city: city.to_owned(),
        date,
        temperature,
    })
}

/// The calendar date as written; the zone name must be a known one but is
/// not applied.
fn parse_date(datetime: &str) -> Result<String, RecordError> {
    let err = || RecordError::UnparseableDate(datetime.to_owned());

    let tokens = datetime.split_whitespace().collect_vec();
    let (month, day, time, zone, year) = match tokens.as_slice() {
        [month, day, time, zone, year] => (month, day, time, zone, year),
        _ => return Err(err()),
    };
    if !ZONES.iter().any(|known| known.eq_ignore_ascii_case(zone)) {
        return Err(err());
    }

    let without_zone = format!("{} {} {} {}", month, day, time, year);
    let parsed = NaiveDateTime::parse_from_str(&without_zone, DATETIME_FORMAT)
        .map_err(|_| err())?;
    Ok(parsed.format("%Y-%m-%d").to_string())
}

/// Daily minimum and maximum temperature per city.
#[derive(Debug, Default)]
pub struct WeatherApp;

impl App for WeatherApp {
    fn map(&self, record: &str) -> Vec<KeyValue> {
        match parse_reading(record) {
            Ok(reading) => {
                let key = format!("{}{}{}", reading.city, SEP, reading.date);
                vec![(key, reading.temperature.to_string())]
            }
            Err(e) => {
                debug!("skip record {:?}: {}", record, e);
                vec![]
            }
        }
    }

    fn reduce(&self, key: &str, temperatures: Vec<String>, counters: &Counters) -> Vec<String> {
        // values were rendered from i32 by `map`
        let minmax = temperatures
            .iter()
            .filter_map(|t| t.parse::<i32>().ok())
            .minmax()
            .into_option();
        let (min, max) = match minmax {
            Some(minmax) => minmax,
            None => return vec![],
        };

        let date = key.split(SEP).nth(1).unwrap_or_default();
        counters.incr(RECORDS_BY_DAY, date, temperatures.len() as i64);

        vec![format!("{}{sep}{}{sep}{}", key, min, max, sep = SEP)]
    }
}

declare_app!(WeatherApp::default);
