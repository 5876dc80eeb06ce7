use chrono::Datelike;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Day names in API order: `day_of_week` 1 is Monday, 7 is Sunday.
pub const DAYS_OF_WEEK: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Delay chances strictly below this percentage render in the "good" tone.
pub const GOOD_DELAY_THRESHOLD: f32 = 10.0;

pub fn day_name(day_of_week: u8) -> Option<&'static str> {
    match day_of_week {
        1..=7 => Some(DAYS_OF_WEEK[(day_of_week - 1) as usize]),
        _ => None,
    }
}

pub fn day_number(name: &str) -> Option<u8> {
    DAYS_OF_WEEK
        .iter()
        .position(|d| *d == name)
        .map(|i| (i + 1) as u8)
}

pub fn today_day_of_week() -> u8 {
    chrono::Local::now().weekday().number_from_monday() as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelayTone {
    Good,
    Bad,
}

/// Extracts the numeric part of a formatted percentage like `"7.25%"`.
pub fn parse_delay_percent(delay_chance: &str) -> Option<f32> {
    delay_chance.trim().trim_end_matches('%').parse::<f32>().ok()
}

/// Tone for a delay-chance string: `Good` below the threshold, `Bad` for
/// everything else including unparsable values.
pub fn delay_tone(delay_chance: &str) -> DelayTone {
    match parse_delay_percent(delay_chance) {
        Some(p) if p < GOOD_DELAY_THRESHOLD => DelayTone::Good,
        _ => DelayTone::Bad,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Airport {
    #[serde(rename = "airport_id")]
    pub id: i64,
    #[serde(rename = "airport_name")]
    pub name: String,
}

/// One `/predict` result. The server returns `delay_chance: null` with zero
/// confidence when it has no data for the pair, so most fields are defaulted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    #[serde(default)]
    pub airport_id: Option<i64>,
    #[serde(default)]
    pub airport_name: Option<String>,
    #[serde(default)]
    pub day_of_week: u8,
    #[serde(default)]
    pub delay_chance: Option<String>,
    #[serde(default)]
    pub confidence_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStat {
    #[serde(rename = "OriginAirportID")]
    pub origin_id: i64,
    #[serde(rename = "OriginAirportName", default)]
    pub origin_name: Option<String>,
    #[serde(rename = "DestAirportID")]
    pub dest_id: i64,
    #[serde(rename = "DestAirportName", default)]
    pub dest_name: Option<String>,
    pub delay_chance: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformerStat {
    pub airport_name: String,
    pub delay_chance: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AirlineDelay {
    pub airline: String,
    pub delay_chance: String,
}

// The airline column name varies by export ("Airline", "airline" or
// "airline_id"), so rows are unmarshalled by hand instead of via derive.
impl AirlineDelay {
    pub fn from_value(row: &Value) -> Self {
        let airline = ["Airline", "airline", "airline_id"]
            .iter()
            .find_map(|key| row.get(*key).and_then(display_value))
            .unwrap_or_default();
        let delay_chance = row
            .get("delay_chance")
            .and_then(display_value)
            .unwrap_or_default();
        Self {
            airline,
            delay_chance,
        }
    }
}

fn display_value(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Name↔id lookup built from the `/airports` list. Name matching is exact.
#[derive(Debug, Default)]
pub struct AirportIndex {
    by_name: HashMap<String, i64>,
    by_id: HashMap<i64, String>,
}

impl AirportIndex {
    pub fn new(airports: &[Airport]) -> Self {
        let mut index = Self::default();
        for airport in airports {
            index.by_name.insert(airport.name.clone(), airport.id);
            index.by_id.insert(airport.id, airport.name.clone());
        }
        index
    }

    pub fn id_for_name(&self, name: &str) -> Option<i64> {
        self.by_name.get(name).copied()
    }

    pub fn name_for_id(&self, id: i64) -> Option<&str> {
        self.by_id.get(&id).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// The best-performer airport paired with a prediction for today.
#[derive(Debug, Clone, PartialEq)]
pub struct TodaysWinner {
    pub airport_name: String,
    pub prediction: Prediction,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BusiestAirport {
    pub airport_name: String,
    pub delay_chance: String,
}

/// Composite "today's stats" view assembled once per session load. Absent
/// fields stay `None` when their branch failed or produced no rows.
#[derive(Debug, Clone, Default)]
pub struct DerivedStats {
    pub best_airport: Option<PerformerStat>,
    pub busiest_airport: Option<BusiestAirport>,
    pub most_delayed_route: Option<RouteStat>,
    pub todays_winner: Option<TodaysWinner>,
}

impl DerivedStats {
    /// Records the top delayed route. The route's destination doubles as the
    /// busiest-airport card; an unmapped destination name falls back to the id.
    pub fn set_most_delayed_route(&mut self, route: RouteStat) {
        self.busiest_airport = Some(BusiestAirport {
            airport_name: route
                .dest_name
                .clone()
                .unwrap_or_else(|| route.dest_id.to_string()),
            delay_chance: route.delay_chance.clone(),
        });
        self.most_delayed_route = Some(route);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn day_round_trip_for_all_seven_days() {
        for n in 1..=7u8 {
            let name = day_name(n).expect("1-7 must have a name");
            assert_eq!(day_number(name), Some(n), "round trip failed for {}", name);
        }
    }

    #[test]
    fn day_name_rejects_out_of_range() {
        assert_eq!(day_name(0), None);
        assert_eq!(day_name(8), None);
        assert_eq!(day_number("Funday"), None);
    }

    #[test]
    fn delay_percent_parsing() {
        assert_eq!(parse_delay_percent("7.25%"), Some(7.25));
        assert_eq!(parse_delay_percent("12.3"), Some(12.3));
        assert_eq!(parse_delay_percent(" 9.99% "), Some(9.99));
        assert_eq!(parse_delay_percent("n/a"), None);
        assert_eq!(parse_delay_percent(""), None);
    }

    #[test]
    fn tone_is_good_strictly_below_ten_percent() {
        assert_eq!(delay_tone("9.99%"), DelayTone::Good);
        assert_eq!(delay_tone("10%"), DelayTone::Bad);
        assert_eq!(delay_tone("10.0%"), DelayTone::Bad);
        assert_eq!(delay_tone("42.5%"), DelayTone::Bad);
        assert_eq!(delay_tone("garbage"), DelayTone::Bad);
    }

    #[test]
    fn airport_index_resolves_exact_names_only() {
        let airports = vec![
            Airport {
                id: 10140,
                name: "Albuquerque, NM".into(),
            },
            Airport {
                id: 12478,
                name: "New York, NY (JFK)".into(),
            },
        ];
        let index = AirportIndex::new(&airports);

        assert_eq!(index.id_for_name("Albuquerque, NM"), Some(10140));
        assert_eq!(index.name_for_id(12478), Some("New York, NY (JFK)"));
        assert_eq!(index.id_for_name("albuquerque, nm"), None);
        assert_eq!(index.id_for_name("Nowhere"), None);
        assert!(!index.is_empty());
    }

    #[test]
    fn prediction_deserializes_the_no_data_shape() {
        let p: Prediction =
            serde_json::from_value(json!({ "delay_chance": null, "confidence_percent": 0 }))
                .unwrap();
        assert_eq!(p.delay_chance, None);
        assert_eq!(p.confidence_percent, 0.0);
        assert_eq!(p.day_of_week, 0);
        assert_eq!(p.airport_name, None);
    }

    #[test]
    fn route_deserializes_with_null_names() {
        let r: RouteStat = serde_json::from_value(json!({
            "OriginAirportID": 11292,
            "OriginAirportName": null,
            "DestAirportID": 13930,
            "DestAirportName": "Chicago, IL (ORD)",
            "delay_chance": "31.4%"
        }))
        .unwrap();
        assert_eq!(r.origin_name, None);
        assert_eq!(r.dest_name.as_deref(), Some("Chicago, IL (ORD)"));
    }

    #[test]
    fn airline_delay_fallback_chain() {
        let named = AirlineDelay::from_value(&json!({
            "Airline": "Skyway",
            "airline_id": 42,
            "delay_chance": "18.2%"
        }));
        assert_eq!(named.airline, "Skyway");
        assert_eq!(named.delay_chance, "18.2%");

        let lowercase = AirlineDelay::from_value(&json!({
            "airline": "Northbound",
            "delay_chance": "9.1%"
        }));
        assert_eq!(lowercase.airline, "Northbound");

        let id_only = AirlineDelay::from_value(&json!({
            "airline_id": 42,
            "delay_chance": "5.0%"
        }));
        assert_eq!(id_only.airline, "42");

        let empty = AirlineDelay::from_value(&json!({ "Airline": "", "airline": "Fallback" }));
        assert_eq!(empty.airline, "Fallback");
        assert_eq!(empty.delay_chance, "");
    }

    #[test]
    fn busiest_airport_derives_from_route_destination() {
        let mut stats = DerivedStats::default();
        stats.set_most_delayed_route(RouteStat {
            origin_id: 1,
            origin_name: Some("A".into()),
            dest_id: 2,
            dest_name: Some("B".into()),
            delay_chance: "44.0%".into(),
        });
        let busiest = stats.busiest_airport.expect("busiest is set");
        assert_eq!(busiest.airport_name, "B");
        assert_eq!(busiest.delay_chance, "44.0%");
        assert!(stats.most_delayed_route.is_some());

        let mut stats = DerivedStats::default();
        stats.set_most_delayed_route(RouteStat {
            origin_id: 1,
            origin_name: None,
            dest_id: 2,
            dest_name: None,
            delay_chance: "44.0%".into(),
        });
        assert_eq!(stats.busiest_airport.unwrap().airport_name, "2");
    }
}
