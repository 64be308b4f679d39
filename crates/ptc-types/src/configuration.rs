use chrono::{DateTime, TimeZone};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::TypeError;
use crate::TIME_ZONE;

/// A lunch pickup location.
///
/// A participant picks up lunch at the first lunch listing one of their
/// classes, else at the lunch listing their unit type, else at the general
/// lunch (the first entry in [`Configuration::lunches`]).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Lunch {
    pub name: String,
    pub short_name: String,
    pub location: String,
    /// 1: first seating, 2: second seating.
    pub seating: i32,
    pub classes: Vec<i32>,
    /// Registration unit types: Pack, Troop, Crew, Ship.
    pub unit_types: Vec<String>,
}

impl Lunch {
    /// Placeholder used until lunches are configured.
    pub fn tbd() -> Self {
        Self {
            name: "TBD".into(),
            short_name: "TBD".into(),
            location: "TBD".into(),
            seating: 2,
            ..Self::default()
        }
    }
}

/// OAuth client for staff login.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginClient {
    pub id: String,
    pub secret: String,
}

/// A named set of classes recommended together in the catalog.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestedSchedule {
    pub name: String,
    pub classes: Vec<i32>,
}

/// Conference-wide settings, edited by admins as JSON.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Configuration {
    pub year: i32,
    pub month: i32,
    pub day: i32,

    pub login_client: LoginClient,

    #[serde(rename = "classesSheetURL")]
    pub classes_sheet_url: String,

    /// The first lunch is the general default.
    pub lunches: Vec<Lunch>,

    #[serde(rename = "registrationURL")]
    pub registration_url: String,

    /// Announces when registration opens, or that the catalog is for the
    /// previous event.
    pub catalog_status_message: String,

    #[serde(rename = "staffIDs")]
    pub staff_ids: Vec<String>,
    #[serde(rename = "adminIDs")]
    pub admin_ids: Vec<String>,

    /// HMAC key for signed cookies.
    pub cookie_key: String,

    #[serde(rename = "doubleknotExportPageURL")]
    pub doubleknot_export_page_url: String,

    pub suggested_schedules: Vec<SuggestedSchedule>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            year: 0,
            month: 0,
            day: 0,
            login_client: LoginClient::default(),
            classes_sheet_url: String::new(),
            lunches: vec![Lunch::tbd()],
            registration_url: String::new(),
            catalog_status_message: String::new(),
            staff_ids: Vec::new(),
            admin_ids: Vec::new(),
            cookie_key: String::new(),
            doubleknot_export_page_url: String::new(),
            suggested_schedules: Vec::new(),
        }
    }
}

impl Configuration {
    /// Check the fields the server cannot run without.
    pub fn validate(&self) -> Result<(), TypeError> {
        if self.cookie_key.is_empty() {
            return Err(TypeError::MissingCookieKey);
        }
        Ok(())
    }

    /// Midnight of the conference day in the conference time zone, or `None`
    /// if year/month/day do not name a date.
    pub fn date(&self) -> Option<DateTime<Tz>> {
        let month = u32::try_from(self.month).ok()?;
        let day = u32::try_from(self.day).ok()?;
        TIME_ZONE
            .with_ymd_and_hms(self.year, month, day, 0, 0, 0)
            .earliest()
    }

    /// Parse a configuration, ignoring fields this version does not know.
    pub fn from_json(text: &str) -> Result<Self, TypeError> {
        serde_json::from_str(text).map_err(|e| TypeError::Json(e.to_string()))
    }

    /// Parse a configuration, rejecting fields this version does not know.
    ///
    /// Used by the admin editor so that typos are reported instead of
    /// silently dropped.
    pub fn from_json_strict(text: &str) -> Result<Self, TypeError> {
        let input: Value = serde_json::from_str(text).map_err(|e| TypeError::Json(e.to_string()))?;
        let config: Self =
            serde_json::from_value(input.clone()).map_err(|e| TypeError::Json(e.to_string()))?;
        let known = serde_json::to_value(&config).map_err(|e| TypeError::Json(e.to_string()))?;
        if let Some(path) = first_unknown_field(&input, &known, "") {
            return Err(TypeError::UnknownField(path));
        }
        Ok(config)
    }
}

/// Walks `input` and returns the path of the first object key that the
/// re-serialized `known` value does not contain.
fn first_unknown_field(input: &Value, known: &Value, path: &str) -> Option<String> {
    match (input, known) {
        (Value::Object(fields), Value::Object(known_fields)) => {
            fields.iter().find_map(|(key, value)| {
                let child = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}.{key}")
                };
                match known_fields.get(key) {
                    None => Some(child),
                    Some(known_value) => first_unknown_field(value, known_value, &child),
                }
            })
        }
        (Value::Array(items), Value::Array(known_items)) => items
            .iter()
            .zip(known_items)
            .enumerate()
            .find_map(|(i, (item, known_item))| {
                first_unknown_field(item, known_item, &format!("{path}[{i}]"))
            }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn default_has_tbd_lunch_and_fails_validation() {
        let config = Configuration::default();
        assert_eq!(config.lunches, vec![Lunch::tbd()]);
        assert_eq!(config.validate(), Err(TypeError::MissingCookieKey));
        assert!(config.date().is_none());
    }

    #[test]
    fn date_is_midnight_in_los_angeles() {
        let config = Configuration {
            year: 2024,
            month: 3,
            day: 9,
            cookie_key: "k".into(),
            ..Configuration::default()
        };
        assert!(config.validate().is_ok());
        let date = config.date().unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (2024, 3, 9));
        assert_eq!((date.hour(), date.minute()), (0, 0));
        assert_eq!(date.timezone(), chrono_tz::America::Los_Angeles);
        assert_eq!(date.to_rfc3339(), "2024-03-09T00:00:00-08:00");
    }

    #[test]
    fn json_field_names() {
        let config = Configuration::from_json(
            r#"{"year":2024,"staffIDs":["A@x.org"],"classesSheetURL":"u","lunches":[{"name":"A","seating":1,"unitTypes":["Pack"]}]}"#,
        )
        .unwrap();
        assert_eq!(config.staff_ids, vec!["A@x.org".to_string()]);
        assert_eq!(config.classes_sheet_url, "u");
        assert_eq!(config.lunches[0].unit_types, vec!["Pack".to_string()]);
        assert_eq!(config.lunches[0].seating, 1);
    }

    #[test]
    fn lenient_parse_ignores_unknown_fields() {
        let config = Configuration::from_json(r#"{"cookieKey":"k","futureSetting":true}"#).unwrap();
        assert_eq!(config.cookie_key, "k");
    }

    #[test]
    fn strict_parse_reports_unknown_fields() {
        let err = Configuration::from_json_strict(r#"{"cookieKey":"k","futureSetting":true}"#)
            .unwrap_err();
        assert_eq!(err, TypeError::UnknownField("futureSetting".into()));

        let err = Configuration::from_json_strict(r#"{"lunches":[{"name":"A"},{"nmae":"B"}]}"#)
            .unwrap_err();
        assert_eq!(err, TypeError::UnknownField("lunches[1].nmae".into()));

        let config = Configuration::from_json_strict(
            r#"{"cookieKey":"k","suggestedSchedules":[{"name":"New leaders","classes":[101,201]}]}"#,
        )
        .unwrap();
        assert_eq!(config.suggested_schedules[0].classes, vec![101, 201]);
    }

    #[test]
    fn syntax_errors_are_json_errors() {
        assert!(matches!(Configuration::from_json("{"), Err(TypeError::Json(_))));
    }
}
