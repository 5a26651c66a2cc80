use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Rendered in place of any missing or empty field.
pub const PLACEHOLDER: &str = "N/A";

/// One employee record as returned by the list endpoint.
///
/// Every field is optional. Scalar values may arrive either as JSON strings or
/// numbers and are kept in their string form; anything the API sends that is
/// not modelled here is preserved in `extra`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Employee {
    #[serde(
        rename = "Hiring_TestID",
        default,
        deserialize_with = "scalar_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub hiring_test_id: Option<String>,
    #[serde(
        rename = "firstName",
        default,
        deserialize_with = "scalar_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub first_name: Option<String>,
    #[serde(
        rename = "lastName",
        default,
        deserialize_with = "scalar_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_name: Option<String>,
    #[serde(
        default,
        deserialize_with = "scalar_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub email: Option<String>,
    #[serde(
        rename = "phoneNumber",
        default,
        deserialize_with = "scalar_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub phone_number: Option<String>,
    #[serde(
        rename = "employeeID",
        default,
        deserialize_with = "scalar_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub employee_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "scalar_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub designation: Option<String>,
    #[serde(
        default,
        deserialize_with = "scalar_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub city: Option<String>,
    #[serde(
        default,
        deserialize_with = "scalar_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub country: Option<String>,
    #[serde(
        default,
        deserialize_with = "scalar_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub latitude: Option<String>,
    #[serde(
        default,
        deserialize_with = "scalar_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub longitude: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

fn scalar_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        Some(other) => Some(other.to_string()),
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Employee {
    pub fn get(&self, field: Field) -> Option<&str> {
        let value = match field {
            Field::HiringTestId => &self.hiring_test_id,
            Field::FirstName => &self.first_name,
            Field::LastName => &self.last_name,
            Field::Email => &self.email,
            Field::PhoneNumber => &self.phone_number,
            Field::EmployeeId => &self.employee_id,
            Field::Designation => &self.designation,
            Field::City => &self.city,
            Field::Country => &self.country,
            Field::Latitude => &self.latitude,
            Field::Longitude => &self.longitude,
        };
        value.as_deref()
    }

    /// Field value for display; missing and empty values become [`PLACEHOLDER`].
    pub fn display(&self, field: Field) -> &str {
        match self.get(field) {
            Some(v) if !v.trim().is_empty() => v,
            _ => PLACEHOLDER,
        }
    }

    pub fn full_name(&self) -> String {
        let parts: Vec<&str> = [self.get(Field::FirstName), self.get(Field::LastName)]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        if parts.is_empty() {
            PLACEHOLDER.to_string()
        } else {
            parts.join(" ")
        }
    }

    /// Both coordinates present, numeric, finite and inside the WGS84 range.
    pub fn coordinates(&self) -> Option<Coordinates> {
        let lat = parse_coordinate(self.latitude.as_deref()?)?;
        let lng = parse_coordinate(self.longitude.as_deref()?)?;
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
            return None;
        }
        Some(Coordinates { lat, lng })
    }
}

fn parse_coordinate(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Addressable record fields, named after their wire keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    #[serde(rename = "Hiring_TestID")]
    HiringTestId,
    #[serde(rename = "firstName")]
    FirstName,
    #[serde(rename = "lastName")]
    LastName,
    #[serde(rename = "email")]
    Email,
    #[serde(rename = "phoneNumber")]
    PhoneNumber,
    #[serde(rename = "employeeID")]
    EmployeeId,
    #[serde(rename = "designation")]
    Designation,
    #[serde(rename = "city")]
    City,
    #[serde(rename = "country")]
    Country,
    #[serde(rename = "latitude")]
    Latitude,
    #[serde(rename = "longitude")]
    Longitude,
}

impl Field {
    pub const ALL: [Field; 11] = [
        Field::HiringTestId,
        Field::FirstName,
        Field::LastName,
        Field::Email,
        Field::PhoneNumber,
        Field::EmployeeId,
        Field::Designation,
        Field::City,
        Field::Country,
        Field::Latitude,
        Field::Longitude,
    ];

    /// Fields a list can be ordered by; coordinates are map-only.
    pub const SORT_KEYS: [Field; 9] = [
        Field::HiringTestId,
        Field::FirstName,
        Field::LastName,
        Field::Email,
        Field::PhoneNumber,
        Field::EmployeeId,
        Field::Designation,
        Field::City,
        Field::Country,
    ];

    pub fn is_sort_key(self) -> bool {
        Self::SORT_KEYS.contains(&self)
    }

    pub fn parse_sort_key(s: &str) -> Result<Field, String> {
        let field = s.parse::<Field>()?;
        if field.is_sort_key() {
            Ok(field)
        } else {
            Err(format!("cannot sort by '{}'", s.trim()))
        }
    }

    pub fn wire_name(self) -> &'static str {
        match self {
            Field::HiringTestId => "Hiring_TestID",
            Field::FirstName => "firstName",
            Field::LastName => "lastName",
            Field::Email => "email",
            Field::PhoneNumber => "phoneNumber",
            Field::EmployeeId => "employeeID",
            Field::Designation => "designation",
            Field::City => "city",
            Field::Country => "country",
            Field::Latitude => "latitude",
            Field::Longitude => "longitude",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_' && !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "hiringtestid" | "testid" | "id" => Ok(Field::HiringTestId),
            "firstname" | "first" | "name" => Ok(Field::FirstName),
            "lastname" | "last" | "surname" => Ok(Field::LastName),
            "email" | "mail" => Ok(Field::Email),
            "phonenumber" | "phone" => Ok(Field::PhoneNumber),
            "employeeid" | "empid" => Ok(Field::EmployeeId),
            "designation" => Ok(Field::Designation),
            "city" => Ok(Field::City),
            "country" => Ok(Field::Country),
            "latitude" | "lat" => Ok(Field::Latitude),
            "longitude" | "lng" | "lon" => Ok(Field::Longitude),
            _ => Err(format!("unknown field '{}'", s.trim())),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("unknown form field '{key}'")]
    UnknownField { key: String },
}

/// Payload for the add-employee endpoint. All fields are required.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEmployee {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    #[serde(rename = "employeeID")]
    pub employee_id: String,
    pub designation: String,
    pub city: String,
    pub country: String,
    pub latitude: String,
    pub longitude: String,
}

impl NewEmployee {
    /// Form keys in display order.
    pub const FIELDS: [&'static str; 10] = [
        "firstName",
        "lastName",
        "email",
        "phoneNumber",
        "employeeID",
        "designation",
        "city",
        "country",
        "latitude",
        "longitude",
    ];

    pub fn get(&self, key: &str) -> Option<&str> {
        let value = match key {
            "firstName" => &self.first_name,
            "lastName" => &self.last_name,
            "email" => &self.email,
            "phoneNumber" => &self.phone_number,
            "employeeID" => &self.employee_id,
            "designation" => &self.designation,
            "city" => &self.city,
            "country" => &self.country,
            "latitude" => &self.latitude,
            "longitude" => &self.longitude,
            _ => return None,
        };
        Some(value.as_str())
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) -> Result<(), FormError> {
        let slot = match key {
            "firstName" => &mut self.first_name,
            "lastName" => &mut self.last_name,
            "email" => &mut self.email,
            "phoneNumber" => &mut self.phone_number,
            "employeeID" => &mut self.employee_id,
            "designation" => &mut self.designation,
            "city" => &mut self.city,
            "country" => &mut self.country,
            "latitude" => &mut self.latitude,
            "longitude" => &mut self.longitude,
            _ => {
                return Err(FormError::UnknownField {
                    key: key.to_string(),
                })
            }
        };
        *slot = value.into();
        Ok(())
    }

    /// Keys that are still blank.
    pub fn missing(&self) -> Vec<&'static str> {
        Self::FIELDS
            .iter()
            .copied()
            .filter(|key| self.get(key).map(|v| v.trim().is_empty()).unwrap_or(true))
            .collect()
    }

    /// Presence check only; values are not otherwise validated.
    pub fn validate(&self) -> Result<(), FormError> {
        match self.missing().first().copied() {
            Some(field) => Err(FormError::MissingField { field }),
            None => Ok(()),
        }
    }
}

/// Human label for a camelCase form key, e.g. `phoneNumber` -> `Phone Number`.
pub fn field_label(key: &str) -> String {
    let Ok(re) = Regex::new(r"([a-z])([A-Z])") else {
        return key.to_string();
    };
    let spaced = re.replace_all(key, "$1 $2");
    spaced
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_numbers_and_nulls() {
        let raw = r#"{
            "Hiring_TestID": 17,
            "firstName": "Ayesha",
            "lastName": null,
            "city": "Lahore",
            "latitude": 31.5204,
            "longitude": "74.3587",
            "department": "ops"
        }"#;
        let e: Employee = serde_json::from_str(raw).unwrap();
        assert_eq!(e.hiring_test_id.as_deref(), Some("17"));
        assert_eq!(e.last_name, None);
        assert_eq!(e.country, None);
        assert_eq!(e.extra.get("department"), Some(&Value::from("ops")));
        let c = e.coordinates().unwrap();
        assert!((c.lat - 31.5204).abs() < 1e-9);
        assert!((c.lng - 74.3587).abs() < 1e-9);
    }

    #[test]
    fn missing_fields_render_placeholder() {
        let e = Employee {
            email: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(e.display(Field::Email), PLACEHOLDER);
        assert_eq!(e.display(Field::City), PLACEHOLDER);
        assert_eq!(e.full_name(), PLACEHOLDER);
    }

    #[test]
    fn coordinates_require_both_valid_values() {
        let mut e = Employee {
            latitude: Some("24.86".to_string()),
            ..Default::default()
        };
        assert!(e.coordinates().is_none());
        e.longitude = Some("".to_string());
        assert!(e.coordinates().is_none());
        e.longitude = Some("abc".to_string());
        assert!(e.coordinates().is_none());
        e.longitude = Some("67.0".to_string());
        assert!(e.coordinates().is_some());
        e.latitude = Some("123".to_string());
        assert!(e.coordinates().is_none());
    }

    #[test]
    fn field_parses_wire_names_and_aliases() {
        assert_eq!("Hiring_TestID".parse::<Field>(), Ok(Field::HiringTestId));
        assert_eq!("id".parse::<Field>(), Ok(Field::HiringTestId));
        assert_eq!("first-name".parse::<Field>(), Ok(Field::FirstName));
        assert_eq!("employeeID".parse::<Field>(), Ok(Field::EmployeeId));
        assert_eq!("LNG".parse::<Field>(), Ok(Field::Longitude));
        assert!("salary".parse::<Field>().is_err());
    }

    #[test]
    fn form_presence_check_reports_first_blank_field() {
        let mut form = NewEmployee::default();
        for key in NewEmployee::FIELDS {
            form.set(key, "x").unwrap();
        }
        assert_eq!(form.validate(), Ok(()));
        form.set("city", " ").unwrap();
        assert_eq!(
            form.validate(),
            Err(FormError::MissingField { field: "city" })
        );
        assert!(form.set("salary", "1").is_err());
    }

    #[test]
    fn form_serializes_wire_keys() {
        let form = NewEmployee {
            employee_id: "E-1".to_string(),
            phone_number: "0300".to_string(),
            ..Default::default()
        };
        let v = serde_json::to_value(&form).unwrap();
        assert_eq!(v["employeeID"], "E-1");
        assert_eq!(v["phoneNumber"], "0300");
        assert!(v.get("firstName").is_some());
    }

    #[test]
    fn labels_split_camel_case() {
        assert_eq!(field_label("phoneNumber"), "Phone Number");
        assert_eq!(field_label("firstName"), "First Name");
        assert_eq!(field_label("employeeID"), "Employee ID");
        assert_eq!(field_label("city"), "City");
    }

    #[test]
    fn coordinates_are_not_sort_keys() {
        let sortable: Vec<Field> = Field::ALL.into_iter().filter(|f| f.is_sort_key()).collect();
        assert_eq!(sortable, Field::SORT_KEYS);
        assert_eq!(Field::parse_sort_key(" City "), Ok(Field::City));
        assert!(Field::parse_sort_key("lat").is_err());
        assert_eq!("lon".parse::<Field>(), Ok(Field::Longitude));
    }
}
