// src/models/vacancy.rs

//! Vacancy entity: normalization of raw records and salary ordering.
//!
//! Raw records come in two shapes:
//! - **remote**: as returned by the hh.ru API, with nested `employer` and
//!   `salary` objects and salaries in the vacancy's own currency
//! - **stored**: the flat [`VacancyRecord`] written to the local store,
//!   with `employer` as a string and `salary` already in RUB
//!
//! [`Vacancy::from_remote_record`] and [`Vacancy::from_stored_record`]
//! handle one shape each. [`Vacancy::from_record`] accepts either and
//! decides per field.

use std::cmp::Ordering;
use std::fmt;

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{AppError, Result};
use crate::models::RateTable;
use crate::utils::group_thousands;

/// hh.ru timestamp format, e.g. `2024-01-15T10:30:00+0300`.
const PUBLISHED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

/// Flat record shape used for storage and CSV export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VacancyRecord {
    pub id: String,
    pub url: Option<String>,
    pub name: Option<String>,
    pub employer: Option<String>,
    pub published_at: Option<String>,
    pub salary: Option<f64>,
}

/// A normalized vacancy.
///
/// Equality and ordering look at the salary only. A vacancy without a
/// salary is below every vacancy with one, is unordered against another
/// vacancy without one, and is never equal to anything, itself included.
#[derive(Debug, Clone)]
pub struct Vacancy {
    id: String,
    url: Option<String>,
    name: Option<String>,
    employer: Option<String>,
    published_at: Option<String>,
    salary: Option<f64>,
}

impl Vacancy {
    /// Build a vacancy from a record of either shape.
    ///
    /// A numeric `salary` is taken as already converted; a non-empty
    /// `salary` object is resolved against `rates`. An `employer` object
    /// contributes its `name`, a string is used as is.
    pub fn from_record(raw: &Value, rates: Option<&RateTable>) -> Result<Self> {
        let obj = as_object(raw)?;
        let id = extract_id(obj)?;

        let employer = match obj.get("employer") {
            Some(Value::Object(employer)) => string_field(employer, "name"),
            other => other.and_then(Value::as_str).map(str::to_owned),
        };
        let salary = match obj.get("salary") {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::Object(salary)) if !salary.is_empty() => {
                resolve_salary(salary, rates, false)?
            }
            _ => None,
        };

        Ok(Self::assemble(id, obj, employer, salary))
    }

    /// Build a vacancy from an hh.ru API record.
    ///
    /// A salary currency missing from `rates` leaves the figures
    /// unconverted.
    pub fn from_remote_record(raw: &Value, rates: Option<&RateTable>) -> Result<Self> {
        Self::remote(raw, rates, false)
    }

    /// Like [`Vacancy::from_remote_record`], but a salary currency missing
    /// from a non-empty `rates` table is an [`AppError::UnknownCurrency`].
    pub fn from_remote_record_strict(raw: &Value, rates: Option<&RateTable>) -> Result<Self> {
        Self::remote(raw, rates, true)
    }

    /// Build a vacancy from a flat stored record.
    pub fn from_stored_record(raw: &Value) -> Result<Self> {
        let obj = as_object(raw)?;
        let id = extract_id(obj)?;
        let employer = string_field(obj, "employer");
        let salary = obj.get("salary").and_then(Value::as_f64);
        Ok(Self::assemble(id, obj, employer, salary))
    }

    fn remote(raw: &Value, rates: Option<&RateTable>, strict: bool) -> Result<Self> {
        let obj = as_object(raw)?;
        let id = extract_id(obj)?;

        let employer = obj
            .get("employer")
            .and_then(Value::as_object)
            .and_then(|employer| string_field(employer, "name"));
        let salary = match obj.get("salary").and_then(Value::as_object) {
            Some(salary) if !salary.is_empty() => resolve_salary(salary, rates, strict)?,
            _ => None,
        };

        Ok(Self::assemble(id, obj, employer, salary))
    }

    fn assemble(
        id: String,
        obj: &Map<String, Value>,
        employer: Option<String>,
        salary: Option<f64>,
    ) -> Self {
        Self {
            id,
            url: string_field(obj, "url"),
            name: string_field(obj, "name"),
            employer,
            published_at: string_field(obj, "published_at"),
            salary,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn employer(&self) -> Option<&str> {
        self.employer.as_deref()
    }

    pub fn published_at(&self) -> Option<&str> {
        self.published_at.as_deref()
    }

    /// Salary in RUB, if any.
    pub fn salary(&self) -> Option<f64> {
        self.salary
    }

    /// Salary for sorting: vacancies without one sort below everything.
    pub fn salary_or_minimum(&self) -> f64 {
        self.salary.unwrap_or(f64::NEG_INFINITY)
    }

    /// Canonical flat shape for storage and export.
    pub fn to_record(&self) -> VacancyRecord {
        VacancyRecord {
            id: self.id.clone(),
            url: self.url.clone(),
            name: self.name.clone(),
            employer: self.employer.clone(),
            published_at: self.published_at.clone(),
            salary: self.salary,
        }
    }

    fn published_display(&self) -> String {
        match self.published_at.as_deref() {
            Some(raw) => DateTime::parse_from_str(raw, PUBLISHED_AT_FORMAT)
                .map(|dt| dt.format("%d.%m.%Y %H:%M").to_string())
                .unwrap_or_else(|_| raw.to_string()),
            None => "-".to_string(),
        }
    }
}

/// Comparator for "highest salary first"; stable when used with `sort_by`.
pub fn cmp_by_salary_desc(a: &Vacancy, b: &Vacancy) -> Ordering {
    b.salary_or_minimum().total_cmp(&a.salary_or_minimum())
}

/// Sort in place, highest salary first, salary-less vacancies last.
pub fn sort_by_salary_desc(vacancies: &mut [Vacancy]) {
    vacancies.sort_by(cmp_by_salary_desc);
}

/// The `n` best-paid vacancies.
pub fn top_by_salary(mut vacancies: Vec<Vacancy>, n: usize) -> Vec<Vacancy> {
    sort_by_salary_desc(&mut vacancies);
    vacancies.truncate(n);
    vacancies
}

impl From<&Vacancy> for VacancyRecord {
    fn from(vacancy: &Vacancy) -> Self {
        vacancy.to_record()
    }
}

impl PartialEq for Vacancy {
    fn eq(&self, other: &Self) -> bool {
        matches!((self.salary, other.salary), (Some(a), Some(b)) if a == b)
    }
}

impl PartialOrd for Vacancy {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self.salary, other.salary) {
            (None, None) => None,
            (None, Some(_)) => Some(Ordering::Less),
            (Some(_), None) => Some(Ordering::Greater),
            (Some(a), Some(b)) => a.partial_cmp(&b),
        }
    }
}

impl PartialEq<f64> for Vacancy {
    fn eq(&self, other: &f64) -> bool {
        self.salary == Some(*other)
    }
}

impl PartialOrd<f64> for Vacancy {
    fn partial_cmp(&self, other: &f64) -> Option<Ordering> {
        match self.salary {
            None => Some(Ordering::Less),
            Some(salary) => salary.partial_cmp(other),
        }
    }
}

impl fmt::Display for Vacancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let salary = match self.salary {
            Some(salary) => format!("{} ₽", group_thousands(salary.round() as i64)),
            None => "not specified".to_string(),
        };

        writeln!(f, "ID: {}", self.id)?;
        writeln!(f, "Vacancy: {}", self.name.as_deref().unwrap_or("-"))?;
        writeln!(f, "Employer: {}", self.employer.as_deref().unwrap_or("-"))?;
        writeln!(f, "URL: {}", self.url.as_deref().unwrap_or("-"))?;
        writeln!(f, "Published: {}", self.published_display())?;
        write!(f, "Salary: {salary}")
    }
}

fn as_object(raw: &Value) -> Result<&Map<String, Value>> {
    raw.as_object()
        .ok_or_else(|| AppError::invalid_record(json_kind(raw)))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn extract_id(obj: &Map<String, Value>) -> Result<String> {
    match obj.get("id") {
        Some(Value::String(id)) if !id.is_empty() => Ok(id.clone()),
        Some(Value::Number(id)) if id.as_f64() != Some(0.0) => Ok(id.to_string()),
        _ => Err(AppError::MissingId),
    }
}

fn string_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_owned)
}

/// Absent, null, zero and non-numeric bounds all count as 0.
fn bound(salary: &Map<String, Value>, key: &str) -> f64 {
    salary.get(key).and_then(Value::as_f64).unwrap_or(0.0)
}

/// Resolve a remote `{from, to, currency}` salary to RUB.
fn resolve_salary(
    salary: &Map<String, Value>,
    rates: Option<&RateTable>,
    strict: bool,
) -> Result<Option<f64>> {
    let mut from = bound(salary, "from");
    let mut to = bound(salary, "to");

    let currency = salary
        .get("currency")
        .and_then(Value::as_str)
        .filter(|code| !code.is_empty());
    let rates = rates.filter(|table| !table.is_empty());

    if let (Some(code), Some(rates)) = (currency, rates) {
        match rates.get(code).copied().filter(|rate| *rate != 0.0) {
            Some(rate) => {
                from /= rate;
                to /= rate;
            }
            None if strict => return Err(AppError::UnknownCurrency(code.to_string())),
            None => log::warn!("No rate for currency {code}, salary left unconverted"),
        }
    }

    let best = from.max(to);
    Ok((best > 0.0).then_some(best))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rates() -> RateTable {
        RateTable::from([("USD".to_string(), 75.0), ("EUR".to_string(), 90.0)])
    }

    fn with_salary(id: &str, salary: Option<f64>) -> Vacancy {
        Vacancy::from_stored_record(&json!({ "id": id, "salary": salary })).unwrap()
    }

    #[test]
    fn test_remote_record_is_normalized() {
        let raw = json!({
            "id": "1",
            "url": "http://example.com",
            "name": "Python Developer",
            "published_at": "2024-01-01",
            "employer": { "name": "Company XYZ", "id": "42" },
            "salary": { "from": 100000, "to": 150000, "currency": "USD" }
        });

        let vacancy = Vacancy::from_record(&raw, Some(&rates())).unwrap();

        assert_eq!(vacancy.id(), "1");
        assert_eq!(vacancy.url(), Some("http://example.com"));
        assert_eq!(vacancy.name(), Some("Python Developer"));
        assert_eq!(vacancy.published_at(), Some("2024-01-01"));
        assert_eq!(vacancy.employer(), Some("Company XYZ"));
        assert_eq!(vacancy.salary(), Some(2000.0));
    }

    #[test]
    fn test_salary_without_currency_is_kept() {
        let raw = json!({ "id": "1", "salary": { "from": 100000 } });
        let vacancy = Vacancy::from_record(&raw, None).unwrap();
        assert_eq!(vacancy.salary(), Some(100000.0));
    }

    #[test]
    fn test_salary_absent_or_empty_is_none() {
        for raw in [
            json!({ "id": "1" }),
            json!({ "id": "1", "salary": null }),
            json!({ "id": "1", "salary": {} }),
            json!({ "id": "1", "salary": "100000" }),
            json!({ "id": "1", "salary": { "from": null, "to": 0 } }),
        ] {
            let vacancy = Vacancy::from_record(&raw, Some(&rates())).unwrap();
            assert_eq!(vacancy.salary(), None, "raw: {raw}");
        }
    }

    #[test]
    fn test_stored_salary_is_used_directly() {
        let raw = json!({ "id": "1", "salary": 2000.5, "employer": "Company XYZ" });
        let vacancy = Vacancy::from_record(&raw, Some(&rates())).unwrap();
        assert_eq!(vacancy.salary(), Some(2000.5));
        assert_eq!(vacancy.employer(), Some("Company XYZ"));
    }

    #[test]
    fn test_unknown_currency_lenient_and_strict() {
        let raw = json!({ "id": "1", "salary": { "to": 5000, "currency": "GBP" } });

        let lenient = Vacancy::from_remote_record(&raw, Some(&rates())).unwrap();
        assert_eq!(lenient.salary(), Some(5000.0));

        let strict = Vacancy::from_remote_record_strict(&raw, Some(&rates()));
        assert!(matches!(strict, Err(AppError::UnknownCurrency(code)) if code == "GBP"));

        // Nothing to check against without a table.
        let no_table = Vacancy::from_remote_record_strict(&raw, None).unwrap();
        assert_eq!(no_table.salary(), Some(5000.0));
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(matches!(
            Vacancy::from_record(&json!("not a dict"), None),
            Err(AppError::InvalidRecord(_))
        ));
        assert!(matches!(
            Vacancy::from_record(&json!({}), None),
            Err(AppError::MissingId)
        ));
        assert!(matches!(
            Vacancy::from_record(&json!({ "id": "" }), None),
            Err(AppError::MissingId)
        ));
        assert!(matches!(
            Vacancy::from_stored_record(&json!([1, 2])),
            Err(AppError::InvalidRecord(_))
        ));
    }

    #[test]
    fn test_numeric_id_is_accepted() {
        let vacancy = Vacancy::from_record(&json!({ "id": 93012345 }), None).unwrap();
        assert_eq!(vacancy.id(), "93012345");
    }

    #[test]
    fn test_record_round_trip() {
        let raw = json!({
            "id": "3",
            "url": "http://example.com",
            "name": "C++ Developer",
            "published_at": "2024-02-01T09:00:00+0300",
            "employer": { "name": "Yandex" },
            "salary": { "from": 50000, "to": 70000, "currency": "EUR" }
        });
        let original = Vacancy::from_remote_record(&raw, Some(&rates())).unwrap();

        let stored = serde_json::to_value(original.to_record()).unwrap();
        let restored = Vacancy::from_stored_record(&stored).unwrap();

        assert_eq!(restored.to_record(), original.to_record());
        assert_eq!(
            stored,
            json!({
                "id": "3",
                "url": "http://example.com",
                "name": "C++ Developer",
                "employer": "Yandex",
                "published_at": "2024-02-01T09:00:00+0300",
                "salary": 70000.0 / 90.0
            })
        );
    }

    #[test]
    fn test_missing_salary_orders_below_present() {
        let none = with_salary("1", None);
        let low = with_salary("2", Some(1.0));

        assert!(none < low);
        assert!(low > none);
        assert!(none < 0.0);
        assert!(none != 0.0);
    }

    #[test]
    fn test_missing_salaries_are_never_equal() {
        let a = with_salary("1", None);
        let b = with_salary("2", None);

        assert!(a != b);
        assert!(a != a.clone());
        assert!(!(a < b));
        assert!(!(b < a));
    }

    #[test]
    fn test_present_salaries_compare_numerically() {
        let a = with_salary("1", Some(100000.0));
        let b = with_salary("2", Some(100000.0));
        let c = with_salary("3", Some(120000.0));

        assert!(a == b);
        assert!(a < c);
        assert!(a == 100000.0);
        assert!(c > 110000.0);
    }

    #[test]
    fn test_top_by_salary() {
        let vacancies = vec![
            with_salary("none-1", None),
            with_salary("mid", Some(120000.0)),
            with_salary("none-2", None),
            with_salary("high", Some(300000.0)),
            with_salary("low", Some(50000.0)),
        ];

        let ids: Vec<String> = top_by_salary(vacancies.clone(), 10)
            .iter()
            .map(|v| v.id().to_string())
            .collect();
        assert_eq!(ids, ["high", "mid", "low", "none-1", "none-2"]);

        let top = top_by_salary(vacancies, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].id(), "high");
    }

    #[test]
    fn test_display() {
        let raw = json!({
            "id": "7",
            "name": "Rust Developer",
            "employer": "Acme",
            "published_at": "2024-03-05T14:20:00+0300",
            "salary": 1234567.6
        });
        let text = Vacancy::from_stored_record(&raw).unwrap().to_string();

        assert!(text.starts_with("ID: 7\n"));
        assert!(text.contains("Vacancy: Rust Developer"));
        assert!(text.contains("Employer: Acme"));
        assert!(text.contains("URL: -"));
        assert!(text.contains("Published: 05.03.2024 14:20"));
        assert!(text.ends_with("Salary: 1 234 568 ₽"));

        let bare = Vacancy::from_stored_record(&json!({ "id": "8" })).unwrap();
        assert!(bare.to_string().ends_with("Salary: not specified"));
    }
}
