//! Date Picker
//!
//! Year, month and day selects submitting `YYYY-MM-DD`. The day select only
//! offers the days of the selected month.

use std::rc::Rc;

use forma::{
    Anchor, ConfigError, ControlList, ElementInternals, FieldValue, FormCodec, FormElement,
    FormElementDefinition, FormElementRegistry, InputControl, RawState, RenderTrigger, ValueState,
    ViewState,
};

pub const TAG: &str = "date-picker";

/// Years offered by default
pub const DEFAULT_YEARS: (i64, i64) = (1900, 2100);

/// Calendar date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Date {
    pub year: i64,
    pub month: u32,
    pub day: u32,
}

impl Date {
    /// Validated date
    pub fn new(year: i64, month: u32, day: u32) -> Option<Self> {
        if !(1..=9999).contains(&year) || !(1..=12).contains(&month) {
            return None;
        }
        if day == 0 || day > days_in_month(year, month) {
            return None;
        }
        Some(Self { year, month, day })
    }

    /// Parse `Y-M-D`, tolerating missing or extra leading zeros
    pub fn parse(text: &str) -> Option<Self> {
        let mut parts = text.trim().split('-');
        let year = component(parts.next()?, 4)?;
        let month = component(parts.next()?, 2)?;
        let day = component(parts.next()?, 2)?;
        if parts.next().is_some() {
            return None;
        }
        Self::new(year, u32::try_from(month).ok()?, u32::try_from(day).ok()?)
    }

    pub fn from_value_state(value: &ValueState) -> Option<Self> {
        let year = value.get("year")?.as_integer()?;
        let month = value.get("month")?.as_integer()?;
        let day = value.get("day")?.as_integer()?;
        Self::new(year, u32::try_from(month).ok()?, u32::try_from(day).ok()?)
    }

    pub fn to_value_state(self) -> ValueState {
        ValueState::from_entries([
            ("year", FieldValue::from(self.year)),
            ("month", FieldValue::from(self.month)),
            ("day", FieldValue::from(self.day)),
        ])
    }
}

impl std::fmt::Display for Date {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// Digits of one date component, with leading zeros stripped, at most `max_digits` long
fn component(text: &str, max_digits: usize) -> Option<i64> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let stripped = text.trim_start_matches('0');
    let digits = if stripped.is_empty() { "0" } else { stripped };
    if digits.len() > max_digits {
        return None;
    }
    digits.parse().ok()
}

pub fn is_leap_year(year: i64) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

pub fn days_in_month(year: i64, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

pub fn list_years(from: i64, to: i64) -> Vec<i64> {
    (from..=to).collect()
}

pub fn list_months() -> Vec<u32> {
    (1..=12).collect()
}

/// Days of a month; all 31 while year or month is unknown
pub fn list_days(year: Option<i64>, month: Option<u32>) -> Vec<u32> {
    let last = match (year, month) {
        (Some(year), Some(month)) if (1..=12).contains(&month) => days_in_month(year, month),
        // February of an unknown year
        (None, Some(2)) => 29,
        (None, Some(month)) if (1..=12).contains(&month) => days_in_month(2001, month),
        _ => 31,
    };
    (1..=last).collect()
}

fn options<T: ToString>(values: Vec<T>) -> Vec<String> {
    std::iter::once(String::new())
        .chain(values.into_iter().map(|v| v.to_string()))
        .collect()
}

pub fn codec() -> FormCodec {
    let to_text = |value: &ValueState| {
        Date::from_value_state(value).map_or(RawState::Absent, |d| RawState::Text(d.to_string()))
    };
    FormCodec::new()
        .with_value_to_submission(to_text)
        .with_submission_to_value(|submission| {
            submission
                .as_text()
                .and_then(Date::parse)
                .map(Date::to_value_state)
                .into()
        })
        .with_value_to_attribute(to_text)
        .with_attribute_to_value(|text| Date::parse(text).map(Date::to_value_state).into())
}

pub fn definition() -> FormElementDefinition {
    FormElementDefinition::new(TAG)
        .with_codec(codec())
        .with_type("date")
        .with_validation_message("Please enter a valid date.")
}

struct DatePickerView {
    year: Rc<InputControl>,
    month: Rc<InputControl>,
    day: Rc<InputControl>,
}

impl RenderTrigger for DatePickerView {
    fn request_render(&self, view: &ViewState) {
        let get = |name: &str| view.value.get(name).and_then(FieldValue::as_integer);
        let (year, month) = (get("year"), get("month"));

        let days = list_days(year, month.and_then(|m| u32::try_from(m).ok()));
        tracing::debug!("date-picker render: {} day options", days.len());
        self.day.set_options(options(days));

        for (select, name) in [(&self.year, "year"), (&self.month, "month"), (&self.day, "day")] {
            if let Some(value) = view.value.get(name) {
                select.set_value(&value.to_form_string());
            } else if view.value.is_empty() {
                select.set_value("");
            }
            select.set_disabled(view.disabled);
            select.set_read_only(view.read_only);
            select.set_required(view.required);
        }
    }
}

/// Date picker element with its nested selects
pub struct DatePicker {
    pub element: Rc<FormElement>,
    pub internals: Rc<ElementInternals>,
    pub year: Rc<InputControl>,
    pub month: Rc<InputControl>,
    pub day: Rc<InputControl>,
}

impl DatePicker {
    pub fn new(registry: &FormElementRegistry) -> Result<Self, ConfigError> {
        Self::with_years(registry, DEFAULT_YEARS.0, DEFAULT_YEARS.1)
    }

    /// Build a picker offering the years `from..=to`
    pub fn with_years(
        registry: &FormElementRegistry,
        from: i64,
        to: i64,
    ) -> Result<Self, ConfigError> {
        let year = Rc::new(InputControl::select("year", options(list_years(from, to))));
        let month = Rc::new(InputControl::select("month", options(list_months())));
        let day = Rc::new(InputControl::select("day", options(list_days(None, None))));

        let controls = Rc::new(ControlList::new(vec![
            year.clone() as Anchor,
            month.clone() as Anchor,
            day.clone() as Anchor,
        ]));
        let internals = Rc::new(ElementInternals::new(controls.clone()));
        let view = Rc::new(DatePickerView {
            year: year.clone(),
            month: month.clone(),
            day: day.clone(),
        });
        let element = registry
            .builder(TAG)?
            .nested(controls)
            .internals(internals.clone())
            .render(view)
            .build()?;

        Ok(Self {
            element: Rc::new(element),
            internals,
            year,
            month,
            day,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format() {
        let date = Date::new(2024, 3, 5).unwrap();
        assert_eq!(date.to_string(), "2024-03-05");
    }

    #[test]
    fn test_loose_parse() {
        assert_eq!(Date::parse("0099-1-2"), Date::new(99, 1, 2));
        assert_eq!(Date::parse("2024-003-05"), Date::new(2024, 3, 5));
        assert_eq!(Date::parse(" 2024-12-31 "), Date::new(2024, 12, 31));
    }

    #[test]
    fn test_malformed() {
        assert!(Date::parse("not-a-date").is_none());
        assert!(Date::parse("2024-13-01").is_none());
        assert!(Date::parse("2023-02-29").is_none());
        assert!(Date::parse("12345-01-01").is_none());
        assert!(Date::parse("2024-01").is_none());
        assert!(Date::parse("2024-01-01-01").is_none());
        assert!(Date::parse("0000-01-01").is_none());
    }

    #[test]
    fn test_days() {
        assert_eq!(list_days(Some(2024), Some(2)).len(), 29);
        assert_eq!(list_days(Some(2023), Some(2)).len(), 28);
        assert_eq!(list_days(Some(1900), Some(2)).len(), 28);
        assert_eq!(list_days(None, Some(2)).len(), 29);
        assert_eq!(list_days(None, Some(4)).len(), 30);
        assert_eq!(list_days(Some(2024), None).len(), 31);
    }

    #[test]
    fn test_lists() {
        assert_eq!(list_months().len(), 12);
        assert_eq!(list_years(2020, 2022), vec![2020, 2021, 2022]);
        assert_eq!(options(vec![1, 2]), vec!["", "1", "2"]);
    }
}
