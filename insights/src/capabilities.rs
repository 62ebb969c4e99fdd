//! Field-type driven UI capabilities.
//!
//! Maps a column's declared storage type (`varchar`, `bigint`, `datetime`, ...) to the
//! filter operators the query editor offers for it and to the aggregation / format
//! entries of the column menu.
//!
//! Category membership is tested with independent checks, never an exclusive switch:
//!
//! | Resolver                 | Text      | Number    | Temporal                      |
//! |--------------------------|-----------|-----------|-------------------------------|
//! | `resolve_operators`      | appends   | appends   | appends (`date`..`timestamp`) |
//! | `resolve_menu_options`   | overwrites| overwrites| overwrites (datetime, date)   |
//!
//! Operator lists accumulate every matched category in declaration order, while menu
//! options keep only the last matching category. Unknown types fall through silently.

use serde::{Deserialize, Serialize};

#[cfg(feature = "utoipa")]
use utoipa::ToSchema;

const TEXT_TYPES: &[&str] = &["char", "varchar", "enum", "text", "longtext"];
const NUMBER_TYPES: &[&str] = &["int", "decimal", "bigint", "float", "double"];
const DATETIME_TYPES: &[&str] = &["datetime", "timestamp"];
const DATE_TYPES: &[&str] = &["date"];
/// Types offered range operators; wider than the menu's datetime/date split (includes `time`).
const TEMPORAL_TYPES: &[&str] = &["date", "datetime", "time", "timestamp"];

const UNIVERSAL_OPERATORS: &[(&str, &str)] = &[("equals", "="), ("not equals", "!="), ("is", "is")];

const TEXT_OPERATORS: &[(&str, &str)] = &[
    ("contains", "contains"),
    ("not contains", "not contains"),
    ("starts with", "starts with"),
    ("ends with", "ends with"),
    ("is one of", "in"),
    ("is not one of", "not in"),
];

const NUMBER_OPERATORS: &[(&str, &str)] = &[
    ("is one of", "in"),
    ("is not one of", "not in"),
    ("greater than", ">"),
    ("smaller than", "<"),
    ("greater than equal to", ">="),
    ("smaller than equal to", "<="),
    ("between", "between"),
];

const TEMPORAL_OPERATORS: &[(&str, &str)] = &[
    ("greater than", ">"),
    ("smaller than", "<"),
    ("greater than equal to", ">="),
    ("smaller than equal to", "<="),
    ("between", "between"),
    ("within", "timespan"),
];

const TEXT_AGGREGATIONS: &[(&str, &str)] = &[("Group By", "Group By"), ("Count", "Count"), ("Count if", "Count if")];

const NUMBER_AGGREGATIONS: &[(&str, &str)] = &[
    ("Group By", "Group By"),
    ("Count", "Count"),
    ("Count if", "Count if"),
    ("Sum", "Sum"),
    ("Minimum", "Min"),
    ("Maximum", "Max"),
    ("Average", "Avg"),
];

const TEMPORAL_AGGREGATIONS: &[(&str, &str)] = &[
    ("Group By", "Group By"),
    ("Count", "Count"),
    ("Count if", "Count if"),
    ("Minimum", "Min"),
    ("Maximum", "Max"),
];

const DATETIME_FORMATS: &[&str] = &[
    "Minute",
    "Hour",
    "Day",
    "Month",
    "Year",
    "Minute of Hour",
    "Hour of Day",
    "Day of Week",
    "Day of Month",
    "Day of Year",
    "Month of Year",
    "Quarter of Year",
];

// Distinct table, not a reordering of DATETIME_FORMATS.
const DATE_FORMATS: &[&str] = &[
    "Year",
    "Month",
    "Day",
    "Quarter of Year",
    "Month of Year",
    "Day of Year",
    "Day of Month",
    "Day of Week",
];

/// Lowercased column storage type. Any string is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct FieldType(String);

impl FieldType {
    pub fn new(raw: &str) -> Self {
        Self(raw.to_lowercase())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Partition of field types used by the column menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCategory {
    Text,
    Number,
    Date,
    DateTime,
}

impl TypeCategory {
    /// Member field types of the category, lowercase.
    pub const fn field_types(self) -> &'static [&'static str] {
        match self {
            TypeCategory::Text => TEXT_TYPES,
            TypeCategory::Number => NUMBER_TYPES,
            TypeCategory::Date => DATE_TYPES,
            TypeCategory::DateTime => DATETIME_TYPES,
        }
    }

    #[inline]
    pub fn contains(self, fieldtype: &FieldType) -> bool {
        self.field_types().contains(&fieldtype.as_str())
    }
}

fn is_temporal(fieldtype: &FieldType) -> bool {
    TEMPORAL_TYPES.contains(&fieldtype.as_str())
}

/// A `{label, value}` entry rendered in a filter dropdown.
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorOption {
    pub label: String,
    pub value: String,
}

impl OperatorOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// A `{label, value}` entry in the column menu.
pub type MenuOption = OperatorOption;

/// Column menu entries for one field type.
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MenuOptionSet {
    pub aggregation_options: Vec<MenuOption>,
    pub format_options: Vec<MenuOption>,
}

impl MenuOptionSet {
    pub fn is_empty(&self) -> bool {
        self.aggregation_options.is_empty() && self.format_options.is_empty()
    }
}

fn labelled(table: &[(&str, &str)]) -> Vec<OperatorOption> {
    table.iter().map(|(label, value)| OperatorOption::new(*label, *value)).collect()
}

fn self_labelled(table: &[&str]) -> Vec<MenuOption> {
    table.iter().map(|value| MenuOption::new(*value, *value)).collect()
}

/// Filter operators applicable to `fieldtype`.
///
/// Always starts with `equals`, `not equals` and `is`. An absent or empty field type
/// returns just those three.
pub fn resolve_operators(fieldtype: Option<&str>) -> Vec<OperatorOption> {
    let mut operators = labelled(UNIVERSAL_OPERATORS);

    let Some(raw) = fieldtype.filter(|raw| !raw.is_empty()) else {
        return operators;
    };
    let fieldtype = FieldType::new(raw);

    if TypeCategory::Text.contains(&fieldtype) {
        operators.extend(labelled(TEXT_OPERATORS));
    }
    if TypeCategory::Number.contains(&fieldtype) {
        operators.extend(labelled(NUMBER_OPERATORS));
    }
    if is_temporal(&fieldtype) {
        operators.extend(labelled(TEMPORAL_OPERATORS));
    }

    operators
}

/// Aggregation and format menu entries applicable to `fieldtype`.
///
/// Each matching category replaces what an earlier one assigned. An empty or unknown
/// field type yields empty lists.
pub fn resolve_menu_options(fieldtype: &str) -> MenuOptionSet {
    let fieldtype = FieldType::new(fieldtype);
    let mut menu = MenuOptionSet::default();

    if TypeCategory::Text.contains(&fieldtype) {
        menu.aggregation_options = labelled(TEXT_AGGREGATIONS);
    }
    if TypeCategory::Number.contains(&fieldtype) {
        menu.aggregation_options = labelled(NUMBER_AGGREGATIONS);
    }
    if TypeCategory::DateTime.contains(&fieldtype) {
        menu.aggregation_options = labelled(TEMPORAL_AGGREGATIONS);
        menu.format_options = self_labelled(DATETIME_FORMATS);
    }
    if TypeCategory::Date.contains(&fieldtype) {
        menu.aggregation_options = labelled(TEMPORAL_AGGREGATIONS);
        menu.format_options = self_labelled(DATE_FORMATS);
    }

    menu
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(options: &[OperatorOption]) -> Vec<&str> {
        options.iter().map(|option| option.value.as_str()).collect()
    }

    #[test]
    fn field_type_is_lowercased() {
        assert_eq!(FieldType::new("VarChar").as_str(), "varchar");
    }

    fn matching(fieldtype: &str) -> usize {
        let fieldtype = FieldType::new(fieldtype);
        [TypeCategory::Text, TypeCategory::Number, TypeCategory::DateTime, TypeCategory::Date]
            .into_iter()
            .filter(|category| category.contains(&fieldtype))
            .count()
    }

    #[test]
    fn categories_are_disjoint_in_the_fixed_tables() {
        for fieldtype in TEXT_TYPES.iter().chain(NUMBER_TYPES).chain(DATETIME_TYPES).chain(DATE_TYPES) {
            assert_eq!(matching(fieldtype), 1, "{fieldtype}");
        }
        assert_eq!(matching("time"), 0);
    }

    #[test]
    fn text_operators_follow_universal_ones() {
        let operators = resolve_operators(Some("longtext"));
        assert_eq!(
            values(&operators),
            vec!["=", "!=", "is", "contains", "not contains", "starts with", "ends with", "in", "not in"]
        );
    }

    #[test]
    fn time_gets_range_operators_but_no_menu() {
        let operators = resolve_operators(Some("time"));
        assert_eq!(operators.len(), 9);
        assert_eq!(operators.last(), Some(&OperatorOption::new("within", "timespan")));
        assert!(resolve_menu_options("time").is_empty());
    }

    #[test]
    fn number_menu_uses_short_values_and_long_labels() {
        let menu = resolve_menu_options("Decimal");
        let average = menu.aggregation_options.last().cloned();
        assert_eq!(average, Some(MenuOption::new("Average", "Avg")));
        assert!(menu.format_options.is_empty());
    }

    #[test]
    fn empty_menu_input_matches_nothing() {
        assert_eq!(resolve_menu_options(""), MenuOptionSet::default());
    }
}
