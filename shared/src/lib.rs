use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Budget category: every line item is either money coming in or money
/// going out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Income,
    Expenses,
}

impl Category {
    /// The lowercase form used in URLs, JSON, and the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Income => "income",
            Category::Expenses => "expenses",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(Category::Income),
            "expenses" => Ok(Category::Expenses),
            _ => Err(ParseCategoryError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParseCategoryError(String);

impl fmt::Display for ParseCategoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "category must be one of [income, expenses], got '{}'", self.0)
    }
}

impl std::error::Error for ParseCategoryError {}

/// Calendar month as the three-letter abbreviation used throughout the
/// API and the database. Declaration order is calendar order, so the
/// derived `Ord` sorts Jan through Dec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Month {
    Jan,
    Feb,
    Mar,
    Apr,
    May,
    Jun,
    Jul,
    Aug,
    Sep,
    Oct,
    Nov,
    Dec,
}

impl Month {
    /// All twelve months in calendar order. The single ordered table
    /// used for seeding new items and anywhere month order matters.
    pub const ALL: [Month; 12] = [
        Month::Jan,
        Month::Feb,
        Month::Mar,
        Month::Apr,
        Month::May,
        Month::Jun,
        Month::Jul,
        Month::Aug,
        Month::Sep,
        Month::Oct,
        Month::Nov,
        Month::Dec,
    ];

    /// The abbreviation stored in the database and used in URLs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Month::Jan => "Jan",
            Month::Feb => "Feb",
            Month::Mar => "Mar",
            Month::Apr => "Apr",
            Month::May => "May",
            Month::Jun => "Jun",
            Month::Jul => "Jul",
            Month::Aug => "Aug",
            Month::Sep => "Sep",
            Month::Oct => "Oct",
            Month::Nov => "Nov",
            Month::Dec => "Dec",
        }
    }

    /// 1-based calendar position (Jan = 1, Dec = 12).
    pub fn ordinal(&self) -> u8 {
        *self as u8 + 1
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Month {
    type Err = ParseMonthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Month::ALL
            .iter()
            .find(|month| month.as_str() == s)
            .copied()
            .ok_or_else(|| ParseMonthError(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParseMonthError(String);

impl fmt::Display for ParseMonthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "month must be a three-letter abbreviation like 'Jan', got '{}'", self.0)
    }
}

impl std::error::Error for ParseMonthError {}

/// Planned and actual amounts for one item in one month. Also the body
/// returned by the update-amount endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthAmounts {
    pub planned: f64,
    pub actual: f64,
}

/// Month cells for a single item, keyed by month in calendar order.
pub type ItemMonths = BTreeMap<Month, MonthAmounts>;

/// The full budget grid for one owner. BTreeMap keys keep items
/// alphabetical and months in calendar order when serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BudgetData {
    pub income: BTreeMap<String, ItemMonths>,
    pub expenses: BTreeMap<String, ItemMonths>,
}

impl BudgetData {
    /// The item map for one category.
    pub fn category_mut(&mut self, category: Category) -> &mut BTreeMap<String, ItemMonths> {
        match category {
            Category::Income => &mut self.income,
            Category::Expenses => &mut self.expenses,
        }
    }
}

/// Partial update for one month cell. At least one field must be set;
/// an absent field keeps its stored value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct UpdateAmountRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub planned_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_amount: Option<f64>,
}

impl UpdateAmountRequest {
    /// Request that sets only the planned amount.
    pub fn planned(value: f64) -> Self {
        Self {
            planned_amount: Some(value),
            actual_amount: None,
        }
    }

    /// Request that sets only the actual amount.
    pub fn actual(value: f64) -> Self {
        Self {
            planned_amount: None,
            actual_amount: Some(value),
        }
    }

    /// True when neither field is present.
    pub fn is_empty(&self) -> bool {
        self.planned_amount.is_none() && self.actual_amount.is_none()
    }
}

/// Request to add a budget line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateItemRequest {
    pub category: Category,
    pub item_name: String,
}

/// Response after creating a budget item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateItemResponse {
    pub id: i64,
    pub category: Category,
    pub item_name: String,
    pub message: String,
}

/// Response after deleting a budget item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteItemResponse {
    pub message: String,
}

/// Yearly totals for one category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct CategorySummary {
    pub planned: f64,
    pub actual: f64,
    /// Actual minus planned, summed over all items and months.
    pub variance: f64,
}

/// Totals per category plus the derived net position
/// (income minus expenses, component-wise).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct BudgetSummary {
    pub income: CategorySummary,
    pub expenses: CategorySummary,
    pub net: CategorySummary,
}

/// Response from the health endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    /// RFC 3339 timestamp taken when the request was served.
    pub timestamp: String,
}

/// The uniform error body produced by the backend for every non-2xx
/// response and parsed by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
