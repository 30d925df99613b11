use shared::{
    BudgetData, BudgetSummary, Category, CategorySummary, CreateItemRequest, CreateItemResponse,
    DeleteItemResponse, Month, MonthAmounts, UpdateAmountRequest,
};
use tracing::info;

use crate::db::DbConnection;
use crate::error::BudgetError;

/// Business rules for the budget grid. Validation and error
/// classification live here; the SQL lives in the db module.
#[derive(Clone)]
pub struct BudgetService {
    db: DbConnection,
}

impl BudgetService {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// The full budget grid for one owner, reshaped from flat rows into
    /// category -> item -> month -> amounts. Both category keys are
    /// always present; an item without amount rows keeps an empty map.
    pub async fn budget(&self, owner_id: i64) -> Result<BudgetData, BudgetError> {
        let rows = self
            .db
            .budget_rows(owner_id)
            .await
            .map_err(|e| BudgetError::storage("Failed to fetch budget data", e))?;

        let mut data = BudgetData::default();
        for row in rows {
            let category = match row.category.parse::<Category>() {
                Ok(category) => category,
                // The schema CHECK admits only the two known categories
                Err(_) => continue,
            };

            let months = data
                .category_mut(category)
                .entry(row.item_name)
                .or_default();

            if let Some(month_text) = row.month {
                if let Ok(month) = month_text.parse::<Month>() {
                    months.insert(
                        month,
                        MonthAmounts {
                            planned: row.planned_amount.unwrap_or(0.0),
                            actual: row.actual_amount.unwrap_or(0.0),
                        },
                    );
                }
            }
        }

        Ok(data)
    }

    /// Update one month cell. At least one amount must be provided and
    /// amounts cannot be negative; the absent field keeps its value.
    pub async fn update_amount(
        &self,
        owner_id: i64,
        category: Category,
        item_name: &str,
        month: Month,
        patch: UpdateAmountRequest,
    ) -> Result<MonthAmounts, BudgetError> {
        if patch.is_empty() {
            return Err(BudgetError::Validation(
                "No amount provided to update".to_string(),
            ));
        }
        for (field, value) in [
            ("planned_amount", patch.planned_amount),
            ("actual_amount", patch.actual_amount),
        ] {
            if value.is_some_and(|v| v < 0.0) {
                return Err(BudgetError::Validation(format!(
                    "{} must be greater than or equal to 0",
                    field
                )));
            }
        }

        let item_id = self
            .db
            .find_item_id(owner_id, category, item_name)
            .await
            .map_err(|e| BudgetError::storage("Failed to update budget amount", e))?
            .ok_or_else(|| BudgetError::NotFound("Budget item not found".to_string()))?;

        self.db
            .update_amounts(item_id, month, &patch)
            .await
            .map_err(|e| BudgetError::storage("Failed to update budget amount", e))?
            .ok_or_else(|| BudgetError::NotFound("Budget amount record not found".to_string()))
    }

    /// Create a budget line item along with twelve zeroed month rows.
    pub async fn create_item(
        &self,
        owner_id: i64,
        request: CreateItemRequest,
    ) -> Result<CreateItemResponse, BudgetError> {
        let name_len = request.item_name.chars().count();
        if name_len == 0 {
            return Err(BudgetError::Validation(
                "item_name is not allowed to be empty".to_string(),
            ));
        }
        if name_len > 255 {
            return Err(BudgetError::Validation(
                "item_name length must be less than or equal to 255 characters".to_string(),
            ));
        }

        info!("Creating budget item '{}' under {}", request.item_name, request.category);

        let item_id = match self
            .db
            .insert_item_with_months(owner_id, request.category, &request.item_name)
            .await
        {
            Ok(id) => id,
            Err(e) if is_unique_violation(&e) => {
                return Err(BudgetError::Conflict(
                    "Budget item already exists".to_string(),
                ));
            }
            Err(e) => return Err(BudgetError::storage("Failed to create budget item", e)),
        };

        Ok(CreateItemResponse {
            id: item_id,
            category: request.category,
            item_name: request.item_name,
            message: "Budget item created successfully".to_string(),
        })
    }

    /// Delete an item; the store cascade removes its amount rows.
    pub async fn delete_item(
        &self,
        owner_id: i64,
        category: Category,
        item_name: &str,
    ) -> Result<DeleteItemResponse, BudgetError> {
        let deleted = self
            .db
            .delete_item(owner_id, category, item_name)
            .await
            .map_err(|e| BudgetError::storage("Failed to delete budget item", e))?;

        if !deleted {
            return Err(BudgetError::NotFound("Budget item not found".to_string()));
        }

        info!("Deleted budget item '{}' under {}", item_name, category);

        Ok(DeleteItemResponse {
            message: "Budget item deleted successfully".to_string(),
        })
    }

    /// Yearly totals per category plus the net position. Buckets start
    /// zeroed, so a category with no amounts reports zeros instead of
    /// going missing.
    pub async fn summary(&self, owner_id: i64) -> Result<BudgetSummary, BudgetError> {
        let rows = self
            .db
            .summary_rows(owner_id)
            .await
            .map_err(|e| BudgetError::storage("Failed to fetch budget summary", e))?;

        let mut summary = BudgetSummary::default();
        for row in rows {
            let bucket = match row.category.parse::<Category>() {
                Ok(Category::Income) => &mut summary.income,
                Ok(Category::Expenses) => &mut summary.expenses,
                Err(_) => continue,
            };
            *bucket = CategorySummary {
                planned: row.total_planned,
                actual: row.total_actual,
                variance: row.total_variance,
            };
        }

        summary.net = CategorySummary {
            planned: summary.income.planned - summary.expenses.planned,
            actual: summary.income.actual - summary.expenses.actual,
            variance: summary.income.variance - summary.expenses.variance,
        };

        Ok(summary)
    }
}

/// True when the error is a UNIQUE constraint firing.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}
