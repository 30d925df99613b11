use std::str::FromStr;
use std::sync::Arc;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{QueryBuilder, SqlitePool};
use time::format_description::well_known::Rfc3339;

use shared::{Category, Month, MonthAmounts, UpdateAmountRequest};

/// DbConnection manages all database operations for the budget store.
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

/// One row of the budget grid join. `month` and the amounts are NULL
/// when an item has no amount rows.
#[derive(Debug, sqlx::FromRow)]
pub struct BudgetRow {
    pub category: String,
    pub item_name: String,
    pub month: Option<String>,
    pub planned_amount: Option<f64>,
    pub actual_amount: Option<f64>,
}

/// Aggregated yearly totals for one category.
#[derive(Debug, sqlx::FromRow)]
pub struct SummaryRow {
    pub category: String,
    pub total_planned: f64,
    pub total_actual: f64,
    pub total_variance: f64,
}

impl DbConnection {
    /// Open (creating if necessary) the database at `url` and make sure
    /// the schema exists. Foreign keys are switched on for every
    /// connection so the item -> amounts delete cascade holds.
    pub async fn new(url: &str) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        Self::setup_schema(&pool).await?;

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// Initialize a test database with a unique name
    #[cfg(test)]
    pub async fn init_test() -> Result<Self, sqlx::Error> {
        // Shared-cache in-memory databases live as long as the pool
        // holds a connection; the unique name isolates parallel tests.
        let test_id = uuid::Uuid::new_v4().to_string();
        let db_url = format!("file:memdb_{}?mode=memory&cache=shared", test_id);

        Self::new(&db_url).await
    }

    /// Set up the required database schema
    async fn setup_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS budget_items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                category TEXT NOT NULL CHECK (category IN ('income', 'expenses')),
                item_name TEXT NOT NULL,
                created_at TEXT NOT NULL,
                UNIQUE (user_id, category, item_name)
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS budget_amounts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                budget_item_id INTEGER NOT NULL REFERENCES budget_items(id) ON DELETE CASCADE,
                month TEXT NOT NULL CHECK (month IN (
                    'Jan','Feb','Mar','Apr','May','Jun',
                    'Jul','Aug','Sep','Oct','Nov','Dec'
                )),
                planned_amount REAL NOT NULL DEFAULT 0 CHECK (planned_amount >= 0),
                actual_amount REAL NOT NULL DEFAULT 0 CHECK (actual_amount >= 0),
                updated_at TEXT NOT NULL,
                UNIQUE (budget_item_id, month)
            );
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Get the underlying SQLite pool
    pub fn pool(&self) -> &SqlitePool {
        &*self.pool
    }

    /// All items for one owner with their amount cells. Items come back
    /// grouped by category and name; month ordering is applied by the
    /// caller when reshaping.
    pub async fn budget_rows(&self, owner_id: i64) -> Result<Vec<BudgetRow>, sqlx::Error> {
        sqlx::query_as::<_, BudgetRow>(
            r#"
            SELECT bi.category, bi.item_name, ba.month, ba.planned_amount, ba.actual_amount
            FROM budget_items bi
            LEFT JOIN budget_amounts ba ON ba.budget_item_id = bi.id
            WHERE bi.user_id = ?
            ORDER BY bi.category, bi.item_name
            "#,
        )
        .bind(owner_id)
        .fetch_all(&*self.pool)
        .await
    }

    /// Resolve an item to its row id.
    pub async fn find_item_id(
        &self,
        owner_id: i64,
        category: Category,
        item_name: &str,
    ) -> Result<Option<i64>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT id FROM budget_items WHERE user_id = ? AND category = ? AND item_name = ?",
        )
        .bind(owner_id)
        .bind(category.as_str())
        .bind(item_name)
        .fetch_optional(&*self.pool)
        .await
    }

    /// Apply a sparse patch to one month cell and return the stored
    /// amounts. Only fields present in the patch are written; `None`
    /// means no row matched.
    pub async fn update_amounts(
        &self,
        item_id: i64,
        month: Month,
        patch: &UpdateAmountRequest,
    ) -> Result<Option<MonthAmounts>, sqlx::Error> {
        let mut builder = QueryBuilder::new("UPDATE budget_amounts SET ");

        let mut fields = builder.separated(", ");
        if let Some(planned) = patch.planned_amount {
            fields.push("planned_amount = ").push_bind_unseparated(planned);
        }
        if let Some(actual) = patch.actual_amount {
            fields.push("actual_amount = ").push_bind_unseparated(actual);
        }
        fields.push("updated_at = ").push_bind_unseparated(now_rfc3339());

        builder.push(" WHERE budget_item_id = ").push_bind(item_id);
        builder.push(" AND month = ").push_bind(month.as_str());
        builder.push(" RETURNING planned_amount, actual_amount");

        let row = builder
            .build_query_as::<(f64, f64)>()
            .fetch_optional(&*self.pool)
            .await?;

        Ok(row.map(|(planned, actual)| MonthAmounts { planned, actual }))
    }

    /// Create an item together with its twelve zeroed month rows in one
    /// transaction. Either all thirteen rows land or none do.
    pub async fn insert_item_with_months(
        &self,
        owner_id: i64,
        category: Category,
        item_name: &str,
    ) -> Result<i64, sqlx::Error> {
        let now = now_rfc3339();
        let mut tx = self.pool.begin().await?;

        let item_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO budget_items (user_id, category, item_name, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(owner_id)
        .bind(category.as_str())
        .bind(item_name)
        .bind(&now)
        .fetch_one(&mut *tx)
        .await?;

        for month in Month::ALL {
            sqlx::query(
                r#"
                INSERT INTO budget_amounts (budget_item_id, month, planned_amount, actual_amount, updated_at)
                VALUES (?, ?, 0, 0, ?)
                "#,
            )
            .bind(item_id)
            .bind(month.as_str())
            .bind(&now)
            .execute(&mut *tx)
            .await?;
        }

        // A failure above drops the transaction, which rolls it back
        // before the connection returns to the pool.
        tx.commit().await?;

        Ok(item_id)
    }

    /// Remove an item; the foreign-key cascade clears its amount rows.
    /// Returns false when nothing matched.
    pub async fn delete_item(
        &self,
        owner_id: i64,
        category: Category,
        item_name: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM budget_items WHERE user_id = ? AND category = ? AND item_name = ?",
        )
        .bind(owner_id)
        .bind(category.as_str())
        .bind(item_name)
        .execute(&*self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Yearly totals per category. Categories without amount rows are
    /// absent from the result.
    pub async fn summary_rows(&self, owner_id: i64) -> Result<Vec<SummaryRow>, sqlx::Error> {
        sqlx::query_as::<_, SummaryRow>(
            r#"
            SELECT
                bi.category,
                SUM(ba.planned_amount) AS total_planned,
                SUM(ba.actual_amount) AS total_actual,
                SUM(ba.actual_amount - ba.planned_amount) AS total_variance
            FROM budget_items bi
            JOIN budget_amounts ba ON ba.budget_item_id = bi.id
            WHERE bi.user_id = ?
            GROUP BY bi.category
            "#,
        )
        .bind(owner_id)
        .fetch_all(&*self.pool)
        .await
    }
}

/// Current time as an RFC 3339 string, the one timestamp format written
/// to the schema's TEXT columns.
pub(crate) fn now_rfc3339() -> String {
    time::OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default()
}
