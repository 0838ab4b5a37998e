//! Repository implementations cho SQLite
//!
//! Mỗi method single-statement nhận bất kỳ `SqliteExecutor` nào: `&SqlitePool`
//! cho ambient connection, hoặc `&mut *tx` để chạy trong một unit of work.
//! Method nhiều statement nhận `&mut SqliteConnection` (tx deref thành connection).

use crate::error::{PersistenceError, PersistenceResult};
use crate::sqlite::schema::*;
use chrono::Utc;
use creditline_core::{
    LimitMutation, LoanTransaction, NewMutation, Tenor, TenorLimit, TransactionRequest,
    TransactionStatus,
};
use rust_decimal::Decimal;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{SqliteConnection, SqliteExecutor, SqlitePool};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

// ============================================================================
// Customer Repository
// ============================================================================

const CUSTOMER_SELECT: &str = r#"
    SELECT c.id, c.email, c.full_name, r.name AS role, c.created_at, c.updated_at
    FROM customers c
    INNER JOIN roles r ON r.id = c.role_id
"#;

/// Repository cho customers table
pub struct CustomerRepo;

impl CustomerRepo {
    /// Thêm customer mới, role được resolve theo tên
    pub async fn insert<'e, E>(executor: E, customer: &NewCustomer) -> PersistenceResult<i64>
    where
        E: SqliteExecutor<'e>,
    {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO customers (email, full_name, role_id, created_at, updated_at)
            SELECT ?, ?, id, ?, ? FROM roles WHERE name = ?
            "#,
        )
        .bind(&customer.email)
        .bind(&customer.full_name)
        .bind(now)
        .bind(now)
        .bind(&customer.role)
        .execute(executor)
        .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::not_found("Role", &customer.role));
        }
        Ok(result.last_insert_rowid())
    }

    /// Lấy customer theo ID
    pub async fn find_by_id<'e, E>(executor: E, id: i64) -> PersistenceResult<CustomerRow>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, CustomerRow>(&format!("{} WHERE c.id = ?", CUSTOMER_SELECT))
            .bind(id)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| PersistenceError::not_found("Customer", id))
    }

    /// Kiểm tra customer có tồn tại không
    pub async fn exists<'e, E>(executor: E, id: i64) -> PersistenceResult<bool>
    where
        E: SqliteExecutor<'e>,
    {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM customers WHERE id = ?")
            .bind(id)
            .fetch_one(executor)
            .await?;
        Ok(row.0 > 0)
    }

    /// Lấy exclusive lock trên customer row.
    ///
    /// Phải là statement đầu tiên của unit of work: write đầu tiên giữ write
    /// lock tới khi commit/rollback, và chờ tối đa `busy_timeout` nếu
    /// unit of work khác đang giữ.
    ///
    /// Trên SQLite write lock là của cả database: unit of work của các
    /// customer khác nhau cũng chạy lần lượt.
    pub async fn lock<'e, E>(executor: E, id: i64) -> PersistenceResult<()>
    where
        E: SqliteExecutor<'e>,
    {
        let result =
            sqlx::query("UPDATE customers SET lock_version = lock_version + 1 WHERE id = ?")
                .bind(id)
                .execute(executor)
                .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::not_found("Customer", id));
        }
        Ok(())
    }

    /// Lock owner của một limit, trả về owner id.
    ///
    /// `None` nghĩa là limit không tồn tại hoặc không có owner; caller tự
    /// phân biệt hai trường hợp.
    pub async fn lock_owner_of_limit<'e, E>(
        executor: E,
        limit_id: i64,
    ) -> PersistenceResult<Option<i64>>
    where
        E: SqliteExecutor<'e>,
    {
        let owner = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE customers SET lock_version = lock_version + 1
            WHERE id = (
                SELECT customer_id FROM customer_has_tenor_limit
                WHERE tenor_limit_id = ?
                LIMIT 1
            )
            RETURNING id
            "#,
        )
        .bind(limit_id)
        .fetch_optional(executor)
        .await?;
        Ok(owner)
    }

    /// Đổi role của customer
    pub async fn assign_role(
        conn: &mut SqliteConnection,
        id: i64,
        role: &str,
    ) -> PersistenceResult<()> {
        let role_id = sqlx::query_scalar::<_, i64>("SELECT id FROM roles WHERE name = ?")
            .bind(role)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| PersistenceError::not_found("Role", role))?;

        let result = sqlx::query("UPDATE customers SET role_id = ?, updated_at = ? WHERE id = ?")
            .bind(role_id)
            .bind(Utc::now())
            .bind(id)
            .execute(&mut *conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::not_found("Customer", id));
        }
        Ok(())
    }
}

// ============================================================================
// Permission Repository
// ============================================================================

/// Repository cho roles / permissions tables
pub struct PermissionRepo;

impl PermissionRepo {
    /// Lấy tên permissions của customer qua role hiện tại
    pub async fn names_for_customer<'e, E>(
        executor: E,
        customer_id: i64,
    ) -> PersistenceResult<Vec<String>>
    where
        E: SqliteExecutor<'e>,
    {
        let rows = sqlx::query_scalar::<_, Option<String>>(
            r#"
            SELECT p.name
            FROM customers c
            INNER JOIN roles r ON r.id = c.role_id
            LEFT JOIN role_has_permissions rp ON rp.role_id = r.id
            LEFT JOIN permissions p ON p.id = rp.permission_id
            WHERE c.id = ?
            ORDER BY p.name
            "#,
        )
        .bind(customer_id)
        .fetch_all(executor)
        .await?;

        if rows.is_empty() {
            return Err(PersistenceError::not_found("Customer", customer_id));
        }
        Ok(rows.into_iter().flatten().collect())
    }

    /// Lấy tất cả role names
    pub async fn role_names<'e, E>(executor: E) -> PersistenceResult<Vec<String>>
    where
        E: SqliteExecutor<'e>,
    {
        let rows = sqlx::query_scalar::<_, String>("SELECT name FROM roles ORDER BY name")
            .fetch_all(executor)
            .await?;
        Ok(rows)
    }
}

// ============================================================================
// Limit Repository
// ============================================================================

const LIMIT_BY_CUSTOMER: &str = r#"
    SELECT tl.id, tl.tenor_month, tl.limit_amount, tl.created_at, tl.updated_at
    FROM tenor_limits tl
    INNER JOIN customer_has_tenor_limit chtl ON tl.id = chtl.tenor_limit_id
    WHERE chtl.customer_id = ?
"#;

/// Repository cho tenor_limits + customer_has_tenor_limit
pub struct LimitRepo;

impl LimitRepo {
    /// Tạo limit và gắn với customer
    pub async fn create(
        conn: &mut SqliteConnection,
        customer_id: i64,
        tenor: Tenor,
        amount: Decimal,
    ) -> PersistenceResult<TenorLimit> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO tenor_limits (tenor_month, limit_amount, created_at, updated_at) VALUES (?, ?, ?, ?)",
        )
        .bind(tenor.months())
        .bind(amount.to_string())
        .bind(now)
        .bind(now)
        .execute(&mut *conn)
        .await?;
        let id = result.last_insert_rowid();

        sqlx::query(
            "INSERT INTO customer_has_tenor_limit (customer_id, tenor_limit_id) VALUES (?, ?)",
        )
        .bind(customer_id)
        .bind(id)
        .execute(&mut *conn)
        .await?;

        Ok(TenorLimit {
            id,
            tenor,
            limit_amount: amount,
            created_at: now,
            updated_at: now,
        })
    }

    /// Lấy limit theo ID
    pub async fn find_by_id<'e, E>(executor: E, id: i64) -> PersistenceResult<TenorLimit>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, TenorLimitRow>("SELECT * FROM tenor_limits WHERE id = ?")
            .bind(id)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| PersistenceError::not_found("TenorLimit", id))?
            .try_into()
    }

    /// Lấy tất cả limits của customer, tenor tăng dần
    pub async fn find_by_customer<'e, E>(
        executor: E,
        customer_id: i64,
    ) -> PersistenceResult<Vec<TenorLimit>>
    where
        E: SqliteExecutor<'e>,
    {
        let rows = sqlx::query_as::<_, TenorLimitRow>(&format!(
            "{} ORDER BY tl.tenor_month ASC, tl.id ASC",
            LIMIT_BY_CUSTOMER
        ))
        .bind(customer_id)
        .fetch_all(executor)
        .await?;
        convert_all(rows)
    }

    /// Lấy limit của customer cho một tenor
    pub async fn find_for_tenor<'e, E>(
        executor: E,
        customer_id: i64,
        tenor: Tenor,
    ) -> PersistenceResult<Option<TenorLimit>>
    where
        E: SqliteExecutor<'e>,
    {
        let row = sqlx::query_as::<_, TenorLimitRow>(&format!(
            "{} AND tl.tenor_month = ? ORDER BY tl.id ASC LIMIT 1",
            LIMIT_BY_CUSTOMER
        ))
        .bind(customer_id)
        .bind(tenor.months())
        .fetch_optional(executor)
        .await?;
        row.map(TenorLimit::try_from).transpose()
    }

    /// Lấy owner (customer id) của limit
    pub async fn owner_of<'e, E>(executor: E, limit_id: i64) -> PersistenceResult<i64>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_scalar::<_, i64>(
            "SELECT customer_id FROM customer_has_tenor_limit WHERE tenor_limit_id = ? LIMIT 1",
        )
        .bind(limit_id)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| PersistenceError::not_found("LimitOwner", limit_id))
    }

    /// Cập nhật tenor và amount
    pub async fn update<'e, E>(
        executor: E,
        id: i64,
        tenor: Tenor,
        amount: Decimal,
    ) -> PersistenceResult<()>
    where
        E: SqliteExecutor<'e>,
    {
        let result = sqlx::query(
            "UPDATE tenor_limits SET tenor_month = ?, limit_amount = ?, updated_at = ? WHERE id = ?",
        )
        .bind(tenor.months())
        .bind(amount.to_string())
        .bind(Utc::now())
        .bind(id)
        .execute(executor)
        .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::not_found("TenorLimit", id));
        }
        Ok(())
    }

    /// Xóa limit cùng liên kết owner
    pub async fn delete(conn: &mut SqliteConnection, id: i64) -> PersistenceResult<()> {
        sqlx::query("DELETE FROM customer_has_tenor_limit WHERE tenor_limit_id = ?")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        let result = sqlx::query("DELETE FROM tenor_limits WHERE id = ?")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::not_found("TenorLimit", id));
        }
        Ok(())
    }
}

// ============================================================================
// Transaction Repository
// ============================================================================

/// Repository cho transactions table
pub struct TransactionRepo;

impl TransactionRepo {
    /// Thêm transaction mới
    ///
    /// Contract number trùng trả về `UniqueViolation`.
    pub async fn insert<'e, E>(
        executor: E,
        customer_id: i64,
        tenor: Tenor,
        request: &TransactionRequest,
        status: TransactionStatus,
    ) -> PersistenceResult<LoanTransaction>
    where
        E: SqliteExecutor<'e>,
    {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO transactions (customer_id, contract_number, otr, admin_fee, installment_amount,
                                      interest_amount, asset_name, status, tenor, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(customer_id)
        .bind(&request.contract_number)
        .bind(request.otr.to_string())
        .bind(request.admin_fee.to_string())
        .bind(request.installment_amount.to_string())
        .bind(request.interest_amount.to_string())
        .bind(&request.asset_name)
        .bind(status.as_str())
        .bind(tenor.months())
        .bind(now)
        .bind(now)
        .execute(executor)
        .await?;

        Ok(LoanTransaction {
            id: result.last_insert_rowid(),
            customer_id,
            contract_number: request.contract_number.clone(),
            otr: request.otr,
            admin_fee: request.admin_fee,
            installment_amount: request.installment_amount,
            interest_amount: request.interest_amount,
            asset_name: request.asset_name.clone(),
            tenor,
            status,
            created_at: now,
            updated_at: now,
        })
    }

    /// Lấy transaction theo ID
    pub async fn find_by_id<'e, E>(executor: E, id: i64) -> PersistenceResult<LoanTransaction>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, TransactionRow>("SELECT * FROM transactions WHERE id = ?")
            .bind(id)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| PersistenceError::not_found("Transaction", id))?
            .try_into()
    }

    /// Lấy transactions theo customer, mới nhất trước
    pub async fn find_by_customer<'e, E>(
        executor: E,
        customer_id: i64,
    ) -> PersistenceResult<Vec<LoanTransaction>>
    where
        E: SqliteExecutor<'e>,
    {
        let rows = sqlx::query_as::<_, TransactionRow>(
            "SELECT * FROM transactions WHERE customer_id = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(customer_id)
        .fetch_all(executor)
        .await?;
        convert_all(rows)
    }

    /// Lấy một trang transactions của customer kèm tổng số
    pub async fn find_by_customer_paginated(
        conn: &mut SqliteConnection,
        customer_id: i64,
        offset: i64,
        limit: i64,
    ) -> PersistenceResult<(Vec<LoanTransaction>, i64)> {
        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM transactions WHERE customer_id = ?")
            .bind(customer_id)
            .fetch_one(&mut *conn)
            .await?;

        let rows = sqlx::query_as::<_, TransactionRow>(
            r#"
            SELECT * FROM transactions
            WHERE customer_id = ?
            ORDER BY created_at DESC, id DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(customer_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&mut *conn)
        .await?;

        Ok((convert_all(rows)?, total.0))
    }

    /// Cập nhật status
    pub async fn update_status<'e, E>(
        executor: E,
        id: i64,
        status: TransactionStatus,
    ) -> PersistenceResult<()>
    where
        E: SqliteExecutor<'e>,
    {
        let result = sqlx::query("UPDATE transactions SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(Utc::now())
            .bind(id)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::not_found("Transaction", id));
        }
        Ok(())
    }

    /// Xóa transaction
    pub async fn delete<'e, E>(executor: E, id: i64) -> PersistenceResult<()>
    where
        E: SqliteExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM transactions WHERE id = ?")
            .bind(id)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::not_found("Transaction", id));
        }
        Ok(())
    }

    /// Đếm transactions
    pub async fn count<'e, E>(executor: E) -> PersistenceResult<i64>
    where
        E: SqliteExecutor<'e>,
    {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM transactions")
            .fetch_one(executor)
            .await?;
        Ok(row.0)
    }
}

// ============================================================================
// Mutation Repository (append-only ledger)
// ============================================================================

/// Repository cho limit_mutations table.
///
/// Chỉ có `append` và các query đọc; không có update/delete.
pub struct MutationRepo;

impl MutationRepo {
    /// Ghi một entry vào ledger
    pub async fn append<'e, E>(executor: E, entry: &NewMutation) -> PersistenceResult<LimitMutation>
    where
        E: SqliteExecutor<'e>,
    {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO limit_mutations (customer_id, tenor_limit_id, old_amount, new_amount, reason, action, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(entry.customer_id)
        .bind(entry.tenor_limit_id)
        .bind(entry.old_amount.to_string())
        .bind(entry.new_amount.to_string())
        .bind(&entry.reason)
        .bind(entry.action.as_str())
        .bind(now)
        .execute(executor)
        .await?;

        Ok(LimitMutation {
            id: result.last_insert_rowid(),
            customer_id: entry.customer_id,
            tenor_limit_id: entry.tenor_limit_id,
            old_amount: entry.old_amount,
            new_amount: entry.new_amount,
            reason: entry.reason.clone(),
            action: entry.action,
            created_at: now,
        })
    }

    /// Lấy mutations của customer, mới nhất trước
    pub async fn find_by_customer<'e, E>(
        executor: E,
        customer_id: i64,
    ) -> PersistenceResult<Vec<LimitMutation>>
    where
        E: SqliteExecutor<'e>,
    {
        let rows = sqlx::query_as::<_, LimitMutationRow>(
            "SELECT * FROM limit_mutations WHERE customer_id = ? ORDER BY id DESC",
        )
        .bind(customer_id)
        .fetch_all(executor)
        .await?;
        convert_all(rows)
    }

    /// Lấy mutations của một limit, mới nhất trước
    pub async fn find_by_limit<'e, E>(
        executor: E,
        tenor_limit_id: i64,
    ) -> PersistenceResult<Vec<LimitMutation>>
    where
        E: SqliteExecutor<'e>,
    {
        let rows = sqlx::query_as::<_, LimitMutationRow>(
            "SELECT * FROM limit_mutations WHERE tenor_limit_id = ? ORDER BY id DESC",
        )
        .bind(tenor_limit_id)
        .fetch_all(executor)
        .await?;
        convert_all(rows)
    }
}

// ============================================================================
// Database initialization
// ============================================================================

/// Khởi tạo connection pool.
///
/// WAL mode để reader không chặn writer; `busy_timeout` là thời gian chờ
/// tối đa cho per-customer lock.
pub async fn create_pool(
    database_url: &str,
    max_connections: u32,
    busy_timeout: Duration,
) -> PersistenceResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(busy_timeout);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;
    debug!(database_url, max_connections, ?busy_timeout, "sqlite pool opened");
    Ok(pool)
}

/// Chạy migrations
pub async fn run_migrations(pool: &SqlitePool) -> PersistenceResult<()> {
    sqlx::migrate!("../../migrations").run(pool).await?;
    info!("database migrations applied");
    Ok(())
}

/// Tạo pool và chạy migrations
pub async fn init_database(
    database_url: &str,
    max_connections: u32,
    busy_timeout: Duration,
) -> PersistenceResult<SqlitePool> {
    let pool = create_pool(database_url, max_connections, busy_timeout).await?;
    run_migrations(&pool).await?;
    Ok(pool)
}
