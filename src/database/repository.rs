use sqlx::{self, postgres::PgRow, types::Json, FromRow, PgPool};
use uuid::Uuid;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{NewOrder, NewShop, Order, OrderRow, Owner, Shop, ShopRow, User};
use crate::types::OrderStatus;

/// A table backing one document collection
pub trait Collection: for<'r> FromRow<'r, PgRow> + Send + Unpin {
    const TABLE: &'static str;
    /// Human-readable name used in not-found messages
    const LABEL: &'static str;
}

impl Collection for User {
    const TABLE: &'static str = "users";
    const LABEL: &'static str = "User";
}

impl Collection for Owner {
    const TABLE: &'static str = "owners";
    const LABEL: &'static str = "Owner";
}

impl Collection for ShopRow {
    const TABLE: &'static str = "shops";
    const LABEL: &'static str = "Shop";
}

impl Collection for OrderRow {
    const TABLE: &'static str = "orders";
    const LABEL: &'static str = "Order";
}

pub struct Repository<T> {
    pool: PgPool,
    _phantom: std::marker::PhantomData<T>,
}

impl<T: Collection> Repository<T> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _phantom: std::marker::PhantomData,
        }
    }

    pub async fn select_one(&self, id: Uuid) -> Result<Option<T>, DatabaseError> {
        let sql = format!("SELECT * FROM {} WHERE id = $1", T::TABLE);
        let row = sqlx::query_as::<_, T>(&sql).bind(id).fetch_optional(&self.pool).await?;
        Ok(row)
    }

    pub async fn select_404(&self, id: Uuid) -> Result<T, DatabaseError> {
        self.select_one(id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("{} not found", T::LABEL)))
    }

    pub async fn delete_404(&self, id: Uuid) -> Result<T, DatabaseError> {
        let sql = format!("DELETE FROM {} WHERE id = $1 RETURNING *", T::TABLE);
        sqlx::query_as::<_, T>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("{} not found", T::LABEL)))
    }

    /// Map unique index violations on phone to a client-facing duplicate error
    fn duplicate_phone(err: sqlx::Error) -> DatabaseError {
        if DatabaseManager::is_unique_violation(&err) {
            DatabaseError::Duplicate(format!("{} with this phone already exists", T::LABEL))
        } else {
            DatabaseError::Sqlx(err)
        }
    }
}

impl Repository<User> {
    pub async fn find_by_phone(&self, phone: &str) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE phone = $1")
            .bind(phone)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn insert(&self, name: &str, phone: &str, password: &str) -> Result<User, DatabaseError> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (id, name, phone, password) VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(phone)
        .bind(password)
        .fetch_one(&self.pool)
        .await
        .map_err(Self::duplicate_phone)
    }
}

impl Repository<Owner> {
    pub async fn find_by_phone(&self, phone: &str) -> Result<Option<Owner>, DatabaseError> {
        let owner = sqlx::query_as::<_, Owner>("SELECT * FROM owners WHERE phone = $1")
            .bind(phone)
            .fetch_optional(&self.pool)
            .await?;
        Ok(owner)
    }

    pub async fn insert(&self, phone: &str, password: &str) -> Result<Owner, DatabaseError> {
        sqlx::query_as::<_, Owner>("INSERT INTO owners (id, phone, password) VALUES ($1, $2, $3) RETURNING *")
            .bind(Uuid::new_v4())
            .bind(phone)
            .bind(password)
            .fetch_one(&self.pool)
            .await
            .map_err(Self::duplicate_phone)
    }
}

/// Optional filters for listing shops
#[derive(Debug, Clone, Default)]
pub struct ShopFilter {
    pub shop_type: Option<String>,
    pub mobile: Option<String>,
}

impl Repository<ShopRow> {
    pub async fn insert(&self, shop: NewShop) -> Result<Shop, DatabaseError> {
        let row = sqlx::query_as::<_, ShopRow>(
            r#"
            INSERT INTO shops (id, shop_type, owner_name, mobile, shop_name, stock, image_urls)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&shop.shop_type)
        .bind(&shop.owner_name)
        .bind(&shop.mobile)
        .bind(&shop.shop_name)
        .bind(Json(&shop.stock))
        .bind(&shop.image_urls)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    /// Newest first. A `None` filter field matches everything.
    pub async fn list(&self, filter: &ShopFilter) -> Result<Vec<Shop>, DatabaseError> {
        let rows = sqlx::query_as::<_, ShopRow>(
            r#"
            SELECT * FROM shops
            WHERE ($1::TEXT IS NULL OR shop_type = $1)
              AND ($2::TEXT IS NULL OR mobile = $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(filter.shop_type.as_deref())
        .bind(filter.mobile.as_deref())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Shop::from).collect())
    }
}

impl Repository<OrderRow> {
    pub async fn insert(&self, order: NewOrder) -> Result<Order, DatabaseError> {
        let row = sqlx::query_as::<_, OrderRow>(
            r#"
            INSERT INTO orders
                (id, user_id, customer, shop, items, total_amount, delivery_charge, address, payment_method, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(order.user_id)
        .bind(Json(&order.user))
        .bind(&order.shop)
        .bind(Json(&order.items))
        .bind(order.total_amount)
        .bind(order.delivery_charge)
        .bind(Json(&order.address))
        .bind(order.payment_method.as_str())
        .bind(OrderStatus::Pending.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(Order::try_from(row)?)
    }

    pub async fn get(&self, id: Uuid) -> Result<Order, DatabaseError> {
        Ok(Order::try_from(self.select_404(id).await?)?)
    }

    /// A user's orders, newest first
    pub async fn by_user(&self, user_id: Uuid) -> Result<Vec<Order>, DatabaseError> {
        let rows = sqlx::query_as::<_, OrderRow>("SELECT * FROM orders WHERE user_id = $1 ORDER BY created_at DESC")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Self::into_orders(rows)
    }

    /// Orders in one status, oldest first so pending work is handled in arrival order
    pub async fn by_status(&self, status: OrderStatus) -> Result<Vec<Order>, DatabaseError> {
        let rows = sqlx::query_as::<_, OrderRow>("SELECT * FROM orders WHERE status = $1 ORDER BY created_at ASC")
            .bind(status.as_str())
            .fetch_all(&self.pool)
            .await?;
        Self::into_orders(rows)
    }

    /// Conditional update: only succeeds while the stored status still equals `from`.
    /// Returns `None` when no row matched (missing order or status already moved on).
    pub async fn transition(
        &self,
        id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<Option<Order>, DatabaseError> {
        let row = sqlx::query_as::<_, OrderRow>(
            "UPDATE orders SET status = $3 WHERE id = $1 AND status = $2 RETURNING *",
        )
        .bind(id)
        .bind(from.as_str())
        .bind(to.as_str())
        .fetch_optional(&self.pool)
        .await?;
        row.map(Order::try_from).transpose().map_err(DatabaseError::from)
    }

    fn into_orders(rows: Vec<OrderRow>) -> Result<Vec<Order>, DatabaseError> {
        rows.into_iter()
            .map(|row| Order::try_from(row).map_err(DatabaseError::from))
            .collect()
    }
}
