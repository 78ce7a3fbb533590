use std::collections::HashMap;

use bigdecimal::BigDecimal;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::order::{OrderItemView, OrderView};
use crate::domain::ports::OrderRepository;
use crate::schema::{cart_items, order_items, orders, products};

use super::models::{CartItemRow, NewOrderItemRow, NewOrderRow, OrderItemRow, OrderRow, ProductRow};

pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl OrderRepository for DieselOrderRepository {
    /// Cart-to-order transition. Everything runs in one transaction:
    ///
    /// 1. Load the user's cart lines; an empty cart aborts before any write.
    /// 2. Lock the referenced product rows with `SELECT ... FOR UPDATE` so a
    ///    concurrent checkout on the same product blocks until commit.
    /// 3. Verify `stock >= quantity` for every line; the first shortfall
    ///    rolls the whole transaction back.
    /// 4. Insert the order with the total computed from live prices, insert
    ///    one line item per cart line snapshotting that price, decrement
    ///    stock (floored at 0), and clear the cart.
    fn checkout(&self, user_id: Uuid) -> Result<Uuid, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let lines: Vec<CartItemRow> = cart_items::table
                .filter(cart_items::user_id.eq(user_id))
                .select(CartItemRow::as_select())
                .load(conn)?;

            if lines.is_empty() {
                return Err(DomainError::EmptyCart);
            }

            let product_ids: Vec<Uuid> = lines.iter().map(|l| l.product_id).collect();
            let locked: Vec<ProductRow> = products::table
                .filter(products::id.eq_any(&product_ids))
                .for_update()
                .select(ProductRow::as_select())
                .load(conn)?;
            let by_id: HashMap<Uuid, ProductRow> =
                locked.into_iter().map(|p| (p.id, p)).collect();

            for line in &lines {
                let product = by_id.get(&line.product_id).ok_or(DomainError::NotFound)?;
                if product.stock < line.quantity {
                    return Err(DomainError::InsufficientStock {
                        product: product.name.clone(),
                        available: product.stock,
                    });
                }
            }

            // Totals and snapshots use the price as it is right now, under
            // the lock, not a value cached when the item entered the cart.
            let total = lines.iter().fold(BigDecimal::from(0), |acc, line| {
                let product = &by_id[&line.product_id];
                acc + &product.price * BigDecimal::from(line.quantity)
            });

            let order_id = Uuid::new_v4();
            diesel::insert_into(orders::table)
                .values(&NewOrderRow {
                    id: order_id,
                    user_id,
                    total,
                })
                .execute(conn)?;

            let new_items: Vec<NewOrderItemRow> = lines
                .iter()
                .map(|line| NewOrderItemRow {
                    id: Uuid::new_v4(),
                    order_id,
                    product_id: line.product_id,
                    quantity: line.quantity,
                    unit_price: by_id[&line.product_id].price.clone(),
                })
                .collect();
            diesel::insert_into(order_items::table)
                .values(&new_items)
                .execute(conn)?;

            for line in &lines {
                let product = &by_id[&line.product_id];
                // The floor cannot trigger after the check above; it guards
                // the stock >= 0 invariant all the same.
                let new_stock = (product.stock - line.quantity).max(0);
                diesel::update(products::table.filter(products::id.eq(product.id)))
                    .set(products::stock.eq(new_stock))
                    .execute(conn)?;
            }

            diesel::delete(cart_items::table.filter(cart_items::user_id.eq(user_id)))
                .execute(conn)?;

            Ok(order_id)
        })
    }

    fn list_for_user(&self, user_id: Uuid) -> Result<Vec<OrderView>, DomainError> {
        let mut conn = self.pool.get()?;

        let order_rows: Vec<OrderRow> = orders::table
            .filter(orders::user_id.eq(user_id))
            .order(orders::created_at.desc())
            .select(OrderRow::as_select())
            .load(&mut conn)?;

        let order_ids: Vec<Uuid> = order_rows.iter().map(|o| o.id).collect();
        let item_rows: Vec<(OrderItemRow, String)> = order_items::table
            .inner_join(products::table)
            .filter(order_items::order_id.eq_any(&order_ids))
            .select((OrderItemRow::as_select(), products::name))
            .load(&mut conn)?;

        let mut items_by_order: HashMap<Uuid, Vec<OrderItemView>> = HashMap::new();
        for (item, product_name) in item_rows {
            items_by_order
                .entry(item.order_id)
                .or_default()
                .push(OrderItemView {
                    product_id: item.product_id,
                    product_name,
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                });
        }

        Ok(order_rows
            .into_iter()
            .map(|o| OrderView {
                id: o.id,
                total: o.total,
                created_at: o.created_at,
                items: items_by_order.remove(&o.id).unwrap_or_default(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;
    use diesel::prelude::*;
    use uuid::Uuid;

    use super::DieselOrderRepository;
    use crate::domain::errors::DomainError;
    use crate::domain::ports::{CartRepository, OrderRepository};
    use crate::infrastructure::cart_repo::DieselCartRepository;
    use crate::infrastructure::test_support::{
        insert_category, insert_product, insert_user, setup_db,
    };
    use crate::schema::{cart_items, orders, products};

    fn product_stock(conn: &mut diesel::PgConnection, id: Uuid) -> i32 {
        products::table
            .filter(products::id.eq(id))
            .select(products::stock)
            .first(conn)
            .expect("stock query failed")
    }

    #[tokio::test]
    async fn checkout_with_empty_cart_is_an_error() {
        let (_container, pool) = setup_db().await;
        let repo = DieselOrderRepository::new(pool.clone());
        let mut conn = pool.get().expect("connection failed");
        let user_id = insert_user(&mut conn, "buyer@example.com");

        let result = repo.checkout(user_id);

        assert!(matches!(result, Err(DomainError::EmptyCart)));
        let order_count: i64 = orders::table.count().get_result(&mut conn).unwrap();
        assert_eq!(order_count, 0);
    }

    #[tokio::test]
    async fn insufficient_stock_aborts_without_any_writes() {
        let (_container, pool) = setup_db().await;
        let carts = DieselCartRepository::new(pool.clone());
        let repo = DieselOrderRepository::new(pool.clone());
        let mut conn = pool.get().expect("connection failed");
        let user_id = insert_user(&mut conn, "buyer@example.com");
        let category_id = insert_category(&mut conn, "Misc");
        let scarce = insert_product(&mut conn, "Scarce", "10.00", 10, category_id);
        let plenty = insert_product(&mut conn, "Plenty", "5.00", 50, category_id);

        carts.add(user_id, scarce, 1).expect("add failed");
        carts.set_quantity(user_id, scarce, 15).expect("set failed");
        carts.add(user_id, plenty, 1).expect("add failed");

        let result = repo.checkout(user_id);

        match result {
            Err(DomainError::InsufficientStock { product, available }) => {
                assert_eq!(product, "Scarce");
                assert_eq!(available, 10);
            }
            other => panic!("expected InsufficientStock, got {:?}", other),
        }

        // Nothing moved: no order, both stocks intact, cart untouched.
        let order_count: i64 = orders::table.count().get_result(&mut conn).unwrap();
        assert_eq!(order_count, 0);
        assert_eq!(product_stock(&mut conn, scarce), 10);
        assert_eq!(product_stock(&mut conn, plenty), 50);
        let cart = carts.list(user_id).expect("list failed");
        assert_eq!(cart.lines.len(), 2);
    }

    #[tokio::test]
    async fn successful_checkout_snapshots_prices_and_clears_cart() {
        let (_container, pool) = setup_db().await;
        let carts = DieselCartRepository::new(pool.clone());
        let repo = DieselOrderRepository::new(pool.clone());
        let mut conn = pool.get().expect("connection failed");
        let user_id = insert_user(&mut conn, "buyer@example.com");
        let category_id = insert_category(&mut conn, "Misc");
        let a = insert_product(&mut conn, "Widget", "5.00", 10, category_id);
        let b = insert_product(&mut conn, "Gadget", "10.00", 5, category_id);

        carts.add(user_id, a, 1).expect("add failed");
        carts.add(user_id, a, 1).expect("add failed");
        carts.add(user_id, b, 1).expect("add failed");

        let order_id = repo.checkout(user_id).expect("checkout failed");

        let history = repo.list_for_user(user_id).expect("history failed");
        assert_eq!(history.len(), 1);
        let order = &history[0];
        assert_eq!(order.id, order_id);
        assert_eq!(order.total, BigDecimal::from_str("20.00").unwrap());
        assert_eq!(order.items.len(), 2);

        // The invariant: line subtotals add up to the stored total exactly.
        let subtotal_sum = order
            .items
            .iter()
            .fold(BigDecimal::from(0), |acc, i| acc + i.subtotal());
        assert_eq!(subtotal_sum, order.total);

        assert_eq!(product_stock(&mut conn, a), 8);
        assert_eq!(product_stock(&mut conn, b), 4);

        let cart_count: i64 = cart_items::table
            .filter(cart_items::user_id.eq(user_id))
            .count()
            .get_result(&mut conn)
            .unwrap();
        assert_eq!(cart_count, 0);
    }

    #[tokio::test]
    async fn later_price_changes_do_not_rewrite_history() {
        let (_container, pool) = setup_db().await;
        let carts = DieselCartRepository::new(pool.clone());
        let repo = DieselOrderRepository::new(pool.clone());
        let mut conn = pool.get().expect("connection failed");
        let user_id = insert_user(&mut conn, "buyer@example.com");
        let category_id = insert_category(&mut conn, "Misc");
        let product_id = insert_product(&mut conn, "Widget", "5.00", 10, category_id);

        carts.add(user_id, product_id, 1).expect("add failed");
        repo.checkout(user_id).expect("checkout failed");

        diesel::update(products::table.filter(products::id.eq(product_id)))
            .set(products::price.eq(BigDecimal::from_str("99.99").unwrap()))
            .execute(&mut conn)
            .expect("price update failed");

        let history = repo.list_for_user(user_id).expect("history failed");
        assert_eq!(
            history[0].items[0].unit_price,
            BigDecimal::from_str("5.00").unwrap()
        );
        assert_eq!(history[0].total, BigDecimal::from_str("5.00").unwrap());
    }

    #[tokio::test]
    async fn order_history_is_newest_first() {
        let (_container, pool) = setup_db().await;
        let carts = DieselCartRepository::new(pool.clone());
        let repo = DieselOrderRepository::new(pool.clone());
        let mut conn = pool.get().expect("connection failed");
        let user_id = insert_user(&mut conn, "buyer@example.com");
        let category_id = insert_category(&mut conn, "Misc");
        let product_id = insert_product(&mut conn, "Widget", "5.00", 100, category_id);

        let mut placed = Vec::new();
        for _ in 0..3 {
            carts.add(user_id, product_id, 1).expect("add failed");
            placed.push(repo.checkout(user_id).expect("checkout failed"));
        }

        let history = repo.list_for_user(user_id).expect("history failed");
        assert_eq!(history.len(), 3);
        for pair in history.windows(2) {
            assert!(pair[0].created_at >= pair[1].created_at);
        }
        assert_eq!(history[0].id, *placed.last().unwrap());
    }
}
