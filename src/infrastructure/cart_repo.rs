use diesel::prelude::*;
use diesel::sql_types::Integer;
use diesel::upsert::excluded;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::cart::{clamp_quantity, CartLineView, CartView, MAX_QUANTITY};
use crate::domain::errors::DomainError;
use crate::domain::ports::CartRepository;
use crate::schema::{cart_items, products};

use super::models::{CartItemRow, NewCartItemRow, ProductRow};

diesel::define_sql_function! {
    fn least(a: Integer, b: Integer) -> Integer;
}

pub struct DieselCartRepository {
    pool: DbPool,
}

impl DieselCartRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl CartRepository for DieselCartRepository {
    fn add(&self, user_id: Uuid, product_id: Uuid, delta: i32) -> Result<i32, DomainError> {
        let mut conn = self.pool.get()?;

        // The product must exist before it can go into a cart.
        let exists = products::table
            .filter(products::id.eq(product_id))
            .select(products::id)
            .first::<Uuid>(&mut conn)
            .optional()?;
        if exists.is_none() {
            return Err(DomainError::NotFound);
        }

        // Single upsert on the (user_id, product_id) unique index, so two
        // simultaneous first-adds merge into one line instead of the loser
        // hitting a unique violation.
        let quantity = diesel::insert_into(cart_items::table)
            .values(&NewCartItemRow {
                id: Uuid::new_v4(),
                user_id,
                product_id,
                quantity: clamp_quantity(delta),
            })
            .on_conflict((cart_items::user_id, cart_items::product_id))
            .do_update()
            .set(cart_items::quantity.eq(least(
                cart_items::quantity + excluded(cart_items::quantity),
                MAX_QUANTITY,
            )))
            .returning(cart_items::quantity)
            .get_result(&mut conn)?;

        Ok(quantity)
    }

    fn set_quantity(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;

        // Absent lines are left alone; updating zero rows is not an error.
        diesel::update(
            cart_items::table
                .filter(cart_items::user_id.eq(user_id))
                .filter(cart_items::product_id.eq(product_id)),
        )
        .set(cart_items::quantity.eq(clamp_quantity(quantity)))
        .execute(&mut conn)?;

        Ok(())
    }

    fn remove(&self, user_id: Uuid, product_id: Uuid) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;

        diesel::delete(
            cart_items::table
                .filter(cart_items::user_id.eq(user_id))
                .filter(cart_items::product_id.eq(product_id)),
        )
        .execute(&mut conn)?;

        Ok(())
    }

    fn list(&self, user_id: Uuid) -> Result<CartView, DomainError> {
        let mut conn = self.pool.get()?;

        let rows: Vec<(CartItemRow, ProductRow)> = cart_items::table
            .inner_join(products::table)
            .filter(cart_items::user_id.eq(user_id))
            .order(cart_items::created_at.asc())
            .select((CartItemRow::as_select(), ProductRow::as_select()))
            .load(&mut conn)?;

        Ok(CartView {
            lines: rows
                .into_iter()
                .map(|(line, product)| CartLineView {
                    product_id: product.id,
                    name: product.name,
                    unit_price: product.price,
                    quantity: line.quantity,
                    stock: product.stock,
                })
                .collect(),
        })
    }
}
