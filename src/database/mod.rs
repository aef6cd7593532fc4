pub mod assert;
pub mod store;

use crate::DbPool;
use anyhow::Context;
use diesel::{r2d2::ConnectionManager, MysqlConnection};
use r2d2::PooledConnection;

no_arg_sql_function!(
    last_insert_id,
    diesel::sql_types::Unsigned<diesel::sql_types::Bigint>,
    "Id of the row most recently inserted on this connection."
);

pub fn get_db_conn(
    pool: &DbPool,
) -> anyhow::Result<PooledConnection<ConnectionManager<MysqlConnection>>> {
    pool.get().context("DB connection")
}
