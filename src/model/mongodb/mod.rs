mod collection;
#[cfg(test)]
mod test_db;

pub use collection::{ensure_indexes_exist, Coll, MongoCollection};
#[cfg(test)]
pub use test_db::with_test_db;
