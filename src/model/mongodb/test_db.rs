//! Throwaway databases on the MongoDB server named by `db_uri`.

use std::future::Future;
use std::panic;

use mongodb::{Client, Database};
use rocket::tokio;

/// Run `test` against a fresh, uniquely named database, then drop the
/// database whether or not the test passed.
pub async fn with_test_db<F, Fut>(test: F)
where
    F: FnOnce(Database) -> Fut,
    Fut: Future<Output = ()> + Send + 'static,
{
    let db_uri = rocket::Config::figment()
        .extract_inner::<String>("db_uri")
        .expect("`db_uri` not set");
    let client = Client::with_uri_str(&db_uri).await.unwrap();
    let db = client.database(&format!("ballot_gateway_test_{:016x}", rand::random::<u64>()));

    let outcome = tokio::spawn(test(db.clone())).await;
    db.drop(None).await.unwrap();

    if let Err(err) = outcome {
        if err.is_panic() {
            panic::resume_unwind(err.into_panic());
        }
        panic!("test task was cancelled");
    }
}
