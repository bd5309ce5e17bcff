#[cfg(test)]
mod tests {
    use mongo_helper::test_utils::{TestContext, TEST_PASSWORD};
    use mongo_helper::{DriverError, MongoDriver, MongoDriverOptions};
    use mongodb::bson::{doc, Document};
    use std::time::Duration;

    #[tokio::test]
    async fn test_unreachable_host_fails_with_connection_error() {
        // Nothing listens on port 1
        let options = MongoDriverOptions::new("app", "127.0.0.1", 1, "root", "example")
            .with_server_selection_timeout(Duration::from_millis(500));

        let result = MongoDriver::new(&options).await;

        match result {
            Err(error @ DriverError::Connection { .. }) => {
                assert_eq!(error.error_code(), "CONNECTION_ERROR");
                assert!(error.to_string().contains("127.0.0.1:1"));
                assert!(!error.to_string().contains("example"));
            }
            Err(other) => panic!("expected Connection error, got {:?}", other),
            Ok(_) => panic!("connecting to an unreachable host must fail"),
        }
    }

    #[tokio::test]
    async fn test_wrong_password_fails_with_connection_error() {
        let ctx = TestContext::new().await;
        let mut options = ctx.options.clone();
        options.password = format!("{}-wrong", TEST_PASSWORD);

        let result = MongoDriver::new(&options).await;
        assert!(matches!(result, Err(DriverError::Connection { .. })));

        ctx.cleanup().await;
    }

    #[tokio::test]
    async fn test_connected_driver_pings_and_resolves_collections() {
        let ctx = TestContext::new().await;

        ctx.driver.ping().await.unwrap();
        assert_eq!(ctx.driver.database().name(), ctx.options.database);

        // Collections exist lazily; the handle is usable before any write
        let notes = ctx.driver.collection::<Document>("notes");
        assert_eq!(notes.name(), "notes");
        assert_eq!(notes.count_documents(doc! {}).await.unwrap(), 0);

        notes.insert_one(doc! { "text": "hello" }).await.unwrap();
        assert_eq!(notes.count_documents(doc! {}).await.unwrap(), 1);

        ctx.cleanup().await;
    }

    #[tokio::test]
    async fn test_cloned_driver_shares_the_connection() {
        let ctx = TestContext::new().await;
        let clone = ctx.driver.clone();

        clone
            .collection::<Document>("shared")
            .insert_one(doc! { "n": 1 })
            .await
            .unwrap();
        let count = ctx
            .driver
            .collection::<Document>("shared")
            .count_documents(doc! {})
            .await
            .unwrap();
        assert_eq!(count, 1);

        drop(clone);
        ctx.cleanup().await;
    }
}
