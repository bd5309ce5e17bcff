#[cfg(test)]
mod tests {
    use mongo_helper::test_utils::TestContext;
    use mongo_helper::{
        create_index, has_index, list_indexes, remove_index, remove_index_by_option, DriverError, IndexOption,
        SortDirection,
    };
    use mongodb::bson::{doc, Document};
    use mongodb::Client;

    #[tokio::test]
    async fn test_create_unique_email_index_is_idempotent() {
        let ctx = TestContext::new().await;
        let users = ctx.collection("users");
        let email = IndexOption::single("email", SortDirection::Ascending).unique(true);

        create_index(&users, &[email.clone()]).await.unwrap();
        assert!(has_index(&users, "idx_email").await.unwrap());

        create_index(&users, &[email]).await.unwrap();

        let indexes = list_indexes(&users).await.unwrap();
        let matching: Vec<_> = indexes.iter().filter(|index| index.name == "idx_email").collect();
        assert_eq!(matching.len(), 1);
        assert!(matching[0].unique);
        assert_eq!(matching[0].keys, doc! { "email": 1 });

        ctx.cleanup().await;
    }

    #[tokio::test]
    async fn test_equivalent_options_create_one_index() {
        let ctx = TestContext::new().await;
        let events = ctx.collection("events");

        let first = IndexOption::new()
            .key("b", SortDirection::Ascending)
            .key("a", SortDirection::Descending);
        let second = IndexOption::new()
            .key("a", SortDirection::Descending)
            .key("b", SortDirection::Ascending);

        create_index(&events, &[first, second]).await.unwrap();

        let names: Vec<String> = list_indexes(&events)
            .await
            .unwrap()
            .into_iter()
            .map(|index| index.name)
            .collect();
        assert_eq!(names.iter().filter(|name| *name == "idx_a_b").count(), 1);
        // _id plus idx_a_b
        assert_eq!(names.len(), 2);

        ctx.cleanup().await;
    }

    #[tokio::test]
    async fn test_compound_index_keeps_key_order() {
        let ctx = TestContext::new().await;
        let orders = ctx.collection("orders");

        let option = IndexOption::new()
            .key("status", SortDirection::Ascending)
            .key("created_at", SortDirection::Descending);
        create_index(&orders, &[option]).await.unwrap();

        let index = list_indexes(&orders)
            .await
            .unwrap()
            .into_iter()
            .find(|index| index.name == "idx_created_at_status")
            .expect("derived index should exist");
        let fields: Vec<&String> = index.keys.keys().collect();
        assert_eq!(fields, vec!["status", "created_at"]);

        ctx.cleanup().await;
    }

    #[tokio::test]
    async fn test_missing_collection_has_no_indexes() {
        let ctx = TestContext::new().await;
        let missing = ctx.collection("never_written");

        assert!(list_indexes(&missing).await.unwrap().is_empty());
        assert!(!has_index(&missing, "idx_anything").await.unwrap());

        ctx.cleanup().await;
    }

    #[tokio::test]
    async fn test_name_collision_with_different_keys_is_skipped() {
        let ctx = TestContext::new().await;
        let users = ctx.collection("users");

        create_index(&users, &[IndexOption::single("email", SortDirection::Ascending).name("lookup")])
            .await
            .unwrap();
        create_index(&users, &[IndexOption::single("username", SortDirection::Ascending).name("lookup")])
            .await
            .unwrap();

        let lookup = list_indexes(&users)
            .await
            .unwrap()
            .into_iter()
            .find(|index| index.name == "lookup")
            .unwrap();
        assert_eq!(lookup.keys, doc! { "email": 1 });

        ctx.cleanup().await;
    }

    #[tokio::test]
    async fn test_remove_index_by_option_drops_auto_named_index() {
        let ctx = TestContext::new().await;
        let accounts = ctx.collection("accounts");

        let option = IndexOption::compound(&[("tenant", SortDirection::Ascending), ("email", SortDirection::Ascending)]);
        create_index(&accounts, &[option]).await.unwrap();
        assert!(has_index(&accounts, "idx_email_tenant").await.unwrap());

        // A fresh option with the same keys in another order and no name
        let same_keys = IndexOption::new()
            .key("email", SortDirection::Ascending)
            .key("tenant", SortDirection::Ascending);
        remove_index_by_option(&accounts, &[same_keys]).await.unwrap();

        assert!(!has_index(&accounts, "idx_email_tenant").await.unwrap());

        ctx.cleanup().await;
    }

    #[tokio::test]
    async fn test_remove_index_by_name() {
        let ctx = TestContext::new().await;
        let accounts = ctx.collection("accounts");

        create_index(
            &accounts,
            &[
                IndexOption::single("email", SortDirection::Ascending),
                IndexOption::single("created_at", SortDirection::Descending).name("by_creation"),
            ],
        )
        .await
        .unwrap();

        remove_index(&accounts, &["idx_email", "by_creation"]).await.unwrap();

        let names: Vec<String> = list_indexes(&accounts)
            .await
            .unwrap()
            .into_iter()
            .map(|index| index.name)
            .collect();
        assert_eq!(names, vec!["_id_".to_string()]);

        ctx.cleanup().await;
    }

    #[tokio::test]
    async fn test_remove_stops_at_first_failure() {
        let ctx = TestContext::new().await;
        let accounts = ctx.collection("accounts");

        create_index(
            &accounts,
            &[
                IndexOption::single("a", SortDirection::Ascending),
                IndexOption::single("c", SortDirection::Ascending),
            ],
        )
        .await
        .unwrap();

        let result = remove_index(&accounts, &["idx_a", "idx_missing", "idx_c"]).await;
        match result {
            Err(DriverError::IndexDrop { name, collection, .. }) => {
                assert_eq!(name, "idx_missing");
                assert_eq!(collection, "accounts");
            }
            other => panic!("expected IndexDrop error, got {:?}", other),
        }

        // Earlier drop applied, later one never attempted
        assert!(!has_index(&accounts, "idx_a").await.unwrap());
        assert!(has_index(&accounts, "idx_c").await.unwrap());

        ctx.cleanup().await;
    }

    #[tokio::test]
    async fn test_create_stops_at_first_failure() {
        let ctx = TestContext::new().await;
        let users = ctx.collection("users");

        // Duplicate emails make a unique index on email impossible
        users
            .insert_many(vec![doc! { "email": "dup@example.com" }, doc! { "email": "dup@example.com" }])
            .await
            .unwrap();

        let result = create_index(
            &users,
            &[
                IndexOption::single("name", SortDirection::Ascending),
                IndexOption::single("email", SortDirection::Ascending).unique(true),
                IndexOption::single("age", SortDirection::Ascending),
            ],
        )
        .await;

        match result {
            Err(error @ DriverError::IndexCreate { .. }) => {
                assert_eq!(error.error_code(), "INDEX_CREATE_ERROR");
                assert!(error.to_string().contains("idx_email"));
            }
            other => panic!("expected IndexCreate error, got {:?}", other),
        }

        assert!(has_index(&users, "idx_name").await.unwrap());
        assert!(!has_index(&users, "idx_email").await.unwrap());
        assert!(!has_index(&users, "idx_age").await.unwrap());

        ctx.cleanup().await;
    }

    #[tokio::test]
    async fn test_existing_ttl_index_with_double_expiry_is_found() {
        let ctx = TestContext::new().await;
        let sessions = ctx.collection("sessions");

        // Written the way the legacy shell stores TTL indexes
        ctx.driver
            .database()
            .run_command(doc! {
                "createIndexes": "sessions",
                "indexes": [{
                    "key": { "created_at": 1 },
                    "name": "idx_created_at",
                    "expireAfterSeconds": 3600.0,
                }],
            })
            .await
            .unwrap();

        assert!(has_index(&sessions, "idx_created_at").await.unwrap());

        // Same name, so the create is skipped instead of conflicting
        create_index(&sessions, &[IndexOption::single("created_at", SortDirection::Ascending)])
            .await
            .unwrap();

        let names: Vec<String> = list_indexes(&sessions)
            .await
            .unwrap()
            .into_iter()
            .map(|index| index.name)
            .collect();
        assert_eq!(names.iter().filter(|name| *name == "idx_created_at").count(), 1);

        ctx.cleanup().await;
    }

    #[tokio::test]
    async fn test_unreachable_server_fails_index_listing() {
        // The client connects lazily, so only the listing itself fails
        let client = Client::with_uri_str("mongodb://127.0.0.1:1/?serverSelectionTimeoutMS=500")
            .await
            .unwrap();
        let collection = client.database("app").collection::<Document>("users");

        let error = list_indexes(&collection).await.unwrap_err();
        assert!(matches!(error, DriverError::IndexQuery { .. }), "unexpected error: {:?}", error);
        assert_eq!(error.error_code(), "INDEX_QUERY_ERROR");
        assert_eq!(error.collection(), Some("users"));

        let error = has_index(&collection, "idx_email").await.unwrap_err();
        assert_eq!(error.error_code(), "INDEX_QUERY_ERROR");
    }
}
