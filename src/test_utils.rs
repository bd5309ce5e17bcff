//! Test utilities for running against a real MongoDB server
//!
//! A single `mongo` container is started on first use and shared by every test
//! in the process. Each [`TestContext`] gets its own database inside it, so
//! tests can run concurrently without seeing each other's collections.

use std::sync::Arc;
use std::time::Duration;

use mongodb::bson::{doc, Document};
use mongodb::Collection;
use testcontainers::{runners::AsyncRunner, ContainerAsync, ImageExt};
use testcontainers_modules::mongo::Mongo;

use crate::config::MongoDriverOptions;
use crate::db::MongoDriver;

pub const TEST_USERNAME: &str = "root";
pub const TEST_PASSWORD: &str = "example";

/// Shared MongoDB container used by all tests in the process
static SHARED_MONGO: std::sync::LazyLock<tokio::sync::Mutex<Option<SharedMongo>>> =
    std::sync::LazyLock::new(|| tokio::sync::Mutex::new(None));

struct SharedMongo {
    // Held so the container lives as long as the process
    _container: Arc<ContainerAsync<Mongo>>,
    host: String,
    port: u16,
}

impl SharedMongo {
    async fn start() -> Result<SharedMongo, Box<dyn std::error::Error + Send + Sync>> {
        let container = Mongo::default()
            .with_tag("7")
            .with_env_var("MONGO_INITDB_ROOT_USERNAME", TEST_USERNAME)
            .with_env_var("MONGO_INITDB_ROOT_PASSWORD", TEST_PASSWORD)
            .start()
            .await
            .map_err(|e| format!("Failed to start shared mongo container: {}", e))?;

        let host = container
            .get_host()
            .await
            .map_err(|e| format!("Failed to get mongo host: {}", e))?
            .to_string();
        let port = container
            .get_host_port_ipv4(27017)
            .await
            .map_err(|e| format!("Failed to get mongo port: {}", e))?;

        // The image restarts mongod after creating the root user; wait until
        // authenticated pings succeed.
        let probe = MongoDriverOptions::new("admin", host.clone(), port, TEST_USERNAME, TEST_PASSWORD)
            .with_server_selection_timeout(Duration::from_secs(2));
        const MAX_RETRIES: u32 = 30;
        let mut retries = 0;
        loop {
            match MongoDriver::new(&probe).await {
                Ok(driver) => {
                    driver.shutdown().await;
                    break;
                }
                Err(e) if retries + 1 >= MAX_RETRIES => {
                    return Err(format!("MongoDB not ready after {} retries: {}", MAX_RETRIES, e).into());
                }
                Err(_) => {
                    retries += 1;
                    tokio::time::sleep(Duration::from_millis(500)).await;
                }
            }
        }

        Ok(SharedMongo {
            _container: Arc::new(container),
            host,
            port,
        })
    }
}

/// Per-test handle: a connected driver bound to a fresh, uniquely named database
pub struct TestContext {
    pub driver: MongoDriver,
    pub options: MongoDriverOptions,
}

impl TestContext {
    pub async fn new() -> Self {
        let mut guard = SHARED_MONGO.lock().await;
        if guard.is_none() {
            let shared = SharedMongo::start()
                .await
                .expect("Failed to start shared MongoDB container");
            *guard = Some(shared);
        }
        let shared = guard.as_ref().expect("shared MongoDB initialised above");

        let database = format!("test_{}", uuid::Uuid::new_v4().simple());
        let options = MongoDriverOptions::new(database, shared.host.clone(), shared.port, TEST_USERNAME, TEST_PASSWORD)
            .with_app_name("mongo-helper-tests")
            .with_server_selection_timeout(Duration::from_secs(5));
        drop(guard);

        let driver = MongoDriver::new(&options)
            .await
            .expect("Failed to connect to test database");

        Self { driver, options }
    }

    pub fn collection(&self, name: &str) -> Collection<Document> {
        self.driver.collection::<Document>(name)
    }

    /// Inserts `count` documents `{seq, status, name}`; `status` alternates
    /// between "active" and "inactive" starting with "active".
    pub async fn seed_documents(&self, collection: &Collection<Document>, count: i32) {
        let documents: Vec<Document> = (0..count)
            .map(|seq| {
                doc! {
                    "seq": seq,
                    "status": if seq % 2 == 0 { "active" } else { "inactive" },
                    "name": format!("item-{:03}", seq),
                }
            })
            .collect();
        if !documents.is_empty() {
            collection
                .insert_many(documents)
                .await
                .expect("Failed to seed documents");
        }
    }

    /// Drops the test database and closes the client
    pub async fn cleanup(self) {
        if let Err(e) = self.driver.database().drop().await {
            eprintln!("Failed to drop test database {}: {}", self.options.database, e);
        }
        self.driver.shutdown().await;
    }
}
