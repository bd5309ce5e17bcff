use mongodb::{
    bson::{doc, Document},
    options::ClientOptions,
    Client, Collection, Database,
};
use tracing::{debug, info};

use crate::config::MongoDriverOptions;
use crate::errors::DriverError;

pub mod indexes;
pub mod query;

pub type Result<T> = std::result::Result<T, DriverError>;

/// Owned connection to one MongoDB database.
///
/// Created once per process and passed by reference to every accessor.
/// Cloning shares the same underlying client.
#[derive(Clone, Debug)]
pub struct MongoDriver {
    client: Client,
    db: Database,
}

impl MongoDriver {
    pub async fn new(options: &MongoDriverOptions) -> Result<Self> {
        let client = connect(options).await?;
        let db = client.database(&options.database);

        info!("Connected to MongoDB at {} (database '{}')", options.redacted_uri(), options.database);

        Ok(Self { client, db })
    }

    /// Handle to a collection of the active database. Never fails: MongoDB
    /// creates collections lazily on first write.
    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection::<T>(name)
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Sends a `ping` to the server, same probe as the one run on connect.
    pub async fn ping(&self) -> std::result::Result<(), mongodb::error::Error> {
        ping(&self.client).await
    }

    /// Closes the client and waits for its in-flight operations to finish.
    pub async fn shutdown(self) {
        let name = self.db.name().to_string();
        self.client.shutdown().await;
        debug!("MongoDB client for database '{}' shut down", name);
    }
}

async fn connect(options: &MongoDriverOptions) -> Result<Client> {
    let connection_error = |source: mongodb::error::Error| DriverError::Connection {
        target: options.target(),
        source,
    };

    let uri = options.mongo_uri();
    let mut client_options = ClientOptions::parse(uri.as_str())
        .await
        .map_err(connection_error)?;
    if let Some(app_name) = &options.app_name {
        client_options.app_name = Some(app_name.clone());
    }
    if let Some(timeout) = options.server_selection_timeout {
        client_options.server_selection_timeout = Some(timeout);
    }

    let client = Client::with_options(client_options).map_err(connection_error)?;
    ping(&client).await.map_err(connection_error)?;

    Ok(client)
}

async fn ping(client: &Client) -> std::result::Result<(), mongodb::error::Error> {
    let _: Document = client
        .database("admin")
        .run_command(doc! { "ping": 1 })
        .await?;
    Ok(())
}
