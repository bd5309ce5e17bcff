use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use mongodb::bson::{Bson, Document};
use tracing::info;

use mongo_helper::{
    create_index, find_all, list_indexes, models::parse_field_direction, remove_index, remove_index_by_option,
    IndexOption, ListOption, MongoDriver, MongoDriverOptions, SortDirection,
};

/// Index and query helper for a MongoDB database.
///
/// Connection settings come from MONGO_* environment variables (or a .env file).
#[derive(Parser, Debug)]
#[command(name = "mongo-helper", version)]
struct Cli {
    /// Database to use instead of MONGO_DATABASE
    #[arg(long, global = true)]
    database: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check that the server is reachable with the configured credentials
    Ping,
    /// Show the indexes of a collection
    Indexes { collection: String },
    /// Create an index unless one with the same name exists
    CreateIndex {
        collection: String,
        /// Index key as field:direction (1, -1, asc, desc); repeatable
        #[arg(long = "key", required = true, value_parser = parse_field_direction)]
        keys: Vec<(String, SortDirection)>,
        #[arg(long)]
        unique: bool,
        /// Explicit index name; derived from the keys when omitted
        #[arg(long)]
        name: Option<String>,
    },
    /// Drop indexes by name, or the one derived from --key
    DropIndex {
        collection: String,
        names: Vec<String>,
        #[arg(long = "key", value_parser = parse_field_direction, conflicts_with = "names")]
        keys: Vec<(String, SortDirection)>,
    },
    /// Print matching documents as relaxed extended JSON, one per line
    List {
        collection: String,
        /// Filter as a JSON object
        #[arg(long)]
        filter: Option<String>,
        /// Sort field as field:direction; repeatable, applied in order
        #[arg(long = "sort", value_parser = parse_field_direction)]
        sort: Vec<(String, SortDirection)>,
        #[arg(long, default_value_t = 0)]
        limit: i64,
        #[arg(long, default_value_t = 0)]
        skip: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut options = MongoDriverOptions::from_env()?;
    if let Some(database) = cli.database {
        options.database = database;
    }
    let driver = MongoDriver::new(&options).await?;

    let outcome = run(&driver, cli.command).await;
    driver.shutdown().await;
    outcome
}

async fn run(driver: &MongoDriver, command: Command) -> Result<()> {
    match command {
        Command::Ping => {
            driver.ping().await?;
            println!("ok");
        }
        Command::Indexes { collection } => {
            let collection = driver.collection::<Document>(&collection);
            for index in list_indexes(&collection).await? {
                println!(
                    "{}\t{}{}",
                    index.name,
                    index.keys,
                    if index.unique { "\tunique" } else { "" }
                );
            }
        }
        Command::CreateIndex { collection, keys, unique, name } => {
            let collection = driver.collection::<Document>(&collection);
            let mut option = IndexOption::compound(&keys).unique(unique);
            if let Some(name) = name {
                option = option.name(name);
            }
            create_index(&collection, &[option]).await?;
        }
        Command::DropIndex { collection, names, keys } => {
            let collection = driver.collection::<Document>(&collection);
            if !keys.is_empty() {
                remove_index_by_option(&collection, &[IndexOption::compound(&keys)]).await?;
            } else if !names.is_empty() {
                remove_index(&collection, &names).await?;
            } else {
                return Err(anyhow!("give index names or at least one --key"));
            }
        }
        Command::List { collection, filter, sort, limit, skip } => {
            let collection = driver.collection::<Document>(&collection);
            let mut option = ListOption::new().limit(limit).skip(skip);
            if let Some(filter) = filter {
                option = option.filter(parse_filter(&filter)?);
            }
            for (field, direction) in sort {
                option = option.sort_by(field, direction);
            }

            let documents: Vec<Document> = find_all(&collection, &option).await?;
            info!("{} document(s) matched", documents.len());
            for document in documents {
                println!("{}", Bson::Document(document).into_relaxed_extjson());
            }
        }
    }
    Ok(())
}

fn parse_filter(raw: &str) -> Result<Document> {
    let value: serde_json::Value = serde_json::from_str(raw).context("filter is not valid JSON")?;
    match Bson::try_from(value).context("filter is not valid extended JSON")? {
        Bson::Document(document) => Ok(document),
        other => Err(anyhow!("filter must be a JSON object, got {:?}", other.element_type())),
    }
}
