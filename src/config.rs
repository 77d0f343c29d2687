use log::{error, info};
use mongodb::Client as MongoClient;
use rocket::{
    fairing::{Fairing, Info, Kind},
    Build, Rocket,
};
use serde::Deserialize;

use crate::model::store::{ensure_indexes_exist, MemoryStore, MongoStore, Store};

/// Application configuration, derived from `Rocket.toml` and `ROCKET_*`
/// environment variables. This struct becomes managed state and can be
/// inspected by any endpoint.
#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default = "default_allowed_origin")]
    allowed_origin: String,
}

fn default_allowed_origin() -> String {
    Config::DEFAULT_ALLOWED_ORIGIN.to_string()
}

impl Config {
    pub const DEFAULT_ALLOWED_ORIGIN: &'static str = "*";

    /// The origin browsers are allowed to call us from.
    pub fn allowed_origin(&self) -> &str {
        &self.allowed_origin
    }
}

/// A fairing that loads the application config and puts it in managed state.
/// This could easily be achieved using `AdHoc::config`, but is written out
/// explicitly for symmetry with the store fairing and control over error
/// messages.
pub struct ConfigFairing;

#[rocket::async_trait]
impl Fairing for ConfigFairing {
    fn info(&self) -> Info {
        Info {
            name: "Config",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<Config>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load application config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };

        // Manage the state.
        rocket = rocket.manage(config);
        Ok(rocket)
    }
}

/// Which document store backs the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    #[default]
    Mongodb,
    Memory,
}

/// Configuration for the document store.
#[derive(Debug, Deserialize)]
struct StoreConfig {
    #[serde(default)]
    store: StoreKind,
    // secrets
    db_uri: Option<String>,
    // non-secrets
    #[serde(default = "default_db_name")]
    db_name: String,
}

fn default_db_name() -> String {
    "questions".to_string()
}

/// A fairing that loads the store config, connects to the database if there
/// is one, ensures the unique indexes exist, and places the [`Store`] into
/// managed state.
pub struct StoreFairing;

impl StoreFairing {
    async fn connect(config: StoreConfig) -> Result<Store, String> {
        match config.store {
            StoreKind::Memory => {
                info!("Using in-memory document store; nothing will persist");
                Ok(Store::new(MemoryStore::default()))
            }
            StoreKind::Mongodb => {
                let uri = config
                    .db_uri
                    .ok_or_else(|| "`db_uri` must be set to use MongoDB".to_string())?;
                info!("Loaded database config, connecting...");
                let client = MongoClient::with_uri_str(uri)
                    .await
                    .map_err(|e| format!("Failed to connect to database: {e}"))?;
                info!("Using database {}", config.db_name);
                Ok(Store::new(MongoStore::new(client.database(&config.db_name))))
            }
        }
    }
}

#[rocket::async_trait]
impl Fairing for StoreFairing {
    fn info(&self) -> Info {
        Info {
            name: "Document store",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<StoreConfig>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load store config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };

        // Construct the connection.
        let store = match Self::connect(config).await {
            Ok(store) => store,
            Err(e) => {
                error!("{e}");
                return Err(rocket);
            }
        };

        // Ensure the required indexes exist.
        if let Err(e) = ensure_indexes_exist(&store).await {
            error!("Failed to set up collection indexes: {e}");
            return Err(rocket);
        }
        info!("...document store online!");

        // Manage the state.
        rocket = rocket.manage(store);
        Ok(rocket)
    }
}
