#[macro_use]
extern crate rocket;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

use rocket::{Build, Rocket};

pub mod api;
pub mod config;
pub mod cors;
pub mod error;
pub mod logging;
pub mod model;
pub mod validation;

pub use config::Config;

use crate::model::store::{ensure_indexes_exist, Store, StoreError};

/// Build the server, connecting to whichever store the configuration names.
pub fn build() -> Rocket<Build> {
    rocket::build()
        .attach(logging::LoggerFairing)
        .attach(config::ConfigFairing)
        .attach(config::StoreFairing)
        .attach(cors::CorsFairing)
        .mount("/", api::routes())
}

/// Build the server around an already-constructed store, bypassing the
/// store configuration entirely.
pub async fn rocket_for_store(store: Store) -> Result<Rocket<Build>, StoreError> {
    ensure_indexes_exist(&store).await?;
    Ok(rocket::build()
        .attach(logging::LoggerFairing)
        .attach(config::ConfigFairing)
        .attach(cors::CorsFairing)
        .manage(store)
        .mount("/", api::routes()))
}
