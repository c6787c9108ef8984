#[macro_use]
extern crate rocket;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

use rocket::{Build, Rocket};

use config::{ConfigFairing, DatabaseFairing};
use logging::LoggerFairing;

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;

pub use config::Config;

/// Assemble the server: logging, configuration, the database connection, and
/// every route.
pub fn build() -> Rocket<Build> {
    rocket::build()
        .attach(LoggerFairing)
        .attach(ConfigFairing)
        .attach(DatabaseFairing)
        .mount("/", api::routes())
}

/// An `auth_token` cookie for a signed-in test voter.
#[cfg(test)]
pub(crate) type AuthCookie = rocket::http::Cookie<'static>;

/// The test database URI. Database-backed tests cannot run without one.
#[cfg(test)]
pub(crate) fn test_db_uri() -> String {
    db_uri_from(&rocket::Config::figment())
}

#[cfg(test)]
fn db_uri_from(figment: &rocket::figment::Figment) -> String {
    figment
        .extract_inner::<String>("db_uri")
        .expect("`db_uri` not set, set ROCKET_DB_URI to run database tests")
}

#[cfg(test)]
pub(crate) async fn db_client(db_uri: &str) -> mongodb::Client {
    mongodb::Client::with_uri_str(db_uri).await.unwrap()
}

/// A fresh database name, so that tests can run in parallel.
#[cfg(test)]
pub(crate) fn test_database_name() -> String {
    use rand::{distributions::Alphanumeric, Rng};

    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(16)
        .map(char::from)
        .collect();
    format!("teamdraft-test-{suffix}")
}

/// The server as [`build`] assembles it, but on the given database.
#[cfg(test)]
pub(crate) async fn rocket_for_db(client: mongodb::Client, db_name: &str) -> Rocket<Build> {
    let db = client.database(db_name);
    model::mongodb::ensure_indexes_exist(&db).await.unwrap();
    rocket::build()
        .attach(LoggerFairing)
        .attach(ConfigFairing)
        .manage(client)
        .manage(db)
        .mount("/", api::routes())
}

/// Register an example voter and sign them in.
#[cfg(test)]
pub(crate) async fn login_example(
    db: &mongodb::Database,
    config: &Config,
    elevated: bool,
) -> AuthCookie {
    use model::{
        auth::{AuthToken, Standard},
        db::voter::{NewVoter, Voter, VoterCore},
        mongodb::Coll,
    };

    let core = if elevated {
        VoterCore::admin_example()
    } else {
        VoterCore::example()
    };
    let id = Voter::register(&Coll::<NewVoter>::from_db(db), core.clone())
        .await
        .unwrap();
    let voter = Voter { id, voter: core };
    // The privilege marker only matters when verifying; the cookie carries the voter's rights.
    AuthToken::<Standard>::new(&voter).into_cookie(config)
}
