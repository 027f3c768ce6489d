//! Sample "catalog" dataset: a small movie schema plus seed records.

use crate::bootstrap::{Marker, SetupPlan};
use crate::store::{AttributeDef, TxOp, Value, ValueType};

pub const CATALOG: &str = "catalog";

pub const TITLE: &str = "movie/title";
pub const GENRE: &str = "movie/genre";
pub const RELEASE_YEAR: &str = "movie/release-year";

/// Seed records: (title, genre, release year).
pub const MOVIES: &[(&str, &str, i64)] = &[
    ("The Goonies", "action/adventure", 1985),
    ("Commando", "thriller/action", 1985),
    ("Repo Man", "punk dystopia", 1984),
];

pub fn schema() -> Vec<TxOp> {
    vec![
        TxOp::DefineAttribute(
            AttributeDef::new(TITLE, ValueType::String)
                .unique()
                .doc("The title of the movie"),
        ),
        TxOp::DefineAttribute(AttributeDef::new(GENRE, ValueType::String).doc("The genre of the movie")),
        TxOp::DefineAttribute(
            AttributeDef::new(RELEASE_YEAR, ValueType::Long).doc("The year the movie was released in theaters"),
        ),
    ]
}

pub fn seed_movies() -> Vec<TxOp> {
    MOVIES
        .iter()
        .map(|&(title, genre, year)| {
            TxOp::upsert([
                (TITLE, Value::from(title)),
                (GENRE, Value::from(genre)),
                (RELEASE_YEAR, Value::from(year)),
            ])
        })
        .collect()
}

/// Present once the seed batch has committed. The batch is atomic, so one
/// seeded title implies all of them.
pub fn marker() -> Marker {
    Marker::Entity {
        attribute: TITLE.to_string(),
        value: Value::from(MOVIES[MOVIES.len() - 1].0),
    }
}

/// Schema first, then all seed records in a single batch.
pub fn catalog_plan() -> SetupPlan {
    SetupPlan::new(marker())
        .step("catalog-schema", schema())
        .step("catalog-movies", seed_movies())
}
