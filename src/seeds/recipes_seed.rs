use crate::config::SeedConfig;
use crate::database::{MongoDB, RECIPES, USERS};
use crate::models::{Recipe, User};
use crate::seeds::fixtures::{default_recipes, default_users, validate_fixtures};
use crate::utils::{is_duplicate_key, SeedError};
use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};

/// What a seed run wrote
#[derive(Debug, Clone)]
pub struct SeedSummary {
    /// (username, generated _id) in insertion order
    pub users: Vec<(String, ObjectId)>,
    pub recipes_inserted: usize,
}

/// Drop, insert the fixture users and recipes, then create the indexes.
///
/// Steps run in order and stop at the first failure. Nothing is rolled back, so a
/// failed run can leave the database partially seeded; the next run starts with a drop.
pub async fn seed_database(db: &MongoDB, config: &SeedConfig) -> Result<SeedSummary, SeedError> {
    let user_fixtures = default_users();
    let recipe_fixtures = default_recipes();
    validate_fixtures(&user_fixtures, &recipe_fixtures)?;

    db.reset().await?;

    log::info!("👤 Seeding {} users...", user_fixtures.len());
    let mut users = Vec::with_capacity(user_fixtures.len());
    for fixture in user_fixtures {
        let password_hash = bcrypt::hash(&config.password, config.bcrypt_cost)?;
        let user = fixture.into_user(password_hash, BsonDateTime::now());
        let id = insert_user(db, &user).await?;
        log::debug!("   ✅ User {} -> {}", user.username, id.to_hex());
        users.push((user.username, id));
    }

    log::info!("🍲 Seeding {} recipes...", recipe_fixtures.len());
    let recipes: Vec<Recipe> = recipe_fixtures
        .into_iter()
        .map(|fixture| {
            let author_id = users[fixture.author].1;
            fixture.into_recipe(author_id, BsonDateTime::now())
        })
        .collect();

    let result = db.collection::<Recipe>(RECIPES).insert_many(&recipes).await?;
    let recipes_inserted = result.inserted_ids.len();
    log::info!("   ✅ Inserted {} recipes into {} collection", recipes_inserted, RECIPES);

    db.ensure_indexes().await?;

    Ok(SeedSummary { users, recipes_inserted })
}

/// Inserts one user and returns its generated id
pub async fn insert_user(db: &MongoDB, user: &User) -> Result<ObjectId, SeedError> {
    let result = match db.collection::<User>(USERS).insert_one(user).await {
        Ok(result) => result,
        Err(e) if is_duplicate_key(&e) => {
            return Err(SeedError::Database(format!(
                "username '{}' already exists",
                user.username
            )));
        }
        Err(e) => return Err(e.into()),
    };
    result.inserted_id.as_object_id().ok_or_else(|| {
        SeedError::Database(format!(
            "user '{}' was inserted without an ObjectId",
            user.username
        ))
    })
}
