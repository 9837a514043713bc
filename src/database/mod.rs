use crate::config::SeedConfig;
use crate::utils::SeedError;
use futures::TryStreamExt;
use mongodb::bson::{doc, Bson, Document};
use mongodb::options::{ClientOptions, IndexOptions};
use mongodb::{Client, Collection, Database, IndexModel};
use std::time::Duration;

pub const USERS: &str = "users";
pub const RECIPES: &str = "recipes";
pub const SAVES: &str = "saves";
pub const COMMENTS: &str = "comments";

/// Every collection owned by the app, dropped on reset
pub const ALL_COLLECTIONS: [&str; 4] = [USERS, RECIPES, SAVES, COMMENTS];

/// A secondary index the seed declares
#[derive(Debug, Clone)]
pub struct IndexSpec {
    pub collection: &'static str,
    pub keys: Document,
    pub unique: bool,
}

impl IndexSpec {
    fn new(collection: &'static str, keys: Document) -> Self {
        Self { collection, keys, unique: false }
    }

    fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Human readable label, e.g. `recipes(created_at: -1)`
    pub fn label(&self) -> String {
        let keys: Vec<String> = key_directions(&self.keys)
            .into_iter()
            .map(|(field, dir)| format!("{}: {}", field, dir))
            .collect();
        format!("{}({})", self.collection, keys.join(", "))
    }

    /// True when the server's index has the same keys and unique flag
    pub fn matches(&self, model: &IndexModel) -> bool {
        let unique = model
            .options
            .as_ref()
            .and_then(|o| o.unique)
            .unwrap_or(false);
        key_directions(&self.keys) == key_directions(&model.keys) && unique == self.unique
    }
}

/// The five indexes behind the app's query patterns
pub fn seed_indexes() -> Vec<IndexSpec> {
    vec![
        // login lookup
        IndexSpec::new(USERS, doc! { "username": 1 }).unique(),
        // list by author
        IndexSpec::new(RECIPES, doc! { "author_id": 1 }),
        // newest first
        IndexSpec::new(RECIPES, doc! { "created_at": -1 }),
        // filter by ingredient
        IndexSpec::new(RECIPES, doc! { "ingredient_keys": 1 }),
        // filter by allergen
        IndexSpec::new(RECIPES, doc! { "allergens": 1 }),
    ]
}

/// Index key directions as plain integers; the server may echo 1 back as int32, int64 or double
fn key_directions(keys: &Document) -> Vec<(String, i64)> {
    keys.iter()
        .map(|(field, value)| {
            let dir = match value {
                Bson::Int32(v) => *v as i64,
                Bson::Int64(v) => *v,
                Bson::Double(v) => *v as i64,
                _ => 0,
            };
            (field.clone(), dir)
        })
        .collect()
}

#[derive(Clone)]
pub struct MongoDB {
    db: Database,
}

impl MongoDB {
    pub async fn connect(config: &SeedConfig) -> Result<Self, SeedError> {
        log::info!("🔌 Connecting to MongoDB at {}", config.uri);

        let mut client_options = ClientOptions::parse(&config.uri).await?;
        client_options.app_name = Some("recipes-seed".to_string());
        client_options.max_pool_size = Some(4);
        client_options.connect_timeout = Some(Duration::from_secs(5));
        client_options.server_selection_timeout = Some(Duration::from_secs(5));

        let client = Client::with_options(client_options)?;
        let db = client.database(&config.database);

        // Fail fast before touching any collection
        db.run_command(doc! { "ping": 1 }).await?;
        log::info!("✅ Connected to MongoDB database: {}", config.database);

        Ok(Self { db })
    }

    /// Drops the four app collections. Missing collections are fine.
    pub async fn reset(&self) -> Result<(), SeedError> {
        log::info!("🧹 Dropping collections...");

        for name in ALL_COLLECTIONS {
            self.collection::<Document>(name).drop().await?;
            log::debug!("   🗑️  Dropped {}", name);
        }

        log::info!("✅ Collections dropped: {}", ALL_COLLECTIONS.join(", "));
        Ok(())
    }

    /// Creates the seed indexes
    pub async fn ensure_indexes(&self) -> Result<(), SeedError> {
        log::info!("🔧 Creating database indexes...");

        for spec in seed_indexes() {
            let options = spec
                .unique
                .then(|| IndexOptions::builder().unique(true).build());
            let model = IndexModel::builder()
                .keys(spec.keys.clone())
                .options(options)
                .build();

            match self.collection::<Document>(spec.collection).create_index(model).await {
                Ok(result) => log::info!("   ✅ Index created: {} [{}]", spec.label(), result.index_name),
                Err(e) => {
                    log::error!("   ❌ Failed to create index {}: {}", spec.label(), e);
                    return Err(e.into());
                }
            }
        }

        log::info!("✅ Database indexes ready");
        Ok(())
    }

    /// Indexes currently defined on a collection, `_id_` included
    pub async fn list_indexes(&self, name: &str) -> Result<Vec<IndexModel>, SeedError> {
        let indexes = self
            .collection::<Document>(name)
            .list_indexes()
            .await?
            .try_collect()
            .await?;
        Ok(indexes)
    }

    pub async fn count(&self, name: &str) -> Result<u64, SeedError> {
        Ok(self.collection::<Document>(name).count_documents(doc! {}).await?)
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }

    #[cfg(test)]
    pub fn database(&self) -> &Database {
        &self.db
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::oid::ObjectId;

    #[test]
    fn test_seed_indexes() {
        let indexes = seed_indexes();
        assert_eq!(indexes.len(), 5);

        let unique: Vec<String> = indexes.iter().filter(|i| i.unique).map(|i| i.label()).collect();
        assert_eq!(unique, vec!["users(username: 1)".to_string()]);

        assert_eq!(indexes.iter().filter(|i| i.collection == RECIPES).count(), 4);
        assert!(indexes.iter().any(|i| i.label() == "recipes(created_at: -1)"));
    }

    #[test]
    fn test_index_matches_server_model() {
        let spec = IndexSpec::new(USERS, doc! { "username": 1 }).unique();

        let server = IndexModel::builder()
            .keys(doc! { "username": 1.0 })
            .options(IndexOptions::builder().unique(true).name("username_1".to_string()).build())
            .build();
        assert!(spec.matches(&server));

        let not_unique = IndexModel::builder().keys(doc! { "username": 1 }).build();
        assert!(!spec.matches(&not_unique));

        let other_direction = IndexModel::builder()
            .keys(doc! { "username": -1_i64 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        assert!(!spec.matches(&other_direction));
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_reset_drops_all_collections() {
        dotenv::dotenv().ok();
        let mut config = SeedConfig::from_env().unwrap();
        config.database = format!("recipes_seed_test_{}", ObjectId::new().to_hex());

        let db = MongoDB::connect(&config).await.unwrap();
        db.collection::<Document>(SAVES)
            .insert_one(doc! { "user_id": ObjectId::new() })
            .await
            .unwrap();
        assert_eq!(db.count(SAVES).await.unwrap(), 1);

        // Second reset runs against already missing collections
        db.reset().await.unwrap();
        db.reset().await.unwrap();
        for name in ALL_COLLECTIONS {
            assert_eq!(db.count(name).await.unwrap(), 0);
        }

        db.database().drop().await.unwrap();
    }
}
