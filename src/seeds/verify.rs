use crate::database::{seed_indexes, MongoDB, ALL_COLLECTIONS, COMMENTS, RECIPES, SAVES, USERS};
use crate::models::{Recipe, User};
use crate::seeds::fixtures::{default_recipes, default_users};
use crate::utils::{canonicalize_key, detect_allergens, normalize_key, SeedError};
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::bson::{self, doc, oid::ObjectId, Document};
use mongodb::IndexModel;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub name: &'static str,
    pub passed: bool,
    pub detail: String,
}

impl CheckResult {
    fn new(name: &'static str, passed: bool, detail: impl Into<String>) -> Self {
        Self { name, passed, detail: detail.into() }
    }
}

/// Outcome of checking a seeded database
#[derive(Debug, Clone, Serialize)]
pub struct VerifyReport {
    pub database: String,
    pub checked_at: DateTime<Utc>,
    pub counts: BTreeMap<String, u64>,
    pub checks: Vec<CheckResult>,
    /// Fixture quality notes, never a failure
    pub warnings: Vec<String>,
}

impl VerifyReport {
    pub fn passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    pub fn failed_checks(&self) -> Vec<String> {
        self.checks
            .iter()
            .filter(|c| !c.passed)
            .map(|c| c.name.to_string())
            .collect()
    }

    pub fn into_result(self) -> Result<Self, SeedError> {
        if self.passed() {
            Ok(self)
        } else {
            Err(SeedError::Verification(self.failed_checks()))
        }
    }
}

/// Documents read back from `users` and `recipes`. Anything that does not decode into
/// the seed models is kept as a description in `malformed` instead of aborting the run.
#[derive(Debug, Default)]
struct Contents {
    users: Vec<User>,
    recipes: Vec<Recipe>,
    /// `_id` of every user document, decodable or not
    user_ids: HashSet<ObjectId>,
    malformed: Vec<String>,
}

impl Contents {
    fn from_documents(user_docs: Vec<Document>, recipe_docs: Vec<Document>) -> Self {
        let mut contents = Contents::default();

        for document in user_docs {
            if let Ok(id) = document.get_object_id("_id") {
                contents.user_ids.insert(id);
            }
            match bson::from_document::<User>(document.clone()) {
                Ok(user) => contents.users.push(user),
                Err(e) => contents.malformed.push(describe(USERS, &document, "username", e)),
            }
        }

        for document in recipe_docs {
            match bson::from_document::<Recipe>(document.clone()) {
                Ok(recipe) => contents.recipes.push(recipe),
                Err(e) => contents.malformed.push(describe(RECIPES, &document, "title", e)),
            }
        }

        contents
    }
}

fn describe(collection: &str, document: &Document, label_field: &str, error: bson::de::Error) -> String {
    let label = document
        .get_str(label_field)
        .map(str::to_string)
        .or_else(|_| document.get_object_id("_id").map(|id| id.to_hex()))
        .unwrap_or_else(|_| "?".to_string());
    format!("{} '{}': {}", collection, label, error)
}

/// Reads back the four collections and their indexes and checks them against the seed
pub async fn verify_database(db: &MongoDB, database: &str) -> Result<VerifyReport, SeedError> {
    log::info!("🔍 Verifying database {}...", database);

    let mut counts = BTreeMap::new();
    for name in ALL_COLLECTIONS {
        counts.insert(name.to_string(), db.count(name).await?);
    }

    let user_docs: Vec<Document> = db
        .collection::<Document>(USERS)
        .find(doc! {})
        .await?
        .try_collect()
        .await?;
    let recipe_docs: Vec<Document> = db
        .collection::<Document>(RECIPES)
        .find(doc! {})
        .await?
        .try_collect()
        .await?;
    let contents = Contents::from_documents(user_docs, recipe_docs);

    let mut indexes = HashMap::new();
    for name in [USERS, RECIPES] {
        indexes.insert(name, db.list_indexes(name).await?);
    }

    let checks = run_checks(&contents, &counts, &indexes);
    let warnings = fixture_warnings(&contents.recipes);

    for check in &checks {
        if check.passed {
            log::debug!("   ✅ {}: {}", check.name, check.detail);
        } else {
            log::error!("   ❌ {}: {}", check.name, check.detail);
        }
    }
    for warning in &warnings {
        log::warn!("   ⚠️  {}", warning);
    }

    Ok(VerifyReport {
        database: database.to_string(),
        checked_at: Utc::now(),
        counts,
        checks,
        warnings,
    })
}

fn run_checks(
    contents: &Contents,
    counts: &BTreeMap<String, u64>,
    indexes: &HashMap<&str, Vec<IndexModel>>,
) -> Vec<CheckResult> {
    let users = &contents.users;
    let recipes = &contents.recipes;
    let count_of = |name: &str| counts.get(name).copied().unwrap_or(0);
    let expected_users = default_users().len() as u64;
    let expected_recipes = default_recipes().len() as u64;

    let mut checks = Vec::new();

    checks.push(CheckResult::new(
        "documents_well_formed",
        contents.malformed.is_empty(),
        if contents.malformed.is_empty() {
            "every user and recipe decodes".to_string()
        } else {
            contents.malformed.join("; ")
        },
    ));

    checks.push(CheckResult::new(
        "users_count",
        count_of(USERS) == expected_users,
        format!("{} of {} users", count_of(USERS), expected_users),
    ));

    let mut seen = HashSet::new();
    let duplicates: Vec<&str> = users
        .iter()
        .filter(|u| !seen.insert(u.username.as_str()))
        .map(|u| u.username.as_str())
        .collect();
    checks.push(CheckResult::new(
        "usernames_unique",
        duplicates.is_empty(),
        if duplicates.is_empty() {
            "all usernames distinct".to_string()
        } else {
            format!("duplicated: {}", duplicates.join(", "))
        },
    ));

    checks.push(CheckResult::new(
        "recipes_count",
        count_of(RECIPES) == expected_recipes,
        format!("{} of {} recipes", count_of(RECIPES), expected_recipes),
    ));

    let orphans: Vec<&str> = recipes
        .iter()
        .filter(|r| !contents.user_ids.contains(&r.author_id))
        .map(|r| r.title.as_str())
        .collect();
    checks.push(CheckResult::new(
        "authors_exist",
        orphans.is_empty(),
        if orphans.is_empty() {
            "every author_id references a user".to_string()
        } else {
            format!("unknown author on: {}", orphans.join(", "))
        },
    ));

    let inconsistent: Vec<&str> = recipes
        .iter()
        .filter(|r| !r.keys_consistent())
        .map(|r| r.title.as_str())
        .collect();
    checks.push(CheckResult::new(
        "ingredient_keys_consistent",
        inconsistent.is_empty(),
        if inconsistent.is_empty() {
            "ingredient_keys match ingredients".to_string()
        } else {
            format!("mismatch on: {}", inconsistent.join(", "))
        },
    ));

    for (name, collection) in [("saves_empty", SAVES), ("comments_empty", COMMENTS)] {
        checks.push(CheckResult::new(
            name,
            count_of(collection) == 0,
            format!("{} documents in {}", count_of(collection), collection),
        ));
    }

    let missing: Vec<String> = seed_indexes()
        .into_iter()
        .filter(|spec| {
            !indexes
                .get(spec.collection)
                .map(|models| models.iter().any(|m| spec.matches(m)))
                .unwrap_or(false)
        })
        .map(|spec| spec.label())
        .collect();
    checks.push(CheckResult::new(
        "indexes",
        missing.is_empty(),
        if missing.is_empty() {
            "all seed indexes present".to_string()
        } else {
            format!("missing: {}", missing.join(", "))
        },
    ));

    checks
}

/// Keys that are not in canonical form and allergens the ingredients imply but the recipe omits
fn fixture_warnings(recipes: &[Recipe]) -> Vec<String> {
    let mut warnings = Vec::new();

    for recipe in recipes {
        for key in &recipe.ingredient_keys {
            let normalized = canonicalize_key(&normalize_key(key));
            if &normalized != key {
                warnings.push(format!(
                    "'{}': key '{}' is not canonical (expected '{}')",
                    recipe.title, key, normalized
                ));
            }
        }

        for allergen in detect_allergens(&recipe.ingredient_keys, &recipe.ingredient_names()) {
            if !recipe.allergens.contains(&allergen) {
                warnings.push(format!(
                    "'{}': ingredients imply allergen '{}' which is not declared",
                    recipe.title, allergen
                ));
            }
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::DateTime as BsonDateTime;
    use mongodb::options::IndexOptions;

    fn seeded() -> (Vec<User>, Vec<Recipe>) {
        let users: Vec<User> = default_users()
            .into_iter()
            .map(|f| {
                let mut user = f.into_user("hash".into(), BsonDateTime::now());
                user.id = Some(ObjectId::new());
                user
            })
            .collect();
        let recipes = default_recipes()
            .into_iter()
            .map(|f| {
                let author = users[f.author].id.unwrap();
                let mut recipe = f.into_recipe(author, BsonDateTime::now());
                recipe.id = Some(ObjectId::new());
                recipe
            })
            .collect();
        (users, recipes)
    }

    fn counts(users: u64, recipes: u64, saves: u64, comments: u64) -> BTreeMap<String, u64> {
        [(USERS, users), (RECIPES, recipes), (SAVES, saves), (COMMENTS, comments)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    fn server_indexes() -> HashMap<&'static str, Vec<IndexModel>> {
        let mut indexes: HashMap<&str, Vec<IndexModel>> = HashMap::new();
        for spec in seed_indexes() {
            let options = spec.unique.then(|| IndexOptions::builder().unique(true).build());
            indexes
                .entry(spec.collection)
                .or_default()
                .push(IndexModel::builder().keys(spec.keys).options(options).build());
        }
        indexes
    }

    fn contents(users: &[User], recipes: &[Recipe]) -> Contents {
        Contents::from_documents(
            users.iter().map(|u| bson::to_document(u).unwrap()).collect(),
            recipes.iter().map(|r| bson::to_document(r).unwrap()).collect(),
        )
    }

    fn failed(users: &[User], recipes: &[Recipe], counts: &BTreeMap<String, u64>) -> Vec<&'static str> {
        run_checks(&contents(users, recipes), counts, &server_indexes())
            .into_iter()
            .filter(|c| !c.passed)
            .map(|c| c.name)
            .collect()
    }

    #[test]
    fn test_seeded_state_passes() {
        let (users, recipes) = seeded();
        assert!(failed(&users, &recipes, &counts(3, 6, 0, 0)).is_empty());
    }

    #[test]
    fn test_orphan_recipe_fails() {
        let (users, mut recipes) = seeded();
        recipes[2].author_id = ObjectId::new();
        assert_eq!(failed(&users, &recipes, &counts(3, 6, 0, 0)), vec!["authors_exist"]);
    }

    #[test]
    fn test_inconsistent_keys_fail() {
        let (users, mut recipes) = seeded();
        recipes[0].ingredient_keys.push("sol".into());
        assert_eq!(
            failed(&users, &recipes, &counts(3, 6, 0, 0)),
            vec!["ingredient_keys_consistent"]
        );
    }

    #[test]
    fn test_counts_and_duplicates_fail() {
        let (mut users, recipes) = seeded();
        let mut copy = users[1].clone();
        copy.id = Some(ObjectId::new());
        users.push(copy);
        assert_eq!(
            failed(&users, &recipes, &counts(4, 6, 1, 0)),
            vec!["users_count", "usernames_unique", "saves_empty"]
        );
    }

    #[test]
    fn test_app_written_documents_are_reported_not_fatal() {
        let (users, recipes) = seeded();
        let mut user_docs: Vec<Document> = users.iter().map(|u| bson::to_document(u).unwrap()).collect();
        let mut recipe_docs: Vec<Document> = recipes.iter().map(|r| bson::to_document(r).unwrap()).collect();

        // Registered through the app: no bio field
        let pero_id = ObjectId::new();
        user_docs.push(doc! {
            "_id": pero_id,
            "username": "pero",
            "display_name": "pero",
            "password": "456",
            "created_at": BsonDateTime::now(),
        });
        // Created through the app: qty and unit left empty
        recipe_docs.push(doc! {
            "_id": ObjectId::new(),
            "author_id": pero_id,
            "title": "Juha od luka",
            "description": "",
            "ingredients": [{ "name": "Luk", "key": "luk", "qty": null, "unit": null }],
            "ingredient_keys": ["luk"],
            "steps": [],
            "allergens": [],
            "created_at": BsonDateTime::now(),
        });

        let contents = Contents::from_documents(user_docs, recipe_docs);
        assert_eq!(contents.users.len(), 4);
        assert_eq!(contents.users[3].bio, "");
        assert_eq!(contents.recipes.len(), 6);
        assert!(contents.user_ids.contains(&pero_id));

        let checks = run_checks(&contents, &counts(4, 7, 0, 0), &server_indexes());
        let failed: Vec<&str> = checks.iter().filter(|c| !c.passed).map(|c| c.name).collect();
        assert_eq!(failed, vec!["documents_well_formed", "users_count", "recipes_count"]);

        let malformed = checks.iter().find(|c| c.name == "documents_well_formed").unwrap();
        assert!(malformed.detail.starts_with("recipes 'Juha od luka':"), "{}", malformed.detail);
    }

    #[test]
    fn test_missing_unique_flag_fails() {
        let (users, recipes) = seeded();
        let mut indexes = server_indexes();
        indexes.insert(
            USERS,
            vec![IndexModel::builder().keys(doc! { "username": 1 }).build()],
        );
        let checks = run_checks(&contents(&users, &recipes), &counts(3, 6, 0, 0), &indexes);
        let index_check = checks.iter().find(|c| c.name == "indexes").unwrap();
        assert!(!index_check.passed);
        assert_eq!(index_check.detail, "missing: users(username: 1)");
    }

    #[test]
    fn test_seed_fixture_warnings() {
        let (_, recipes) = seeded();
        // Oats carry a declared gluten tag that detection cannot infer; nothing is missing
        assert!(fixture_warnings(&recipes).is_empty());

        let (_, mut recipes) = seeded();
        recipes[3].allergens.retain(|a| a != "mlijeko");
        recipes[0].ingredient_keys[0] = "Piletina".into();
        recipes[4].ingredient_keys[1] = "paradajz".into();
        let warnings = fixture_warnings(&recipes);
        assert_eq!(warnings.len(), 3);
        assert!(warnings.iter().any(|w| w.contains("key 'paradajz'") && w.contains("expected 'rajcica'")));
        assert!(warnings.iter().any(|w| w.contains("allergen 'mlijeko'")));
        assert!(warnings.iter().any(|w| w.contains("expected 'piletina'")));
    }

    #[test]
    fn test_report_serializes_and_fails() {
        let report = VerifyReport {
            database: "recipes_app".into(),
            checked_at: Utc::now(),
            counts: counts(3, 5, 0, 0),
            checks: vec![
                CheckResult::new("users_count", true, "3 of 3 users"),
                CheckResult::new("recipes_count", false, "5 of 6 recipes"),
            ],
            warnings: vec![],
        };

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["counts"]["recipes"], 5);
        assert_eq!(json["checks"][1]["passed"], false);

        match report.into_result() {
            Err(SeedError::Verification(failed)) => assert_eq!(failed, vec!["recipes_count"]),
            other => panic!("expected verification error, got {:?}", other),
        }
    }
}
