use crate::models::{Ingredient, Recipe, User};
use crate::utils::SeedError;
use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use std::collections::{BTreeSet, HashSet};

/// Seed user before password hashing and id generation
#[derive(Debug, Clone)]
pub struct UserFixture {
    pub username: &'static str,
    pub display_name: &'static str,
    pub bio: &'static str,
}

impl UserFixture {
    pub fn into_user(self, password_hash: String, now: BsonDateTime) -> User {
        User {
            id: None,
            username: self.username.into(),
            password: password_hash,
            display_name: self.display_name.into(),
            bio: self.bio.into(),
            created_at: now,
        }
    }
}

/// Seed recipe; `author` indexes into the user fixtures
#[derive(Debug, Clone)]
pub struct RecipeFixture {
    pub author: usize,
    pub title: &'static str,
    pub description: &'static str,
    pub ingredients: Vec<Ingredient>,
    pub ingredient_keys: Vec<&'static str>,
    pub steps: Vec<&'static str>,
    pub allergens: Vec<&'static str>,
}

impl RecipeFixture {
    pub fn into_recipe(self, author_id: ObjectId, now: BsonDateTime) -> Recipe {
        Recipe {
            id: None,
            author_id,
            title: self.title.into(),
            description: self.description.into(),
            ingredients: self.ingredients,
            ingredient_keys: self.ingredient_keys.into_iter().map(String::from).collect(),
            steps: self.steps.into_iter().map(String::from).collect(),
            allergens: self.allergens.into_iter().map(String::from).collect(),
            created_at: now,
        }
    }
}

fn ingredient(name: &str, key: &str, quantity: f64, unit: &str) -> Ingredient {
    Ingredient {
        name: name.into(),
        key: key.into(),
        quantity,
        unit: unit.into(),
    }
}

pub fn default_users() -> Vec<UserFixture> {
    vec![
        UserFixture {
            username: "ana",
            display_name: "Ana Horvat",
            bio: "Brzi ručkovi i mediteranska kuhinja.",
        },
        UserFixture {
            username: "ivan",
            display_name: "Ivan Novak",
            bio: "Fitness + meal-prep recepti.",
        },
        UserFixture {
            username: "maja",
            display_name: "Maja Kovač",
            bio: "Volim slastice i vegetarijanska jela.",
        },
    ]
}

pub fn default_recipes() -> Vec<RecipeFixture> {
    const ANA: usize = 0;
    const IVAN: usize = 1;
    const MAJA: usize = 2;

    vec![
        RecipeFixture {
            author: ANA,
            title: "Piletina s rižom",
            description: "Brzo i fino.",
            ingredients: vec![
                ingredient("Piletina", "piletina", 300.0, "g"),
                ingredient("Riža", "riza", 200.0, "g"),
                ingredient("Luk", "luk", 1.0, "kom"),
            ],
            ingredient_keys: vec!["piletina", "riza", "luk"],
            steps: vec!["Skuhaj rižu", "Ispeci piletinu", "Dodaj luk"],
            allergens: vec![],
        },
        RecipeFixture {
            author: ANA,
            title: "Tjestenina s rajčicom",
            description: "Klasika za 15 minuta.",
            ingredients: vec![
                ingredient("Tjestenina", "tjestenina", 250.0, "g"),
                ingredient("Rajčica", "rajcica", 3.0, "kom"),
                ingredient("Češnjak", "cesnjak", 2.0, "cesanj"),
            ],
            ingredient_keys: vec!["tjestenina", "rajcica", "cesnjak"],
            steps: vec!["Skuhaj tjesteninu", "Skuhaj umak", "Pomiješaj i posluži"],
            allergens: vec!["gluten"],
        },
        RecipeFixture {
            author: IVAN,
            title: "Zobena kaša s bananom",
            description: "Doručak bez komplikacija.",
            ingredients: vec![
                ingredient("Zobene pahuljice", "zob", 60.0, "g"),
                ingredient("Mlijeko", "mlijeko", 250.0, "ml"),
                ingredient("Banana", "banana", 1.0, "kom"),
            ],
            ingredient_keys: vec!["zob", "mlijeko", "banana"],
            steps: vec!["Skuhaj zob u mlijeku", "Dodaj narezanu bananu"],
            allergens: vec!["gluten", "mlijeko"],
        },
        RecipeFixture {
            author: IVAN,
            title: "Proteinski omlet",
            description: "Brz obrok s puno proteina.",
            ingredients: vec![
                ingredient("Jaja", "jaja", 3.0, "kom"),
                ingredient("Šunka", "sunka", 80.0, "g"),
                ingredient("Sir", "sir", 50.0, "g"),
            ],
            ingredient_keys: vec!["jaja", "sunka", "sir"],
            steps: vec!["Umuti jaja", "Dodaj šunku i sir", "Ispeci na tavi"],
            allergens: vec!["jaja", "mlijeko"],
        },
        RecipeFixture {
            author: MAJA,
            title: "Salata od slanutka",
            description: "Vegetarijanska i zasitna.",
            ingredients: vec![
                ingredient("Slanutak", "slanutak", 240.0, "g"),
                ingredient("Rajčica", "rajcica", 2.0, "kom"),
                ingredient("Luk", "luk", 1.0, "kom"),
            ],
            ingredient_keys: vec!["slanutak", "rajcica", "luk"],
            steps: vec!["Isperi slanutak", "Nareži povrće", "Sve pomiješaj i začini"],
            allergens: vec![],
        },
        RecipeFixture {
            author: MAJA,
            title: "Palačinke s orasima",
            description: "Slastica za vikend.",
            ingredients: vec![
                ingredient("Brašno", "brasno", 200.0, "g"),
                ingredient("Mlijeko", "mlijeko", 300.0, "ml"),
                ingredient("Jaja", "jaja", 2.0, "kom"),
                ingredient("Orah", "orah", 80.0, "g"),
            ],
            ingredient_keys: vec!["brasno", "mlijeko", "jaja", "orah"],
            steps: vec!["Umuti smjesu", "Ispeci palačinke", "Nadjev: mljeveni orah"],
            allergens: vec!["gluten", "mlijeko", "jaja", "orasasti_plodovi"],
        },
    ]
}

/// Checks the fixture invariants before anything is written
pub fn validate_fixtures(users: &[UserFixture], recipes: &[RecipeFixture]) -> Result<(), SeedError> {
    let mut usernames = HashSet::new();
    for user in users {
        if !usernames.insert(user.username) {
            return Err(SeedError::Fixture(format!("duplicate username '{}'", user.username)));
        }
    }

    for recipe in recipes {
        if recipe.author >= users.len() {
            return Err(SeedError::Fixture(format!(
                "recipe '{}' references missing author #{}",
                recipe.title, recipe.author
            )));
        }

        let declared: BTreeSet<&str> = recipe.ingredient_keys.iter().copied().collect();
        let actual: BTreeSet<&str> = recipe.ingredients.iter().map(|i| i.key.as_str()).collect();
        if declared != actual {
            return Err(SeedError::Fixture(format!(
                "recipe '{}' ingredient_keys {:?} do not match ingredient keys {:?}",
                recipe.title, declared, actual
            )));
        }
    }

    Ok(())
}
