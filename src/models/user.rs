use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};

/// Document stored in the `users` collection
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub username: String,
    /// bcrypt hash, never the plain password
    pub password: String,
    pub display_name: String,
    /// Users registered through the app have no bio
    #[serde(default)]
    pub bio: String,
    pub created_at: BsonDateTime,
}
