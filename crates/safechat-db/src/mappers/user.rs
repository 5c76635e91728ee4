//! User entity <-> model mapper

use safechat_core::entities::{AccountKind, User};
use safechat_core::value_objects::Snowflake;

use crate::models::UserModel;

/// The account kind is resolved here, once, from the nullable username
impl From<UserModel> for User {
    fn from(model: UserModel) -> Self {
        User {
            id: Snowflake::new(model.id),
            kind: AccountKind::from_username(model.username.as_deref()),
            first_name: model.first_name,
            last_name: model.last_name,
            avatar_url: model.avatar_url,
            created_at: model.created_at,
        }
    }
}

/// User values for database insertion
pub struct UserInsert<'a> {
    pub id: i64,
    pub username: Option<&'a str>,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub avatar_url: Option<&'a str>,
}

impl<'a> UserInsert<'a> {
    pub fn new(user: &'a User) -> Self {
        Self {
            id: user.id.into_inner(),
            username: user.kind.username(),
            first_name: &user.first_name,
            last_name: &user.last_name,
            avatar_url: user.avatar_url.as_deref(),
        }
    }
}
