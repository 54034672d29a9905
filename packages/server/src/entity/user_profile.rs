use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Display identity shown in the header (name, avatar).
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_profile")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: i32,
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: HasOne<super::user::Entity>,

    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub email: Option<String>,
}

impl ActiveModelBehavior for ActiveModel {}
