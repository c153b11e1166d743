use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "monitor")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(column_name = "type")]
    pub monitor_type: String,
    pub url: Option<String>,
    pub hostname: Option<String>,
    pub port: Option<i32>,
    pub send_url: bool,
    pub active: bool,
    pub basic_auth_user: Option<String>,
    pub basic_auth_pass: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
