//! Test that basic usage compiles successfully

use core_proc_macros::{ApiResource, SeaOrmResource};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, SeaOrmResource)]
#[sea_orm(table_name = "tags")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

fn main() {
    let _ = (
        Model::URL,
        Model::URL_WITH_ID,
        Model::COLLECTION,
        Model::TAG,
        Model::RESOURCE,
    );
}
