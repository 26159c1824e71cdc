//! Deriving without a table name must fail to compile

use core_proc_macros::SeaOrmResource;

#[derive(SeaOrmResource)]
pub struct Model {
    pub id: i32,
    pub name: String,
}

fn main() {}
