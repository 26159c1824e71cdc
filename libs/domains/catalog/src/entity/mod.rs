//! Sea-ORM entities for the catalog tables.
//!
//! `product_tags` is the junction between products and tags; it carries no
//! REST surface of its own.

pub mod category;
pub mod product;
pub mod product_tag;
pub mod review;
pub mod tag;
