pub mod entity;
pub mod filter;
pub mod migrations;
pub mod repo;
