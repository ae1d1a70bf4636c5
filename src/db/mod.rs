pub mod hydrate;
pub mod repository;
