//! Hexagonal CRUD backend for three demo domains (characters and comments,
//! products, students and evaluations) built around a weighted grade
//! calculation engine.

pub mod auth;
pub mod characters;
pub mod config;
pub mod error;
pub mod grading;
pub mod products;
pub mod repository;
pub mod telemetry;

pub use repository::RepositoryError;
