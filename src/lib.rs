//! Nurture Library
//!
//! Storage, validation and HTTP routing for child nutrition and wellbeing
//! tracking: children, meals, mood logs, recipes, ingredients and dietary
//! guidelines.

pub mod build_info;
pub mod config;
pub mod db;
pub mod models;
pub mod routes;
pub mod store;
pub mod validation;
