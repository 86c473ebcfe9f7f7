pub mod config;
pub mod health;
pub mod history;
pub mod identity;
pub mod recipes;
pub mod steps;
