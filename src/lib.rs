pub mod models;
pub mod tracking;
pub mod web;
