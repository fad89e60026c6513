pub mod app;
pub mod config;
pub mod details;
pub mod models;
pub mod pages;
pub mod search;
pub mod tmdb;
