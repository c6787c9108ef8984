pub mod api;
pub mod auth;
pub mod db;
pub mod draft;
pub mod mongodb;
