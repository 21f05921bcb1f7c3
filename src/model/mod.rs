pub mod api;
pub mod auth;
pub mod db;
pub mod gateway;
pub mod mongodb;
pub mod storage;
pub mod wallet;
