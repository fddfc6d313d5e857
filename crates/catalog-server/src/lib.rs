pub mod assets;
pub mod config;
pub mod db;
pub mod dto;
pub mod error_convert;
pub mod health;
pub mod input;
pub mod openapi;
pub mod repo;
pub mod rest;
pub mod search;
pub mod slug;
pub mod storage;
pub mod telemetry;
