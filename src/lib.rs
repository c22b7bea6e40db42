pub mod badges;
pub mod db;
pub mod email;
pub mod engine;
pub mod generate;
pub mod models;
pub mod names;
pub mod session;
