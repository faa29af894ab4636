// Library for tests to access modules

pub mod collector;
pub mod config;
pub mod docker_repo;
pub mod logs_repo;
pub mod models;
pub mod proc_repo;
pub mod rates;
pub mod routes;
pub mod static_info;
pub mod version;
