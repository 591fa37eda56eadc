// src/lib.rs

//! hh.ru vacancy collector library
//!
//! Fetches vacancies from the hh.ru API, converts salaries to RUB, keeps
//! them in a local JSON document and exports them to CSV.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
