//! Build-time synchronization of a remote notes feed into static site artifacts.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;
pub mod util;
