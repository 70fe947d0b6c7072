//! Download the archive files advertised on a listing page into a local
//! directory, skipping files that are already present.

pub mod api;
pub mod application;
pub mod config;
pub mod domain;
pub mod utils;
