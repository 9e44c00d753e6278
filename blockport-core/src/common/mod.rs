//! Common utilities shared across the import pipeline and the CLI

pub mod db_errors;
