//! Shared test infrastructure: in-memory collaborators and data builders.

#![allow(dead_code)] // Not every integration test uses every helper

pub mod builders;
pub mod mocks;
