//! Postgres-backed test harness.

mod db;
mod helpers;

pub(crate) use db::TestDb;
pub(crate) use helpers::*;
