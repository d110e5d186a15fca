//! Workspace-level integration tests for the `indexer` CLI's argument
//! handling — the parts of the surface that don't require a live Postgres
//! instance to exercise.

mod specs;
