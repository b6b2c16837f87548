//! Collection persistence over the durable key-value backing.
//!
//! # Responsibility
//! - Encode whole collections as JSON arrays under one fixed key.
//! - Separate transport failures from corrupt persisted state.
//!
//! # Invariants
//! - Writes always replace the entire collection.
//! - Read paths reject invalid persisted state instead of masking it.

pub mod collection;
