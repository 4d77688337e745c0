//! Archive query and text-recovery engine for imarchive.
//!
//! This crate defines the `ArchiveStore` port that the infrastructure layer
//! implements, plus the engine built on it: timestamp normalization, body
//! decoding, display mapping, pagination, context windows, and two-phase
//! search. It depends only on `imarchive-types` -- never on
//! `imarchive-infra` or any database crate.

pub mod context;
pub mod decoder;
pub mod mapper;
pub mod pagination;
pub mod repository;
pub mod search;
pub mod service;
pub mod timestamp;

#[cfg(test)]
pub(crate) mod test_support;
