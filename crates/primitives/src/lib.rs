//! Shared types for the loyalty wallet-pass pipeline.
//!
//! A claim is identified by its [`job::ExternalId`], which is the
//! `cardId-ethAddress` pair. The same string is the pass serial number and
//! the key of the notification channel subscription, so everything that
//! needs to correlate a dispatch with its completion goes through this crate.

pub mod claim;
pub mod job;
pub mod merchant;
pub mod notification;
pub mod platform;
pub mod validation;
