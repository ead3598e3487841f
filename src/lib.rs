//! Scheduled newsletter delivery: polls the message store for due
//! broadcasts and fans each one out to every subscribed recipient.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
