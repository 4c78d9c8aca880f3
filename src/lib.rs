//! CoinBridge - Multi-Provider Cryptocurrency Payment Gateway Adapter
//!
//! This crate lets a merchant application create, query, and reconcile
//! cryptocurrency payment invoices through multiple third-party payment
//! providers behind one canonical invoice model.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
