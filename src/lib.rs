//! Reelcraft - Credit wallet, pricing, and billing core
//!
//! This crate implements the wallet-ledger, scheduled-pricing, coupon, and
//! invoice/refund subsystem of the Reelcraft video enhancement platform.
//! HTTP routing, authentication, storage, and payment execution live behind
//! ports and are wired in by the surrounding service.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
