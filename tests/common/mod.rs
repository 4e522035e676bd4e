//! Shared integration test support.

#![allow(dead_code)]

pub mod harness;
pub mod http_client;
