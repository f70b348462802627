// src/types/mod.rs
//! Wire-level request and response bodies

pub mod request;
pub mod response;
