//! Pricing Handlers

pub(crate) mod resolve;
