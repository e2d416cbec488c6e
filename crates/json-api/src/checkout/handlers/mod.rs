//! Checkout Handlers

pub(crate) mod quote;
pub(crate) mod reconcile;
