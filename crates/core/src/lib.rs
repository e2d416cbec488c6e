//! Presswork
//!
//! Order pricing reconciliation for a trade-printing storefront: discount
//! allocation across cart lines, hosted tax-calculation request shaping,
//! post-settlement tax reconciliation and vendor variant price resolution.

pub mod checkout;
pub mod discounts;
pub mod lines;
pub mod pricing;
pub mod tax;
