//! Presswork Domain Concerns

pub mod checkout;
pub mod pricing;
pub mod tax;
