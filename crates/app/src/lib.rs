//! Presswork application services, repositories and hosted-service clients.

pub mod context;
pub mod database;
pub mod domain;

#[cfg(test)]
mod test;
