//! # Application Services

mod factory;
mod group_client;

pub use factory::{DefaultGroupClientFactory, GroupClientFactory};
pub use group_client::{GroupClient, GroupClientConfig};
