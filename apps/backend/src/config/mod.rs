pub mod server;

pub use server::{ServerConfig, StoreConfig};
