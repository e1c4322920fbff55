pub mod caller_id;

pub use caller_id::CallerId;
