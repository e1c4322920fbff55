//! Infrastructure layer - store selection and application state assembly.

pub mod state;
