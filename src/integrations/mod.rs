//! External service integrations.

pub mod gateway_client {
    pub use crate::gateway_client::*;
}

pub mod backend_models {
    pub use crate::backend_models::*;
}
