// Domain-layer modules and shared errors/models
pub mod search {
    pub use crate::position::classify;
    pub use crate::search::*;
}

pub mod models {
    pub use crate::models::*;
}

pub mod lead_board {
    pub use crate::lead_board::*;
}

pub mod errors {
    pub use crate::errors::*;
}
