pub mod coordinator;
pub mod interaction;
pub mod use_cases;

pub use coordinator::*;
pub use interaction::*;
pub use use_cases::*;
