pub mod errors;

pub use errors::{KrigeError, KrigeErrorCategory, KrigeResult};
