mod types;

pub use types::{Result, ScreenError};
