pub mod aggregate;
pub mod classify;
pub mod error;
pub mod result;
pub mod testcase;

pub use aggregate::*;
pub use error::{Error, Result};
pub use result::*;
pub use testcase::*;
