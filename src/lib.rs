pub mod ci;
pub mod config;
pub mod domain;
pub mod error;
pub mod git;
pub mod output;
pub mod ui;
pub mod validator;

pub use error::{ReleaseError, Result, ValidationError};
pub use validator::{CiCheck, ValidationResult, Validator, ValidatorOptions};
