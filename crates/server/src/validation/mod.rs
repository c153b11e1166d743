pub mod domain_name;

pub use domain_name::{DomainNameError, validate_domain_name};
