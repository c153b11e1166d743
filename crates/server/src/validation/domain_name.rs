use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainNameError {
    #[error("Invalid domain: empty string")]
    Empty,
    #[error("Invalid domain: {0} (Not a valid DNS name)")]
    NotValidDns(String),
    #[error("Invalid domain: {domain} (Invalid character '{character}')")]
    InvalidCharacter { domain: String, character: char },
}

/// Check that `domain` is something a `Host` header can carry: an ASCII DNS name
/// without port, scheme or path.
pub fn validate_domain_name(domain: &str) -> Result<(), DomainNameError> {
    if domain.is_empty() {
        return Err(DomainNameError::Empty);
    }

    if !domain.is_ascii()
        || domain.len() > 253
        || domain.contains("..")
        || domain.starts_with('.')
        || domain.starts_with('-')
    {
        return Err(DomainNameError::NotValidDns(domain.to_string()));
    }

    for c in domain.chars() {
        if !c.is_ascii_alphanumeric() && c != '-' && c != '.' {
            return Err(DomainNameError::InvalidCharacter {
                domain: domain.to_string(),
                character: c,
            });
        }
    }

    if domain.split('.').any(|label| label.len() > 63) {
        return Err(DomainNameError::NotValidDns(domain.to_string()));
    }

    Ok(())
}
