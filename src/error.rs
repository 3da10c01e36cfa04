/// Errors returned by the calculator.
///
/// None of these are recovered from internally: any of them aborts the
/// computation of a trip and no partial emissions are returned.
#[derive(Debug)]
pub enum Error {
    /// The request is malformed, e.g. both `distance` and `stops` were given,
    /// fewer than two stops, an unknown transportation mode or an unknown
    /// categorical value.
    Validation(String),
    /// A location or airport could not be geocoded
    NotFound(String),
    /// No emission factor matches the requested combination of attributes
    Lookup(String),
    /// A collaborator required by the request was not configured
    Configuration(String),
    /// An error originating from a collaborator (network, disk, decoding)
    Provider(Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn provider(message: impl Into<String>) -> Self {
        Self::Provider(message.into().into())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Provider(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(e) => write!(f, "invalid request: {e}"),
            Self::NotFound(e) => write!(f, "not found: {e}"),
            Self::Lookup(e) => write!(f, "no emission factor for {e}"),
            Self::Configuration(e) => write!(f, "not configured: {e}"),
            Self::Provider(e) => std::fmt::Display::fmt(&e, f),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Provider(Box::new(error))
    }
}

impl From<csv::Error> for Error {
    fn from(error: csv::Error) -> Self {
        Self::Provider(Box::new(error))
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::Provider(Box::new(error))
    }
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        Self::Provider(Box::new(error))
    }
}

impl From<reqwest_middleware::Error> for Error {
    fn from(error: reqwest_middleware::Error) -> Self {
        Self::Provider(Box::new(error))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(
            Error::validation("unknown mode `boat`").to_string(),
            "invalid request: unknown mode `boat`"
        );
        assert_eq!(
            Error::Lookup("bus (average, average, 30, long-distance)".to_string()).to_string(),
            "no emission factor for bus (average, average, 30, long-distance)"
        );
    }

    #[test]
    fn provider_has_source() {
        let e: Error = std::io::Error::new(std::io::ErrorKind::Other, "disk").into();
        assert!(std::error::Error::source(&e).is_some());
        assert!(std::error::Error::source(&Error::validation("x")).is_none());
    }
}
