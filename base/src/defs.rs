use std::error::Error as StdError;
use std::fmt;
use std::result::Result as StdResult;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    BadOperation = 1,
    InconsistentState = 2,
    IoError = 3,
    MalformedData = 4,
    UnsupportedFeature = 5,
}

#[derive(Debug)]
pub struct Error {
    pub kind: ErrorKind,
    pub description: String,
    pub source: Option<Box<dyn StdError + Send + Sync>>,
}

impl Error {
    pub fn new(kind: ErrorKind, description: String) -> Self {
        Self {
            kind,
            description,
            source: None,
        }
    }

    pub fn with_source<E: StdError + Send + Sync + 'static>(
        kind: ErrorKind,
        description: String,
        source: E,
    ) -> Self {
        Self {
            kind,
            description,
            source: Some(Box::new(source)),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description)?;
        if let Some(source) = &self.source {
            write!(f, ": {}", source)?;
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::with_source(ErrorKind::IoError, "I/O failure".to_string(), err)
    }
}

pub type Result<T> = StdResult<T, Error>;

pub trait IntoResult<T> {
    fn res<F: FnOnce() -> String>(self, desc: F) -> Result<T>;
}

impl<T, E: StdError + Send + Sync + 'static> IntoResult<T> for StdResult<T, E> {
    fn res<F: FnOnce() -> String>(self, desc: F) -> Result<T> {
        self.map_err(|err| {
            let dyn_err = &err as &(dyn StdError + 'static);
            let kind = if dyn_err.is::<std::io::Error>() {
                ErrorKind::IoError
            } else {
                ErrorKind::MalformedData
            };
            Error::with_source(kind, desc(), err)
        })
    }
}

#[macro_export]
macro_rules! assert_eq_f32 {
    ($left:expr, $right:expr) => {
        $crate::assert_eq_f32!($left, $right, 1e-5)
    };
    ($left:expr, $right:expr, $eps:expr) => {{
        let (left, right) = ($left as f64, $right as f64);
        assert!(
            (left - right).abs() <= $eps as f64,
            "assertion failed: `left ~= right` (left: `{}`, right: `{}`)",
            left,
            right
        );
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_res_keeps_source() {
        let parsed: StdResult<u32, _> = "x".parse::<u32>();
        let err = parsed.res(|| "failed to parse".to_string()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::MalformedData);
        assert!(err.to_string().starts_with("failed to parse: "));
        assert!(StdError::source(&err).is_some());
    }

    #[test]
    fn test_io_error_kind() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        let err = Err::<(), _>(io).res(|| "failed".to_string()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::IoError);
    }
}
