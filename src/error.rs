//! Application error type.
//!
//! Errors carry a process exit code so `main` can report failures the way a
//! batch tool should. The codes are stable:
//!
//! - 2: bad input/configuration (CLI values, rule files)
//! - 3: persisted store corruption (e.g. an unrecognized date format),
//!   always fatal and never silently repaired
//! - 4: network/source failures that left us with nothing usable
//! - 5: trend fit failures (too few points, no converging candidate)
//!
//! Per-entry problems (an unparsable bulletin title, one failed detail
//! fetch) are *not* errors at this level: the crawl skips and counts them.

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    /// Bad input/configuration.
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(2, message)
    }

    /// Persisted store is corrupt in a way we cannot self-correct.
    pub fn store(message: impl Into<String>) -> Self {
        Self::new(3, message)
    }

    /// A fetch failed and there is no partial result to fall back to.
    pub fn fetch(message: impl Into<String>) -> Self {
        Self::new(4, message)
    }

    /// The trend fitter could not produce coefficients.
    pub fn fit(message: impl Into<String>) -> Self {
        Self::new(5, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
