use crate::config::ConfigError;
use crate::kriging::{CellFailure, GridSolveError, KrigingError};
use crate::spatial::SpatialError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type KrigeResult<T> = Result<T, KrigeError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KrigeErrorCategory {
    InputValidationError,
    IoSystemError,
    ComputationError,
    InternalError,
}

impl KrigeErrorCategory {
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::InputValidationError => 2,
            Self::IoSystemError => 3,
            Self::ComputationError => 4,
            Self::InternalError => 5,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InputValidationError => "InputValidationError",
            Self::IoSystemError => "IoSystemError",
            Self::ComputationError => "ComputationError",
            Self::InternalError => "InternalError",
        }
    }
}

/// Categorised error surfaced at the outer boundary (CLI, embedding callers).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KrigeError {
    category: KrigeErrorCategory,
    code: &'static str,
    message: String,
}

impl KrigeError {
    pub fn new(category: KrigeErrorCategory, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            category,
            code,
            message: message.into(),
        }
    }

    pub fn input_validation(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(KrigeErrorCategory::InputValidationError, code, message)
    }

    pub fn io_system(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(KrigeErrorCategory::IoSystemError, code, message)
    }

    pub fn computation(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(KrigeErrorCategory::ComputationError, code, message)
    }

    pub fn internal(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(KrigeErrorCategory::InternalError, code, message)
    }

    pub const fn category(&self) -> KrigeErrorCategory {
        self.category
    }

    pub const fn code(&self) -> &'static str {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn exit_code(&self) -> i32 {
        self.category.exit_code()
    }

    pub fn diagnostic_line(&self) -> String {
        format!("ERROR: [{}] {}", self.code, self.message)
    }

    pub fn fatal_exit_line(&self) -> String {
        format!("FATAL EXIT CODE: {}", self.exit_code())
    }
}

impl Display for KrigeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] {}",
            self.category.as_str(),
            self.code,
            self.message
        )
    }
}

impl Error for KrigeError {}

impl From<KrigingError> for KrigeError {
    fn from(error: KrigingError) -> Self {
        let message = error.to_string();
        match error {
            KrigingError::NoStations => Self::input_validation("INPUT.STATION_COUNT", message),
            KrigingError::LengthMismatch { .. } => {
                Self::input_validation("INPUT.ARRAY_LENGTH", message)
            }
            KrigingError::NonFiniteInput { .. } => {
                Self::input_validation("INPUT.NON_FINITE", message)
            }
            KrigingError::SingularSystem { ref source, .. } => {
                Self::computation("RUN.SINGULAR_SYSTEM", format!("{message}: {source}"))
            }
            KrigingError::InsufficientStations { .. } => {
                Self::computation("RUN.INSUFFICIENT_STATIONS", message)
            }
        }
    }
}

impl From<CellFailure> for KrigeError {
    fn from(failure: CellFailure) -> Self {
        let context = failure.to_string();
        let inner = Self::from(failure.source);
        Self::new(
            inner.category,
            inner.code,
            format!("{context}: {}", inner.message),
        )
    }
}

impl From<GridSolveError> for KrigeError {
    fn from(error: GridSolveError) -> Self {
        let message = error.to_string();
        match error {
            GridSolveError::NoWorkers => Self::input_validation("INPUT.WORKER_COUNT", message),
            GridSolveError::InvalidInput(source) => Self::from(source),
            GridSolveError::WorkerPool(_) => Self::internal("SYS.WORKER_POOL", message),
            GridSolveError::Cell(failure) => Self::from(failure),
        }
    }
}

impl From<SpatialError> for KrigeError {
    fn from(error: SpatialError) -> Self {
        let message = error.to_string();
        match error {
            SpatialError::LengthMismatch { .. } => {
                Self::input_validation("INPUT.ARRAY_LENGTH", message)
            }
            SpatialError::DegenerateTrend { .. } => {
                Self::input_validation("INPUT.DEGENERATE_TREND", message)
            }
            SpatialError::NoReportingStations => {
                Self::input_validation("INPUT.NO_REPORTING_STATIONS", message)
            }
            SpatialError::Grid(source) => Self::from(source),
        }
    }
}

impl From<ConfigError> for KrigeError {
    fn from(error: ConfigError) -> Self {
        let message = error.to_string();
        match error {
            ConfigError::Read { .. } => Self::io_system("IO.CONFIG_READ", message),
            ConfigError::Parse { .. } => Self::input_validation("INPUT.CONFIG_PARSE", message),
            ConfigError::Invalid { .. } => Self::input_validation("INPUT.CONFIG_INVALID", message),
        }
    }
}
