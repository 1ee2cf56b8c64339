//! Input validation limits and search defaults

/// Maximum length for an individual identifier (256 chars)
pub const MAX_ID_LEN: usize = 256;

/// Default generation cap for ancestor searches (50)
pub const DEFAULT_ANCESTOR_DEPTH: u32 = 50;

/// Default cap on the length of a connecting path (100)
pub const DEFAULT_PATH_DEPTH: u32 = 100;

/// Maximum depth a caller may request (1000)
pub const MAX_SEARCH_DEPTH: u32 = 1000;

/// Default number of equal-length paths returned when all paths are requested (5)
pub const DEFAULT_MAX_PATHS: usize = 5;

/// Maximum number of equal-length paths a caller may request (100)
pub const MAX_PATHS: usize = 100;

/// Individuals expanded between two cancellation checks (256)
pub const BUDGET_CHECK_INTERVAL: usize = 256;

/// Validation error type
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    EmptyId,
    IdTooLong { len: usize, max: usize },
    DepthTooLarge { depth: u32, max: u32 },
    ZeroDepth,
    TooManyPaths { count: usize, max: usize },
    ConfidenceOutOfRange { value: f64 },
    NoEdgeKinds,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "Individual id cannot be empty"),
            Self::IdTooLong { len, max } => {
                write!(f, "Individual id too long: {} chars (max {})", len, max)
            }
            Self::DepthTooLarge { depth, max } => {
                write!(f, "Search depth too large: {} (max {})", depth, max)
            }
            Self::ZeroDepth => write!(f, "Search depth must be at least 1"),
            Self::TooManyPaths { count, max } => {
                write!(f, "Too many paths requested: {} (max {})", count, max)
            }
            Self::ConfidenceOutOfRange { value } => {
                write!(f, "Confidence must be within [0, 1], got {}", value)
            }
            Self::NoEdgeKinds => write!(f, "At least one edge kind must be allowed"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validate an individual identifier
pub fn validate_id(id: &str) -> Result<(), ValidationError> {
    if id.is_empty() {
        return Err(ValidationError::EmptyId);
    }
    if id.len() > MAX_ID_LEN {
        return Err(ValidationError::IdTooLong {
            len: id.len(),
            max: MAX_ID_LEN,
        });
    }
    Ok(())
}

/// Validate a search depth
pub fn validate_depth(depth: u32) -> Result<(), ValidationError> {
    if depth == 0 {
        return Err(ValidationError::ZeroDepth);
    }
    if depth > MAX_SEARCH_DEPTH {
        return Err(ValidationError::DepthTooLarge {
            depth,
            max: MAX_SEARCH_DEPTH,
        });
    }
    Ok(())
}

/// Validate the number of paths requested
pub fn validate_max_paths(count: usize) -> Result<(), ValidationError> {
    if count > MAX_PATHS {
        return Err(ValidationError::TooManyPaths {
            count,
            max: MAX_PATHS,
        });
    }
    Ok(())
}

/// Validate an edge confidence weight
pub fn validate_confidence(value: f64) -> Result<(), ValidationError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ValidationError::ConfidenceOutOfRange { value });
    }
    Ok(())
}
