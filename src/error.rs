#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when the lower bound is greater than or equal to the upper bound.
    #[error("invalid bounds: lower ({lower}) must be less than upper ({upper})")]
    InvalidBounds {
        /// The lower bound value.
        lower: f64,
        /// The upper bound value.
        upper: f64,
    },

    /// Returned when logarithmic scale is used with a non-positive lower bound.
    #[error("invalid scale: logarithmic scale requires a strictly positive lower bound")]
    InvalidScale,

    /// Returned when a quantization is not positive or exceeds the bound span.
    #[error("invalid quantization: {0} must be positive and no larger than the bound span")]
    InvalidQuantization(f64),

    /// Returned when a distribution is structurally malformed (e.g. empty or
    /// zero-sum roulette areas).
    #[error("invalid distribution: {0}")]
    InvalidDistribution(&'static str),

    /// Returned when a value does not fit the operation it is used in.
    #[error("invalid value: {0}")]
    InvalidValue(&'static str),

    /// Returned when a datum has the wrong type for an operation.
    #[error("invalid type: expected {expected}, got {got}")]
    InvalidType {
        /// A description of the expected type.
        expected: &'static str,
        /// A description of the actual type.
        got: &'static str,
    },

    /// Returned when an expression is structurally invalid for its use site.
    #[error("invalid expression: {0}")]
    InvalidExpression(&'static str),

    /// Returned when a hyperparameter definition is invalid.
    #[error("invalid hyperparameter '{name}': {reason}")]
    InvalidHyperparameter {
        /// The name of the offending hyperparameter.
        name: String,
        /// The reason the definition is rejected.
        reason: &'static str,
    },

    /// Returned when adding a hyperparameter whose name is already taken.
    #[error("duplicate hyperparameter name '{0}'")]
    DuplicateHyperparameter(String),

    /// Returned when looking up a hyperparameter name that does not exist.
    #[error("unknown hyperparameter name '{0}'")]
    UnknownHyperparameter(String),

    /// Returned when an index is outside a collection.
    #[error("index {index} out of bounds for length {len}")]
    OutOfBounds {
        /// The offending index.
        index: usize,
        /// The length of the indexed collection.
        len: usize,
    },

    /// Returned when an activation condition is rejected (already set, or not
    /// a boolean expression).
    #[error("invalid condition: {0}")]
    InvalidCondition(&'static str),

    /// Returned when activation conditions form a cycle.
    #[error("invalid graph: activation conditions contain a cycle")]
    InvalidGraph,

    /// Returned when a configuration does not satisfy its space.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(&'static str),

    /// Returned when a value is supplied for a hyperparameter that the
    /// activation conditions make inactive, or when an inactive value reaches
    /// an operator that cannot handle it.
    #[error("inactive hyperparameter '{0}'")]
    InactiveHyperparameter(String),

    /// Returned when two values cannot be ordered against each other.
    #[error("values are not comparable")]
    NotComparable,

    /// Returned when an evaluation does not belong to a tuner's spaces.
    #[error("invalid evaluation: {0}")]
    InvalidEvaluation(&'static str),

    /// Returned when a features binding does not satisfy its features space.
    #[error("invalid features: {0}")]
    InvalidFeatures(&'static str),

    /// Returned when a tuner strategy violates the ask/tell contract.
    #[error("invalid tuner: {0}")]
    InvalidTuner(&'static str),

    /// Returned when rejection sampling exhausts its retry budget.
    #[error("sampling unsuccessful: rejection retry budget exhausted")]
    SamplingUnsuccessful,

    /// Returned when an operation is not defined for the receiver (e.g.
    /// sampling a string hyperparameter).
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(&'static str),
}

pub type Result<T> = core::result::Result<T, Error>;
