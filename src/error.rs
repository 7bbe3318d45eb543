use thiserror::Error;

/// Top-level error type for the packing engine.
#[derive(Debug, Error)]
pub enum PackError {
    #[error(transparent)]
    Mesh(#[from] MeshError),

    #[error(transparent)]
    Params(#[from] ParamsError),

    #[error(transparent)]
    Anneal(#[from] AnnealError),
}

/// Errors raised while building a mesh from raw vertex data.
#[derive(Debug, Error)]
pub enum MeshError {
    #[error("triangle index {index} is out of range for {len} vertices")]
    IndexOutOfRange { index: u32, len: usize },

    #[error("vertex {index} has a non-finite coordinate")]
    NonFiniteVertex { index: usize },
}

/// Errors related to packing parameters.
#[derive(Debug, Error)]
pub enum ParamsError {
    #[error("parameter {parameter} = {value} is out of range [{min}, {max}]")]
    OutOfRange {
        parameter: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

/// Errors related to the annealing schedule.
#[derive(Debug, Error)]
pub enum AnnealError {
    #[error("temperature {parameter} = {value} must be finite and positive")]
    InvalidTemperature { parameter: &'static str, value: f64 },
}

/// Convenience type alias for results using [`PackError`].
pub type Result<T> = std::result::Result<T, PackError>;
