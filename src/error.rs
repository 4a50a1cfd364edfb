use thiserror::Error;

/// Fatal solve errors. Structural splice violations are not errors; they
/// accumulate as warnings on the result.
#[derive(Debug, Error)]
pub enum SolveError {
    #[error("stock catalog is empty")]
    EmptyCatalog,

    #[error(
        "bar {bar_mark}: lap length {lap_mm} mm is not shorter than the \
         largest stock length {max_stock_mm} mm"
    )]
    LapExceedsStock {
        bar_mark: String,
        lap_mm: u32,
        max_stock_mm: u32,
    },

    #[error("bar {bar_mark}: piece of {piece_mm} mm cannot advance past a {lap_mm} mm lap")]
    DegenerateCut {
        bar_mark: String,
        piece_mm: u32,
        lap_mm: u32,
    },

    #[error("dia {dia}: no stock length can serve a {length_mm} mm cut")]
    UnservedRequest { dia: u32, length_mm: u32 },

    #[error("run {id}: {reason}")]
    InvalidRun { id: String, reason: String },

    #[error("invalid geometry {raw:?}: {reason}")]
    InvalidGeometry { raw: String, reason: String },

    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}

pub type SolveResult<T> = Result<T, SolveError>;
