/// Default number of simulated seasons per batch
pub const DEFAULT_RUNS: usize = 10_000;

/// Number of seeds that qualify for the playoffs unless the league says otherwise
pub const DEFAULT_PLAYOFF_SPOTS: usize = 6;

/// Division identifiers of a standard two-division league
pub const DEFAULT_DIVISIONS: [u32; 2] = [0, 1];

/// Lower bound of the tabulated density curve (points)
pub const DENSITY_CURVE_START: f64 = 0.0;

/// Upper bound of the tabulated density curve (points)
pub const DENSITY_CURVE_END: f64 = 200.0;

/// Spacing between density curve samples (points)
pub const DENSITY_CURVE_STEP: f64 = 0.5;
