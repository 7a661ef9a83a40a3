//! System-wide default constants.
//!
//! Grouped by subsystem. Every value here can be overridden from
//! `well_schematic.toml`; these are what an empty config resolves to.

// ============================================================================
// Config Discovery
// ============================================================================

/// Environment variable holding an explicit config file path.
pub const CONFIG_ENV_VAR: &str = "WELL_SCHEMATIC_CONFIG";

/// Config file looked up in the current directory when the env var is unset.
pub const LOCAL_CONFIG_FILE: &str = "well_schematic.toml";

// ============================================================================
// Generator
// ============================================================================

/// Plotting executable, relative to the workspace directory.
pub const GENERATOR_PROGRAM: &str = "well_structure_generator.exe";

/// Wall-clock budget for one generator run (seconds).
pub const GENERATOR_TIMEOUT_SECS: u64 = 60;

/// Grace period for reaping a killed generator (seconds).
pub const GENERATOR_REAP_SECS: u64 = 2;

// ============================================================================
// Output Settling
// ============================================================================

/// Interval between output stability snapshots (ms).
pub const SETTLE_POLL_INTERVAL_MS: u64 = 250;

/// Upper bound on the settling wait (ms). Matches the old fixed 3 s delay.
pub const SETTLE_MAX_WAIT_MS: u64 = 3_000;

// ============================================================================
// File Contract
// ============================================================================

/// Staged input file read by the generator.
pub const INPUT_FILE: &str = "well_data.json";

/// Single-slot backup of the previous input file.
pub const BACKUP_FILE: &str = "well_data_backup.json";

/// Primary image artifact.
pub const PRIMARY_IMAGE: &str = "well_structure_plot.png";

/// Markdown report artifact.
pub const REPORT_FILE: &str = "well_structure_report.md";

/// Every artifact the generator is known to produce.
///
/// Closed list: if the generator's output set changes this must follow.
pub const OUTPUT_FILES: &[&str] = &[
    PRIMARY_IMAGE,
    REPORT_FILE,
    "stratigraphy.csv",
    "stratigraphy_raw.csv",
    "casing_sections.csv",
    "casing_sections_raw.csv",
    "hole_sections.csv",
    "hole_sections_raw.csv",
    "drilling_fluid_pressure.csv",
    "drilling_fluid_pressure_raw.csv",
    "deviationData.csv",
    "deviationData_raw.csv",
];

// ============================================================================
// Archive
// ============================================================================

/// `chrono` format for archive folder names (second resolution).
pub const ARCHIVE_NAME_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// How many `_N` disambiguators to try before giving up on a folder name.
pub const ARCHIVE_MAX_SUFFIX: u32 = 999;

// ============================================================================
// HTTP Server
// ============================================================================

/// Default bind address for `serve`.
pub const SERVER_ADDR: &str = "127.0.0.1:8090";

/// Request body limit for the generate endpoint (bytes).
pub const MAX_REQUEST_BYTES: usize = 8 * 1024 * 1024;
