/*!
Targets for [log] macro calls made throughout the crate.

No logger is installed by the library; the binary uses `env_logger`, so
`RUST_LOG=lrs=debug` shows the limited-resource strategy only.
*/

/// The given-clause loop
pub const SATURATION: &str = "saturation";

/// Limited-resource strategy estimates and limit updates
pub const LRS: &str = "lrs";

/// Context switching and retirement
pub const SCHEDULER: &str = "scheduler";

/// Strategy decoding and schedule runs
pub const PORTFOLIO: &str = "portfolio";

/// Structural induction
pub const INDUCTION: &str = "induction";

/// Forward literal rewriting
pub const REWRITING: &str = "rewriting";

/// Clause splitting
pub const SPLITTING: &str = "splitting";

/// Problem preprocessing
pub const PREPROCESS: &str = "preprocess";
