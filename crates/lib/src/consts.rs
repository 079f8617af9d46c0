//! Fixed build policy.
//!
//! Everything here is deliberately non-configurable: the source and output
//! roots, the conventional file names, and the shape of the two extra bundle
//! builds that run outside the descriptor pipeline.

/// Conventional configuration file, relative to the package root.
pub const CONFIG_FILENAME: &str = "build.config.json";

/// The package manifest, relative to the package root.
pub const MANIFEST_FILENAME: &str = "package.json";

/// Logical root of the package sources.
pub const SOURCE_ROOT: &str = "./src";

/// Logical root of the build output tree.
pub const OUTPUT_ROOT: &str = "./dist";

/// Extension for generated type-declaration stubs.
pub const DECLARATION_EXT: &str = ".d.ts";

/// Environment variable naming the external compiler program.
pub const COMPILER_ENV: &str = "POLYPACK_COMPILER";

/// Compiler program used when [`COMPILER_ENV`] is unset.
pub const DEFAULT_COMPILER: &str = "polypack-compile";

/// Continuous-integration indicator; suppresses the final success line.
pub const CI_ENV: &str = "CI";

/// Runtime-globals entry points bundled by the first fixed extra build and
/// registered in the manifest alongside the user's own entries.
pub const RUNTIME_GLOBAL_ENTRIES: [&str; 3] = [
  "./src/globals/console.ts",
  "./src/globals/fetch.ts",
  "./src/globals/storage.ts",
];

/// Entry point of the common manager preset, bundled by the second fixed
/// extra build.
pub const PRESET_ENTRY: &str = "./src/presets/common.ts";

/// Browser target list for the fixed extra builds.
pub const BROWSER_TARGETS: [&str; 4] = ["chrome90", "firefox90", "safari14", "edge90"];

/// Platform globals aliased to browser-compatible shims in the extra builds.
pub const GLOBAL_ALIASES: [(&str, &str); 2] = [("process", "process/browser"), ("buffer", "buffer/")];

/// Environment substitutions baked into the extra-build output.
pub const PRODUCTION_DEFINES: [(&str, &str); 2] =
  [("process.env.NODE_ENV", "\"production\""), ("__DEV__", "false")];
