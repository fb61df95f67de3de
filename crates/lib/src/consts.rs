pub const APP_NAME: &str = "exbuild";

/// Directory receiving native executables.
pub const NATIVE_DIR: &str = "./build";
/// Directory receiving both portable-module flavours.
pub const MODULE_DIR: &str = "./wasm";

pub const DEFAULT_COMPILER: &str = "clang";
pub const DEFAULT_INCLUDE_DIR: &str = "./include";
pub const DEFAULT_LIB_DIR: &str = "./lib";
pub const DEFAULT_LINK_LIBS: &[&str] = &["raylib", "m"];
pub const PORTABLE_TARGET: &str = "wasm32";
pub const BROWSER_DEFINE: &str = "PLATFORM_WEB";
pub const ENTRY_SYMBOL: &str = "main";

pub const MODULE_EXT: &str = "wasm";
pub const HOST_MODULE_EXT: &str = "native.wasm";

/// Suffix given to the previous orchestrator binary while it is being rebuilt.
pub const OLD_BINARY_SUFFIX: &str = "old";

/// Set in the environment of a relaunched orchestrator so it never rebuilds again.
pub const NO_REBUILD_ENV: &str = "EXBUILD_NO_REBUILD";
