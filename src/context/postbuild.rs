//! Context for the post-build step

use super::env::{EnvReader, EnvValue};
use super::{
    is_force_cached, parse_address, parse_thinned_targets, resolve_in_root, RemoteCommitInfo,
    THINNED_TARGETS_KEY,
};
use crate::config::{Config, Mode};
use crate::error::BuildCacheResult;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use tracing::debug;
use url::Url;

/// Kind of binary the target links
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MachOType {
    StaticLib,
    DynamicLib,
    Executable,
    Bundle,
    Relocatable,
    Unknown,
}

impl EnvValue for MachOType {
    fn from_env_value(raw: &str) -> Self {
        match raw {
            "staticlib" => Self::StaticLib,
            "mh_dylib" => Self::DynamicLib,
            "mh_execute" => Self::Executable,
            "mh_bundle" => Self::Bundle,
            "mh_object" => Self::Relocatable,
            _ => Self::Unknown,
        }
    }
}

/// Build action that triggered the step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildActionType {
    Build,
    IndexBuild,
    Unknown,
}

impl EnvValue for BuildActionType {
    fn from_env_value(raw: &str) -> Self {
        match raw {
            "build" => Self::Build,
            "indexbuild" => Self::IndexBuild,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for BuildActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Build => "build",
            Self::IndexBuild => "indexbuild",
            Self::Unknown => "unknown",
        };
        write!(f, "{}", name)
    }
}

/// Everything the post-build step needs, resolved once per invocation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostbuildContext {
    pub mode: Mode,
    pub target_name: String,
    pub target_temp_dir: PathBuf,
    /// Location of compilation outputs (.o), qualified by architecture
    pub compilation_temp_dir: PathBuf,
    pub configuration: String,
    pub platform: String,
    pub arch: String,
    pub products_dir: PathBuf,
    pub built_products_dir: PathBuf,
    pub derived_sources_dir: PathBuf,
    pub module_name: Option<String>,
    /// Path to the module directory, relative to `products_dir`
    pub modules_folder_path: String,
    pub executable_path: String,
    pub src_root: PathBuf,
    pub xcode_dir: PathBuf,
    pub xcode_build_number: String,
    /// File that holds the remote commit sha
    pub remote_commit_location: PathBuf,
    pub remote_commit: RemoteCommitInfo,
    pub recommended_cache_address: Url,
    /// All addresses a producer uploads artifacts to
    pub cache_addresses: Vec<Url>,
    /// Root directory for statistics
    pub stats_location: PathBuf,
    /// Never fall back to local compilation
    pub force_cached: bool,
    pub mach_o_type: MachOType,
    pub was_dsym_generated: bool,
    pub dsym_path: PathBuf,
    /// Product bundle location, absent for library targets
    pub bundle_dir: Option<PathBuf>,
    /// Targets downloaded by the thinning aggregation target; absent is empty
    pub thinned_targets: Vec<String>,
    pub action: BuildActionType,
}

impl PostbuildContext {
    pub fn new(config: &Config, vars: &HashMap<String, String>) -> BuildCacheResult<Self> {
        let env = EnvReader::new(vars);

        let target_name: String = env.required("TARGET_NAME")?;
        let target_temp_dir = env.required("TARGET_TEMP_DIR")?;
        let arch: String = env.required("PLATFORM_PREFERRED_ARCH")?;
        let compilation_temp_dir = env
            .required::<PathBuf>("OBJECT_FILE_DIR_normal")?
            .join(&arch);
        let configuration: String = env.required("CONFIGURATION")?;
        let platform: String = env.required("PLATFORM_NAME")?;
        let xcode_build_number = env.required("XCODE_PRODUCT_BUILD_VERSION")?;
        let products_dir: PathBuf = env.required("TARGET_BUILD_DIR")?;
        let module_name = env.optional("PRODUCT_MODULE_NAME");
        let modules_folder_path: String =
            env.optional("MODULES_FOLDER_PATH").unwrap_or_default();
        let executable_path = env.required("EXECUTABLE_PATH")?;
        let src_root: PathBuf = env.required("SRCROOT")?;
        let xcode_dir = env.required("DEVELOPER_DIR")?;

        let remote_commit_location = resolve_in_root(&src_root, &config.paths.remote_commit_file);
        let remote_commit = RemoteCommitInfo::read_from(&remote_commit_location);
        let recommended_cache_address = parse_address(&config.cache.recommended_cache_address)?;
        let stats_location = resolve_in_root(&src_root, &config.paths.stats_dir);
        let cache_addresses = config
            .cache
            .cache_addresses
            .iter()
            .map(|raw| parse_address(raw))
            .collect::<BuildCacheResult<Vec<_>>>()?;
        let force_cached = is_force_cached(&config.targets.focused_targets, &target_name);

        let mach_o_type = env.required("MACH_O_TYPE")?;
        let was_dsym_generated = env.required("DWARF_DSYM_FILE_SHOULD_ACCOMPANY_PRODUCT")?;
        let dsym_path = env
            .required::<PathBuf>("DWARF_DSYM_FOLDER_PATH")?
            .join(env.required::<String>("DWARF_DSYM_FILE_NAME")?);
        let built_products_dir = env.required("BUILT_PRODUCTS_DIR")?;
        let bundle_dir = env
            .optional::<String>("CONTENTS_FOLDER_PATH")
            .map(|contents| products_dir.join(contents));
        let derived_sources_dir = env.required("DERIVED_SOURCES_DIR")?;
        let thinned_targets = env
            .optional::<String>(THINNED_TARGETS_KEY)
            .map(|raw| parse_thinned_targets(&raw))
            .unwrap_or_default();
        let action = env.optional("ACTION").unwrap_or(BuildActionType::Unknown);

        debug!(
            "Postbuild context for {} ({} {} {}), mode {}, action {}",
            target_name, configuration, platform, arch, config.cache.mode, action
        );

        Ok(Self {
            mode: config.cache.mode,
            target_name,
            target_temp_dir,
            compilation_temp_dir,
            configuration,
            platform,
            arch,
            products_dir,
            built_products_dir,
            derived_sources_dir,
            module_name,
            modules_folder_path,
            executable_path,
            src_root,
            xcode_dir,
            xcode_build_number,
            remote_commit_location,
            remote_commit,
            recommended_cache_address,
            cache_addresses,
            stats_location,
            force_cached,
            mach_o_type,
            was_dsym_generated,
            dsym_path,
            bundle_dir,
            thinned_targets,
            action,
        })
    }

    /// Linked product, relative paths resolved against the products dir
    pub fn product_path(&self) -> PathBuf {
        self.products_dir.join(&self.executable_path)
    }
}
