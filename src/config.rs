//! The built-in patch set and the paths it is parameterized over.
//!
//! The patch list itself is fixed; what varies is where the MonoDevelop
//! working copy lives and which MSBuild bin directory to pin. Both live in
//! [`PinConfig`] so tests (and the CLI) can point the set at any tree
//! instead of the historical hardcoded absolute paths.

use crate::edit::PatchOp;
use std::path::PathBuf;

/// The `<MSBuild_OSS_BinDir>` element as it ships in the MonoDevelop
/// project files, before pinning.
const OSS_BIN_DIR: &str = r#"<MSBuild_OSS_BinDir Condition="'$(OS)' == 'Windows_NT'">$(MSBuildToolsPath)\</MSBuild_OSS_BinDir>"#;

/// The line whose result the insert op overrides in `Runtime.cs`.
const MSBUILD_BIN_PATH_LOOKUP: &str =
    r#"var path = systemAssemblyService.CurrentRuntime.GetMSBuildBinPath ("15.0");"#;

/// Paths the built-in patch set is constructed from.
///
/// Built once at startup and handed to the runner; nothing mutates it
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinConfig {
    /// Root of the MonoDevelop working copy.
    pub repo_root: PathBuf,
    /// MSBuild bin directory to pin the build against. Kept as a string
    /// because it is spliced verbatim into C# source and MSBuild XML.
    pub msbuild_bin: String,
}

impl Default for PinConfig {
    fn default() -> Self {
        Self {
            repo_root: PathBuf::from(r"C:\monodevelop\main"),
            msbuild_bin: r"C:\MSBuild\bin\Bootstrap\MSBuild\15.0\Bin".to_string(),
        }
    }
}

impl PinConfig {
    /// Build the fixed, ordered patch list.
    ///
    /// Two project files get their `MSBuild_OSS_BinDir` pinned to the
    /// configured bin directory, and `Runtime.cs` gets a line inserted that
    /// overrides the runtime's MSBuild path lookup. Ops are independent and
    /// idempotent, so the set can be re-run after every checkout.
    pub fn patch_set(&self) -> Vec<PatchOp> {
        let core_dir = self.repo_root.join("src").join("core");
        let pinned_bin_dir = format!(
            r#"<MSBuild_OSS_BinDir Condition="'$(OS)' == 'Windows_NT'">{}\</MSBuild_OSS_BinDir>"#,
            self.msbuild_bin
        );

        vec![
            PatchOp::TextReplace {
                file: core_dir
                    .join("MonoDevelop.Core")
                    .join("MonoDevelop.Core.csproj"),
                pattern: OSS_BIN_DIR.to_string(),
                replacement: pinned_bin_dir.clone(),
            },
            PatchOp::LineInsertAfter {
                file: core_dir
                    .join("MonoDevelop.Core")
                    .join("MonoDevelop.Core")
                    .join("Runtime.cs"),
                anchor: MSBUILD_BIN_PATH_LOOKUP.to_string(),
                line: format!("path = @\"{}\";", self.msbuild_bin),
            },
            PatchOp::TextReplace {
                file: core_dir
                    .join("MonoDevelop.Projects.Formats.MSBuild")
                    .join("MonoDevelop.MSBuildResolver")
                    .join("MonoDevelop.MSBuildResolver.csproj"),
                pattern: OSS_BIN_DIR.to_string(),
                replacement: pinned_bin_dir,
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_set_has_three_ops_under_repo_root() {
        let config = PinConfig {
            repo_root: PathBuf::from("/tmp/checkout"),
            ..PinConfig::default()
        };
        let ops = config.patch_set();

        assert_eq!(ops.len(), 3);
        for op in &ops {
            assert!(op.file().starts_with("/tmp/checkout"));
        }
    }

    #[test]
    fn replacements_splice_in_the_configured_bin_dir() {
        let config = PinConfig {
            msbuild_bin: r"D:\custom\Bin".to_string(),
            ..PinConfig::default()
        };
        let ops = config.patch_set();

        let PatchOp::TextReplace {
            pattern,
            replacement,
            ..
        } = &ops[0]
        else {
            panic!("first op should be a replace");
        };
        assert!(pattern.contains("$(MSBuildToolsPath)"));
        assert!(replacement.contains(r"D:\custom\Bin"));

        let PatchOp::LineInsertAfter { anchor, line, .. } = &ops[1] else {
            panic!("second op should be an insert");
        };
        assert!(anchor.contains("GetMSBuildBinPath"));
        assert_eq!(line, r#"path = @"D:\custom\Bin";"#);
    }

    #[test]
    fn default_paths_match_the_historical_layout() {
        let ops = PinConfig::default().patch_set();
        let runtime_cs = ops[1].file().to_string_lossy().into_owned();
        assert!(runtime_cs.starts_with(r"C:\monodevelop\main"));
        assert!(runtime_cs.ends_with("Runtime.cs"));
    }
}
