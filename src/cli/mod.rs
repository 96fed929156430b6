//! Command-line surface.
//!
//! Usage:
//!   resource_publisher -package <PKG_NAME> -xacro <FILE_NAME> [-topic <TOPIC_NAME>] [-targets <SPEC>]
//!
//! Flags are accepted with one or two leading dashes. Host runtime arguments
//! (`--ros-args ... [--]`) are removed before parsing.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::Parser;

use crate::error::ConfigurationError;
use crate::publisher::PublishOptions;
use crate::target::{TargetSelection, WILDCARD};

/// Marker opening a block of host runtime arguments
pub const HOST_ARGS_START: &str = "--ros-args";
const HOST_ARGS_END: &str = "--";

/// Flags that may be spelled with a single dash
const LONG_FLAGS: &[&str] = &["package", "xacro", "topic", "targets", "config"];

#[derive(Debug, Clone, Parser)]
#[command(name = "resource_publisher")]
#[command(about = "Publish a rendered xacro file on latched channels, one per target")]
#[command(version)]
pub struct Cli {
    /// The package containing the resource
    #[arg(long, value_name = "PKG_NAME")]
    pub package: String,

    /// The xacro file to substitute with parameters, relative to the package share directory
    #[arg(long, value_name = "FILE_NAME")]
    pub xacro: PathBuf,

    /// Channel to publish on. Target name will also be appended if set
    #[arg(long, value_name = "TOPIC_NAME")]
    pub topic: Option<String>,

    /// Comma-separated list of targets. Each value is passed to the xacro
    /// file as a "target" argument and published on its own channel. Use *
    /// for the unset target
    #[arg(long, value_name = "SPEC", default_value = WILDCARD)]
    pub targets: String,

    /// Settings file layered over config/default and config/{RUN_MODE}
    #[arg(long, value_name = "FILE", env = "RESOURCE_PUBLISHER_CONFIG")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Parse process-style arguments (program name first).
    ///
    /// `--help` and `--version` also come back as
    /// [`ConfigurationError::Arguments`]; see [`is_informational`].
    pub fn parse_from_args<I, T>(args: I) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let args = normalize_flags(strip_host_args(args));
        Ok(Self::try_parse_from(args)?)
    }

    pub fn selection(&self) -> TargetSelection {
        TargetSelection::Spec(self.targets.clone())
    }

    pub fn publish_options(&self) -> PublishOptions {
        PublishOptions {
            package: self.package.clone(),
            template: self.xacro.clone(),
            topic: self.topic.clone().unwrap_or_default(),
            targets: self.selection(),
        }
    }
}

/// Whether a parse error is a help or version request rather than a failure
pub fn is_informational(error: &clap::Error) -> bool {
    matches!(
        error.kind(),
        clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion
    )
}

/// Remove `--ros-args ... --` blocks; an unterminated block runs to the end
pub fn strip_host_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut kept = Vec::new();
    let mut in_host_block = false;

    for arg in args.into_iter().map(Into::into) {
        if in_host_block {
            if arg == HOST_ARGS_END {
                in_host_block = false;
            }
            continue;
        }
        if arg == HOST_ARGS_START {
            in_host_block = true;
            continue;
        }
        kept.push(arg);
    }

    kept
}

/// Rewrite `-package` style flags to `--package`
pub fn normalize_flags(args: Vec<OsString>) -> Vec<OsString> {
    args.into_iter()
        .enumerate()
        .map(|(index, arg)| {
            if index == 0 {
                return arg;
            }
            let Some(text) = arg.to_str() else {
                return arg;
            };
            let Some(body) = text.strip_prefix('-').filter(|b| !b.starts_with('-')) else {
                return arg;
            };
            let name = body.split('=').next().unwrap_or(body);
            if LONG_FLAGS.contains(&name) {
                OsString::from(format!("-{}", text))
            } else {
                arg
            }
        })
        .collect()
}
