// SPDX-License-Identifier: Apache-2.0

use figment::Figment;
use figment::providers::{Env, Format, Toml};
use tower::BoxError;

use crate::follow::FollowConfig;
use crate::init::args::FollowArgs;

pub const ENV_PREFIX: &str = "LOGFOLLOW_";

/// Keys under [`ENV_PREFIX`] that belong to the CLI rather than to
/// [`FollowConfig`].
const CLI_ONLY_ENV_KEYS: &[&str] = &["file", "config", "log_format"];

/// Build the layered configuration source: the optional TOML file, then
/// `LOGFOLLOW_*` environment variables.
pub fn figment(args: &FollowArgs) -> Figment {
    let mut figment = Figment::new();
    if let Some(path) = &args.config {
        figment = figment.merge(Toml::file_exact(path));
    }
    figment.merge(Env::prefixed(ENV_PREFIX).ignore(CLI_ONLY_ENV_KEYS))
}

/// Resolve the follower configuration from `figment` with the command line
/// flags on top, and validate it.
pub fn resolve(figment: Figment, args: &FollowArgs) -> Result<FollowConfig, BoxError> {
    let mut config: FollowConfig = match figment.extract() {
        Ok(config) => config,
        Err(e) => return Err(format!("failed to load configuration: {}", e).into()),
    };

    args.apply(&mut config);
    config
        .validate()
        .map_err(|e| format!("invalid configuration: {}", e))?;

    Ok(config)
}

pub fn load_config(args: &FollowArgs) -> Result<FollowConfig, BoxError> {
    resolve(figment(args), args)
}
