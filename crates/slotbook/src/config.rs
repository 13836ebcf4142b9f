//! CLI configuration: thin wrapper around `slotbook_config` shared types.
//!
//! Re-exports the shared types and adds resolution that respects
//! `GlobalOpts` flag overrides (--endpoint, --timeout).

use clap::ArgMatches;
use clap::ValueEnum;
use clap::parser::ValueSource;
use slotbook_core::BookingConfig;

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use slotbook_config::{
    Config, Profile, config_path, load_config_or_default, save_config,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Fill `--output` / `--color` from the `[defaults]` table when neither a
/// flag nor an env var set them.
pub fn apply_output_defaults(global: &mut GlobalOpts, matches: &ArgMatches) {
    let unset = |id: &str| {
        matches
            .value_source(id)
            .is_none_or(|source| source == ValueSource::DefaultValue)
    };
    let (output_unset, color_unset) = (unset("output"), unset("color"));
    if !output_unset && !color_unset {
        return;
    }

    let cfg = load_config_or_default();
    if output_unset {
        match OutputFormat::from_str(&cfg.defaults.output, true) {
            Ok(format) => global.output = format,
            Err(_) => tracing::warn!(value = %cfg.defaults.output, "ignoring unknown defaults.output"),
        }
    }
    if color_unset {
        match ColorMode::from_str(&cfg.defaults.color, true) {
            Ok(mode) => global.color = mode,
            Err(_) => tracing::warn!(value = %cfg.defaults.color, "ignoring unknown defaults.color"),
        }
    }
}

/// Build a `BookingConfig` from the config file, profile, and CLI overrides.
///
/// Flag values win over the profile. Without a matching profile the
/// endpoint must come from --endpoint / `SLOTBOOK_ENDPOINT`.
pub fn resolve_booking_config(global: &GlobalOpts) -> Result<BookingConfig, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    let mut profile = match (cfg.profile(&profile_name), &global.endpoint) {
        (Ok(profile), _) => profile.clone(),
        (Err(_), Some(endpoint)) if global.profile.is_none() => Profile::new(endpoint.clone()),
        (Err(e), _) if global.profile.is_some() => return Err(e.into()),
        (Err(_), _) => {
            return Err(CliError::NoConfig {
                path: config_path().display().to_string(),
            });
        }
    };

    if let Some(ref endpoint) = global.endpoint {
        profile.endpoint.clone_from(endpoint);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }

    tracing::debug!(profile = %profile_name, endpoint = %profile.endpoint, "resolved profile");
    Ok(slotbook_config::profile_to_booking_config(
        &profile,
        cfg.defaults.timeout,
    )?)
}
