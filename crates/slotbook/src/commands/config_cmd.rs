//! Config subcommand handlers.

use std::fmt::Write;

use dialoguer::Input;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Helpers ─────────────────────────────────────────────────────────

/// Format config for display in TOML layout.
fn format_config(cfg: &Config) -> String {
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);

    for name in cfg.profile_names() {
        let p = &cfg.profiles[&name];
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "endpoint = \"{}\"", p.endpoint);
        if !p.test_types.is_empty() {
            let quoted: Vec<String> = p.test_types.iter().map(|t| format!("\"{t}\"")).collect();
            let _ = writeln!(out, "test_types = [{}]", quoted.join(", "));
        }
        if let Some(ref ca) = p.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
        let schedule = p.schedule();
        let _ = writeln!(
            out,
            "# hours {:02}:00-{:02}:00, {} minute slots",
            schedule.start_hour, schedule.end_hour, schedule.slot_minutes
        );
        if let Some(ms) = p.refresh_delay_ms {
            let _ = writeln!(out, "refresh_delay_ms = {ms}");
        }
    }

    out.trim_end().to_owned()
}

fn save_config(cfg: &Config) -> Result<std::path::PathBuf, CliError> {
    Ok(config::save_config(cfg)?)
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: guided setup ──────────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            let mut cfg = config::load_config_or_default();

            let (profile_name, endpoint, test_types) = if global.no_input {
                let endpoint = global.endpoint.clone().ok_or_else(|| CliError::Validation {
                    field: "endpoint".into(),
                    reason: "pass --endpoint when running `config init --no-input`".into(),
                })?;
                let name = global.profile.clone().unwrap_or_else(|| "default".into());
                (name, endpoint, Vec::new())
            } else {
                eprintln!("slotbook configuration");
                eprintln!("   Config path: {}\n", config_path.display());

                let name: String = Input::new()
                    .with_prompt("Profile name")
                    .default(global.profile.clone().unwrap_or_else(|| "default".into()))
                    .interact_text()
                    .map_err(util::prompt_err)?;

                let mut endpoint_prompt = Input::<String>::new()
                    .with_prompt("Booking endpoint URL")
                    .validate_with(|v: &String| {
                        slotbook_config::parse_endpoint(v)
                            .map(|_| ())
                            .map_err(|e| e.to_string())
                    });
                if let Some(ref e) = global.endpoint {
                    endpoint_prompt = endpoint_prompt.default(e.clone());
                }
                let endpoint = endpoint_prompt.interact_text().map_err(util::prompt_err)?;

                let types: String = Input::new()
                    .with_prompt("Test type codes, comma separated (empty accepts any)")
                    .allow_empty(true)
                    .interact_text()
                    .map_err(util::prompt_err)?;
                let test_types = types
                    .split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_owned)
                    .collect();

                (name, endpoint, test_types)
            };

            slotbook_config::parse_endpoint(&endpoint)?;
            let mut profile = Profile::new(endpoint);
            profile.test_types = test_types;
            cfg.profiles.insert(profile_name.clone(), profile);
            cfg.default_profile = Some(profile_name.clone());

            let path = save_config(&cfg)?;
            let color = output::should_color(&global.color);
            output::print_status(
                &output::success(&format!("Configuration written to {}", path.display()), color),
                global.quiet,
            );
            output::print_status(&format!("  Active profile: {profile_name}"), global.quiet);
            output::print_status("\n  Try it: slotbook slots --date tomorrow", global.quiet);
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load_config_or_default();
            let out = output::render_single(&global.output, &cfg, format_config, |_| {
                "config".into()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            println!("{}", config::config_path().display());
            Ok(())
        }

        // ── SetEndpoint <url> ───────────────────────────────────────
        ConfigCommand::SetEndpoint { url } => {
            slotbook_config::parse_endpoint(&url)?;

            let mut cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);

            cfg.profiles
                .entry(profile_name.clone())
                .and_modify(|p| p.endpoint.clone_from(&url))
                .or_insert_with(|| Profile::new(url.clone()));
            if cfg.default_profile.is_none() {
                cfg.default_profile = Some(profile_name.clone());
            }

            save_config(&cfg)?;
            let color = output::should_color(&global.color);
            output::print_status(
                &output::success(&format!("Set endpoint on profile '{profile_name}'"), color),
                global.quiet,
            );
            Ok(())
        }
    }
}
