//! Command handlers: profile resolution, driver lifecycle, dispatch.

use std::io::Read as _;

use aplab_core::{RetailAp, SettingsTree, SettingsUpdate};

use crate::cli::{Command, ConfigCommand, GlobalOpts, RadioState};
use crate::error::CliError;

// ── Profile resolution ──────────────────────────────────────────────

/// Resolve the active profile into an `ApConfig`.
fn resolve_ap_config(global: &GlobalOpts) -> Result<aplab_core::ApConfig, CliError> {
    let cfg = aplab_config::load_config_or_default();

    let name = global
        .profile
        .clone()
        .or_else(|| cfg.default_profile.clone())
        .unwrap_or_else(|| "default".into());

    let Some(profile) = cfg.profiles.get(&name) else {
        let mut available: Vec<&str> = cfg.profiles.keys().map(String::as_str).collect();
        available.sort_unstable();
        return Err(CliError::ProfileNotFound {
            name,
            available: if available.is_empty() {
                "(none)".into()
            } else {
                available.join(", ")
            },
        });
    };

    Ok(aplab_config::profile_to_ap_config(profile, &name, &cfg.defaults)?)
}

// ── AP command dispatch ─────────────────────────────────────────────

/// Connect to the configured AP, run one command, and tear down.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    // Reset is destructive: it reapplies the profile's settings over
    // whatever is currently on the device.
    if matches!(cmd, Command::Reset) && !global.yes {
        return Err(CliError::RequiresYes {
            action: "reset".into(),
        });
    }

    let config = resolve_ap_config(global)?;

    tracing::debug!(brand = %config.brand, model = %config.model, "connecting");
    let mut ap = aplab_core::create(config).await?;

    let result = run_on_ap(cmd, &mut ap).await;

    // Always release the reservation, even when the command failed.
    if let Err(err) = aplab_core::destroy(&mut ap).await {
        tracing::warn!(error = %err, "teardown failed");
    }

    result
}

async fn run_on_ap(cmd: Command, ap: &mut aplab_core::NetgearTriBandAp) -> Result<(), CliError> {
    match cmd {
        Command::Read => {
            let settings = ap.read_settings().await?;
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }

        Command::Info => print_info(ap),

        Command::Validate => {
            if ap.validate_settings().await? {
                println!("AP matches the desired settings");
            } else {
                return Err(CliError::Drift);
            }
        }

        Command::SetChannel(args) => match args.bandwidth {
            Some(bandwidth) => {
                ap.set_channel_and_bandwidth(&args.interface, args.channel, &bandwidth)
                    .await?;
            }
            None => ap.set_channel(&args.interface, args.channel).await?,
        },

        Command::SetBandwidth(args) => {
            ap.set_bandwidth(&args.interface, &args.bandwidth).await?;
        }

        Command::SetSsid(args) => ap.set_ssid(&args.interface, &args.ssid).await?,

        Command::SetRegion(args) => ap.set_region(&args.region).await?,

        Command::SetSecurity(args) => {
            ap.set_security(&args.interface, &args.security_type, args.password.as_deref())
                .await?;
        }

        Command::SetPower(args) => ap.set_power(&args.interface, &args.power).await?,

        Command::Radio(args) => {
            let enabled = matches!(args.state, RadioState::On);
            ap.set_radio_on_off(&args.interface, enabled).await?;
        }

        Command::Apply(args) => {
            let tree = read_settings_file(&args.file)?;
            ap.update_settings(SettingsUpdate::from_tree(tree)).await?;
            println!("settings applied");
        }

        Command::Reset => {
            // Connecting already pushed the profile's settings; the
            // driver-specific reset handles anything beyond that.
            ap.reset().await?;
            println!("AP reset to profile settings");
        }

        // Handled before a driver is created.
        Command::Config(_) => unreachable!("config commands never reach an AP"),
    }

    Ok(())
}

fn print_info(ap: &aplab_core::NetgearTriBandAp) {
    let caps = ap.capabilities();

    println!(
        "firmware: {}",
        ap.firmware_version().unwrap_or("(unknown)")
    );
    for interface in caps.interfaces() {
        let channels: Vec<String> = caps
            .channels(interface)
            .iter()
            .map(ToString::to_string)
            .collect();
        println!("{interface}:");
        println!("  channels: {}", channels.join(", "));
        println!("  modes:    {}", caps.modes(interface).join(", "));
    }
}

fn read_settings_file(path: &std::path::Path) -> Result<SettingsTree, CliError> {
    let mut contents = String::new();
    if path.as_os_str() == "-" {
        std::io::stdin().read_to_string(&mut contents)?;
    } else {
        contents = std::fs::read_to_string(path)?;
    }
    Ok(serde_json::from_str(&contents)?)
}

// ── Config commands ─────────────────────────────────────────────────

pub fn config_cmd(cmd: ConfigCommand, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        ConfigCommand::Path => {
            println!("{}", aplab_config::config_path().display());
            Ok(())
        }

        ConfigCommand::SetPassword => {
            let profile = global.profile.as_deref().unwrap_or("default");

            let mut password = String::new();
            std::io::stdin().read_line(&mut password)?;
            let password = password.trim_end_matches(['\r', '\n']);
            if password.is_empty() {
                return Err(CliError::Validation {
                    field: "password".into(),
                    reason: "empty password read from stdin".into(),
                });
            }

            aplab_config::store_admin_password(profile, password)?;
            println!("password stored for profile '{profile}'");
            Ok(())
        }
    }
}
