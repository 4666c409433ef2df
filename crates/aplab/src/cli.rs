//! Clap derive structures for the `aplab` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// aplab -- drive retail Wi-Fi AP web GUIs from the command line
#[derive(Debug, Parser)]
#[command(
    name = "aplab",
    version,
    about = "Configure retail Wi-Fi access points through their web GUIs",
    long_about = "Drives the vendor web GUI of bench access points over WebDriver,\n\
        reconciling a desired settings tree against the device so that only\n\
        real changes ever reach the (slow, fragile) GUI.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// AP profile to use
    #[arg(long, short = 'p', env = "APLAB_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Read and print the AP's current settings as JSON
    Read,

    /// Show AP identity: brand, model, firmware, channel capabilities
    Info,

    /// Re-read the AP and report whether it matches the desired settings
    Validate,

    /// Set the wireless channel on one radio
    SetChannel(SetChannelArgs),

    /// Set the channel bandwidth on one radio
    SetBandwidth(SetBandwidthArgs),

    /// Set the SSID on one radio
    SetSsid(SetSsidArgs),

    /// Set the regulatory region
    SetRegion(SetRegionArgs),

    /// Set security type (and optionally the passphrase) on one radio
    SetSecurity(SetSecurityArgs),

    /// Set transmit power on one radio
    SetPower(SetPowerArgs),

    /// Turn a radio on or off
    Radio(RadioArgs),

    /// Push a settings tree from a JSON file
    Apply(ApplyArgs),

    /// Reset the AP to its profile's configured settings
    Reset,

    /// Manage aplab configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

// ── Per-Command Args ─────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SetChannelArgs {
    /// Radio interface name, e.g. "2G", "5G", "6G"
    pub interface: String,

    /// Channel number (6 GHz channels accept the bare number)
    pub channel: i64,

    /// Also set the bandwidth in the same GUI pass
    #[arg(long)]
    pub bandwidth: Option<String>,
}

#[derive(Debug, Args)]
pub struct SetBandwidthArgs {
    /// Radio interface name
    pub interface: String,

    /// Bandwidth mode, e.g. "HE40"; bare widths like "40" are accepted
    pub bandwidth: String,
}

#[derive(Debug, Args)]
pub struct SetSsidArgs {
    /// Radio interface name
    pub interface: String,

    /// Network name
    pub ssid: String,
}

#[derive(Debug, Args)]
pub struct SetRegionArgs {
    /// Region name as the GUI spells it, e.g. "North America"
    pub region: String,
}

#[derive(Debug, Args)]
pub struct SetSecurityArgs {
    /// Radio interface name
    pub interface: String,

    /// Security type, e.g. "WPA2-PSK"
    pub security_type: String,

    /// New passphrase (omit to keep the current one)
    #[arg(long)]
    pub password: Option<String>,
}

#[derive(Debug, Args)]
pub struct SetPowerArgs {
    /// Radio interface name
    pub interface: String,

    /// Transmit power level as the GUI spells it, e.g. "100%"
    pub power: String,
}

#[derive(Debug, Args)]
pub struct RadioArgs {
    /// Radio interface name
    pub interface: String,

    /// Desired radio state
    pub state: RadioState,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RadioState {
    On,
    Off,
}

#[derive(Debug, Args)]
pub struct ApplyArgs {
    /// Path to a JSON settings tree (partial trees are fine)
    pub file: PathBuf,
}

// ── Config Subcommands ───────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file path
    Path,

    /// Store an admin password in the system keyring (read from stdin)
    SetPassword,
}
