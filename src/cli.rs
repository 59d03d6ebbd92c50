//! Command-line interface for ttt_server.

use crate::presenter::RenderMode;
use clap::Parser;
use std::net::IpAddr;
use std::path::PathBuf;

/// Authoritative tic-tac-toe server over UDP
#[derive(Parser, Debug, Default)]
#[command(name = "ttt_server")]
#[command(about = "Plays tic-tac-toe against many UDP clients at once", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address to bind the game socket to
    #[arg(long)]
    pub host: Option<IpAddr>,

    /// UDP port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Maximum number of concurrent games (1-256)
    #[arg(long)]
    pub max_sessions: Option<usize>,

    /// Join the multicast discovery group
    #[arg(long)]
    pub discovery: bool,

    /// How boards are shown
    #[arg(long, value_enum)]
    pub render: Option<RenderMode>,

    /// Append logs to this file as well as stderr
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Seed for the server's random moves
    #[arg(long)]
    pub seed: Option<u64>,

    /// Answer EOSYNC to moves whose turn counter is stale
    #[arg(long)]
    pub strict_turns: bool,
}
