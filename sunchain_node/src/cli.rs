use std::{env, env::VarError};

use clap::{Args, Parser, Subcommand};
use sunchain_common::{Address, Coin, Coins};

#[derive(Parser, Debug)]
#[command(version, about = "Runs a single sunchain settlement operation against the module store")]
pub struct Arguments {
    /// Overrides SUN_DATABASE_URL
    #[arg(short, long)]
    pub database: Option<String>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create funds out of thin air. For genesis and development networks only.
    #[clap(name = "mint")]
    Mint {
        address: Address,
        /// e.g. 5000000stake
        amount: Coin,
    },
    /// Record the result of a channel handshake with another chain
    #[clap(name = "open-channel")]
    OpenChannel(ChannelEndParams),
    /// Bind a counterparty chain name to a local channel
    #[clap(name = "bind-channel")]
    BindChannel {
        chain_name: String,
        #[arg(short, long, default_value = "sunchain")]
        port: String,
        #[arg(short, long)]
        channel: String,
        #[arg(short, long, default_value = "admin")]
        signer: Address,
    },
    /// Place a buy order. The funds are escrowed until the oracle answers.
    #[clap(name = "buy")]
    Buy {
        buyer: Address,
        /// e.g. 5000000stake or 100stake,20atom
        amount: Coins,
        /// Ask the oracle on this chain instead of the configured one
        #[arg(long)]
        via: Option<String>,
    },
    /// Deliver an oracle response packet, as a relayer would
    #[clap(name = "relay-response")]
    RelayResponse(RelayResponseParams),
    /// Print an order
    #[clap(name = "order")]
    Order { id: u64 },
    /// Print all orders, or the orders of one owner
    #[clap(name = "orders")]
    Orders {
        #[arg(short, long)]
        owner: Option<Address>,
    },
    /// Print an account's balances
    #[clap(name = "balance")]
    Balance {
        address: Address,
        #[arg(short, long)]
        denom: Option<String>,
    },
    /// Print the packets waiting to be relayed from a local channel
    #[clap(name = "outbox")]
    Outbox {
        #[arg(short, long, default_value = "sunchain")]
        port: String,
        #[arg(short, long, default_value = "channel-0")]
        channel: String,
    },
    /// Print the counterparty bindings
    #[clap(name = "bindings")]
    Bindings,
    /// Print the node's environment
    #[clap(name = "env")]
    Env,
}

#[derive(Debug, Args)]
pub struct ChannelEndParams {
    #[arg(short, long, default_value = "sunchain")]
    pub port: String,
    #[arg(short, long)]
    pub channel: String,
    #[arg(long = "counterparty-port")]
    pub counterparty_port: String,
    #[arg(long = "counterparty-channel")]
    pub counterparty_channel: String,
}

#[derive(Debug, Args)]
pub struct RelayResponseParams {
    /// The correlation id of the request being answered, e.g. Order:1
    pub client_id: String,
    /// The quoted price, already scaled by the price multiplier
    #[arg(long, conflicts_with = "raw")]
    pub price: Option<u64>,
    /// Hex-encoded result bytes, sent as-is
    #[arg(long)]
    pub raw: Option<String>,
    /// The local channel the packet arrives on
    #[arg(short, long, default_value = "sunchain")]
    pub port: String,
    #[arg(short, long, default_value = "channel-0")]
    pub channel: String,
    #[arg(short, long, default_value = "1")]
    pub sequence: u64,
}

pub fn display_envs() {
    const DISPLAY_ENVS: [&str; 12] = [
        "RUST_LOG",
        "SUN_DATABASE_URL",
        "SUN_DB_MAX_CONNECTIONS",
        "SUN_LOG_EVENTS",
        "SUN_ORACLE_COUNTERPARTY",
        "SUN_ORACLE_SCRIPT_ID",
        "SUN_ORACLE_ASK_COUNT",
        "SUN_ORACLE_MIN_COUNT",
        "SUN_PRICE_MULTIPLIER",
        "SUN_PACKET_TIMEOUT",
        "SUN_FILL_DENOM",
        "SUN_MODULE_NAME",
    ];

    println!("Current environment values:");
    DISPLAY_ENVS.iter().for_each(|&name| {
        let val = match env::var(name) {
            Ok(s) => s,
            Err(VarError::NotPresent) => "Not set".into(),
            Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
        };
        println!("  {name:<35} {val:<15}");
    })
}
