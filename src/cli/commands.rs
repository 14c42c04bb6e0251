use clap::{Parser, Subcommand};
use nanobanana::core::images::Aspect;

/// `nanobanana` - prompt synthesis, image generation and Telegram delivery.
#[derive(Parser, Debug)]
#[command(name = "nanobanana")]
#[command(version)]
#[command(about = "Generate Nano Banana images and post them to a chat.", long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.nanobanana/config.toml)
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP gateway and the job worker
    Serve {
        /// Host to bind to (default: gateway.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on, 0 for a random port (default: gateway.port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Run the whole pipeline once
    Smoke {
        /// Number of images
        #[arg(long, default_value_t = 2)]
        n: usize,

        /// Framing: vertical or square
        #[arg(long)]
        aspect: Option<Aspect>,

        /// Generate only; print image sizes instead of delivering
        #[arg(long)]
        no_send: bool,

        /// Pause between prompt synthesis and image generation
        #[arg(long)]
        delay_secs: Option<u64>,
    },

    /// Print one image prompt
    Prompt {
        /// Print the composed instruction without calling the language model
        #[arg(long)]
        offline: bool,
    },

    /// Manage the Telegram session
    Channel {
        #[command(subcommand)]
        channel_command: ChannelCommands,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ChannelCommands {
    /// Verify a bot token and save the session
    Login,
    /// Drop the active session
    Logout {
        /// Also delete the saved session file
        #[arg(long)]
        remove_session: bool,

        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Send a text message to the target chat
    SendText {
        /// Message text; long messages are split
        message: String,
    },
}
