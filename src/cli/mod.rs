use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "chatgate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log at debug level (logs go to stderr)
    #[arg(short, long)]
    pub verbose: bool,

    /// Gateway request timeout in seconds; overrides LITELLM_TIMEOUT_SECS
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Verify the gateway's TLS certificate (off by default)
    #[arg(long)]
    pub verify_tls: bool,

    /// Do not send generations to Langfuse
    #[arg(long)]
    pub no_trace: bool,

    /// Answer locally with echo replies instead of calling the gateway
    #[arg(long)]
    pub mock_gateway: bool,
}
