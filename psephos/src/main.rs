use std::process::ExitCode;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use clap::error::ErrorKind as ClapErrorKind;
use clap::Parser;
use tracing::error;

use psephos::config::{ServerConfig, DEFAULT_IO_TIMEOUT_SECS};
use psephos::endpoint::Endpoint;
use psephos::pool::ThreadPool;
use psephos::server::Server;
use psephos::{dev_tracing, signal, ServerError};

/// Stateless elliptic-curve crypto compute server for a remote voting
/// protocol.
#[derive(Debug, Parser)]
#[command(
    name = "psephos",
    override_usage = "psephos -s unix <path> -t <threads>\n       \
                      psephos -s ipv4 [<ip>] <port> -t <threads>\n       \
                      psephos -s ipv6 [<ip>] <port> -t <threads>"
)]
struct Cli {
    /// Address family to listen on: unix | ipv4 | ipv6
    #[arg(short = 's', value_name = "FAMILY")]
    family: String,

    /// Family arguments: <path> for unix, [<ip>] <port> for ipv4/ipv6
    #[arg(value_name = "ADDR")]
    address: Vec<String>,

    /// Number of consumer worker threads
    #[arg(short = 't', value_name = "THREADS")]
    threads: usize,

    /// Per-connection send/receive timeout in seconds
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_IO_TIMEOUT_SECS)]
    timeout: u64,
}

fn main() -> ExitCode {
    dev_tracing::init_tracing();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "fatal");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), ServerError> {
    signal::ignore_sigpipe();

    let stop = Arc::new(AtomicBool::new(false));
    signal::install_shutdown_handlers(Arc::clone(&stop))?;

    let endpoint = Endpoint::from_family_args(&cli.family, &cli.address)?;
    let pool = Arc::new(ThreadPool::new(cli.threads)?);
    let config = ServerConfig {
        io_timeout: Duration::from_secs(cli.timeout),
        ..ServerConfig::default()
    };

    let server = Server::bind(&endpoint, pool, stop, config)?;
    server.serve()
}
