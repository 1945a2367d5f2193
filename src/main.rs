use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use std::str::FromStr;
use tether::command::{BrokerOptions, TlsMode};
use tether::commands::{client, init, restart, start, status, stop, topic};
use tether::completions::Shell;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tether")]
#[command(about = "Supervisor and command bridge for a paired MQTT daemon setup", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the instance configuration file
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a commented starter configuration file
    Init {
        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },

    /// Start the daemon pair, replacing any running instance
    Start,

    /// Stop the daemon pair gracefully
    Stop,

    /// Restart the daemon pair
    Restart,

    /// Show liveness, ports and any recorded start failure
    Status,

    /// Manage broker connections on the primary daemon
    Client {
        #[command(subcommand)]
        command: ClientCommands,
    },

    /// Publish a message through a broker connection
    Publish {
        /// Connection identifier
        id: String,

        /// Topic to publish to
        topic: String,

        /// Message payload
        payload: String,

        /// Quality of service level (0, 1 or 2)
        #[arg(short, long, default_value_t = 1)]
        qos: u8,

        /// Ask the broker to retain the message
        #[arg(short, long)]
        retain: bool,
    },

    /// Subscribe a broker connection to a topic
    Subscribe {
        /// Connection identifier
        id: String,

        /// Topic filter to subscribe to
        topic: String,

        /// Quality of service level (0, 1 or 2)
        #[arg(short, long, default_value_t = 1)]
        qos: u8,
    },

    /// Drop a topic subscription
    Unsubscribe {
        /// Connection identifier
        id: String,

        /// Topic filter to unsubscribe from
        topic: String,
    },

    /// Generate shell completions (bash, zsh, fish)
    Completions {
        /// Target shell
        shell: String,
    },
}

#[derive(Subcommand)]
enum ClientCommands {
    /// Register a broker connection
    Add {
        /// Connection identifier, echoed back in daemon events
        id: String,

        /// Broker hostname or IP address
        hostname: String,

        /// Broker port (defaults to 8883 with TLS, 1883 without)
        #[arg(short, long)]
        port: Option<u16>,

        /// TLS mode: custom (caller-supplied certificates), enable
        /// (system trust), or disabled
        #[arg(long, default_value = "disabled")]
        tls: String,

        /// Skip broker certificate validation
        #[arg(long)]
        tls_insecure: bool,

        /// CA certificate file, for custom TLS mode
        #[arg(long, value_name = "PATH")]
        tls_ca_file: Option<String>,

        /// Client certificate file, for custom TLS mode
        #[arg(long, value_name = "PATH")]
        tls_cert_file: Option<String>,

        /// Client private key file, for custom TLS mode
        #[arg(long, value_name = "PATH")]
        tls_key_file: Option<String>,

        /// Broker username
        #[arg(short, long)]
        username: Option<String>,

        /// Broker password
        #[arg(long)]
        password: Option<String>,

        /// MQTT client identifier
        #[arg(long)]
        client_id: Option<String>,

        /// Register a last-will message on connect
        #[arg(long)]
        lwt: bool,

        /// Topic the last-will and the online payload are published to
        #[arg(long)]
        lwt_topic: Option<String>,

        /// Payload published when the connection comes up
        #[arg(long)]
        lwt_online: Option<String>,

        /// Last-will payload the broker publishes on connection loss
        #[arg(long)]
        lwt_offline: Option<String>,
    },

    /// Tear down a broker connection
    Remove {
        /// Connection identifier
        id: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { force } => init::execute(cli.config, force),
        Commands::Start => start::execute(cli.config),
        Commands::Stop => stop::execute(cli.config),
        Commands::Restart => restart::execute(cli.config),
        Commands::Status => status::execute(cli.config),
        Commands::Client { command } => match command {
            ClientCommands::Add {
                id,
                hostname,
                port,
                tls,
                tls_insecure,
                tls_ca_file,
                tls_cert_file,
                tls_key_file,
                username,
                password,
                client_id,
                lwt,
                lwt_topic,
                lwt_online,
                lwt_offline,
            } => {
                let options = BrokerOptions {
                    port,
                    tls: TlsMode::parse(&tls),
                    tls_secure: !tls_insecure,
                    tls_ca_file: tls_ca_file.unwrap_or_default(),
                    tls_client_cert_file: tls_cert_file.unwrap_or_default(),
                    tls_client_key_file: tls_key_file.unwrap_or_default(),
                    username: username.unwrap_or_default(),
                    password: password.unwrap_or_default(),
                    client_id: client_id.unwrap_or_default(),
                    lwt,
                    lwt_topic: lwt_topic.unwrap_or_default(),
                    lwt_online: lwt_online.unwrap_or_default(),
                    lwt_offline: lwt_offline.unwrap_or_default(),
                };
                client::add(cli.config, id, hostname, options)
            }
            ClientCommands::Remove { id } => client::remove(cli.config, id),
        },
        Commands::Publish {
            id,
            topic,
            payload,
            qos,
            retain,
        } => topic::publish(cli.config, id, topic, payload, qos, retain),
        Commands::Subscribe { id, topic, qos } => topic::subscribe(cli.config, id, topic, qos),
        Commands::Unsubscribe { id, topic } => topic::unsubscribe(cli.config, id, topic),
        Commands::Completions { shell } => {
            let shell = Shell::from_str(&shell)?;
            let mut cmd = Cli::command();
            shell.write_completions(&mut cmd, &mut std::io::stdout());
            Ok(())
        }
    }
}
