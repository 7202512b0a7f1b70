//! Simple chat relay server example
//!
//! Run with: cargo run --example chat_server [BIND_ADDR]
//!
//! Examples:
//!   cargo run --example chat_server                      # binds to 127.0.0.1:11111
//!   cargo run --example chat_server localhost            # binds to 127.0.0.1:11111
//!   cargo run --example chat_server 127.0.0.1:4000       # binds to 127.0.0.1:4000
//!   cargo run --example chat_server 0.0.0.0:11111        # binds to 0.0.0.0:11111
//!
//! ## Joining
//!
//! With the bundled client:
//!   cargo run --example chat_client
//!
//! With netcat:
//!   nc localhost 11111
//!
//! Every connection is prompted for a name; afterwards each line you type is
//! relayed to everyone else as `name: text`.

use std::net::SocketAddr;
use std::sync::Arc;

use chatcast::{ChatServer, ServerConfig};

/// Parse bind address from command line argument.
///
/// Accepts formats:
/// - "localhost" -> 127.0.0.1:11111
/// - "localhost:4000" -> 127.0.0.1:4000
/// - "127.0.0.1" -> 127.0.0.1:11111
/// - "0.0.0.0:11111" -> 0.0.0.0:11111
fn parse_bind_addr(arg: &str) -> Result<SocketAddr, String> {
    const DEFAULT_PORT: u16 = chatcast::protocol::DEFAULT_PORT;

    // Replace "localhost" with "127.0.0.1"
    let normalized = arg.replace("localhost", "127.0.0.1");

    // Try parsing as SocketAddr first (includes port)
    if let Ok(addr) = normalized.parse::<SocketAddr>() {
        return Ok(addr);
    }

    // Try parsing as IP address without port
    if let Ok(ip) = normalized.parse::<std::net::IpAddr>() {
        return Ok(SocketAddr::new(ip, DEFAULT_PORT));
    }

    Err(format!(
        "Invalid bind address: '{}'. Expected format: IP:PORT or IP or 'localhost'",
        arg
    ))
}

fn print_usage() {
    eprintln!("Usage: chat_server [BIND_ADDR]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  BIND_ADDR    Address to bind to (default: 127.0.0.1:11111)");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  chat_server                       # binds to 127.0.0.1:11111");
    eprintln!("  chat_server localhost             # binds to 127.0.0.1:11111");
    eprintln!("  chat_server localhost:4000        # binds to 127.0.0.1:4000");
    eprintln!("  chat_server 0.0.0.0:11111         # binds to 0.0.0.0:11111");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return Ok(());
    }

    let bind_addr = match args.get(1) {
        Some(addr_str) => match parse_bind_addr(addr_str) {
            Ok(addr) => addr,
            Err(e) => {
                eprintln!("Error: {}", e);
                eprintln!();
                print_usage();
                std::process::exit(1);
            }
        },
        None => ServerConfig::default().bind_addr,
    };

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("chatcast=debug".parse()?)
                .add_directive("chat_server=debug".parse()?),
        )
        .init();

    // Create server config with the specified bind address
    let config = ServerConfig::default().bind(bind_addr);

    println!("Starting chat server on {}", config.bind_addr);
    println!();
    println!("=== Join the chat ===");
    println!("client: cargo run --example chat_client");
    println!("netcat: nc {} {}", config.bind_addr.ip(), config.bind_addr.port());
    println!();

    // Create and run server
    let server = Arc::new(ChatServer::new(config));

    // Run with Ctrl+C handling
    tokio::select! {
        result = server.run() => {
            if let Err(e) = result {
                eprintln!("Server error: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            println!("\nShutting down...");
        }
    }

    let stats = server.stats().snapshot();
    println!(
        "Served {} connections ({} registered), relayed {} messages, delivered {} lines ({} failures)",
        stats.total_connections,
        stats.names_registered,
        stats.messages_relayed,
        stats.lines_delivered,
        stats.delivery_failures,
    );

    Ok(())
}
