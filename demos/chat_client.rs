//! Interactive chat client example
//!
//! Run with: cargo run --example chat_client [SERVER_ADDR]
//!
//! Examples:
//!   cargo run --example chat_client                      # connects to 127.0.0.1:11111
//!   cargo run --example chat_client localhost:4000       # connects to 127.0.0.1:4000
//!
//! The first line you type answers the server's name prompt; every line
//! after that is sent to the chat. Lines from other participants print as
//! they arrive, even while you are typing. Exit with Ctrl+D or Ctrl+C.

use chatcast::protocol::DEFAULT_PORT;
use chatcast::{ChatClient, ChatEvent, ClientConfig};
use tokio::io::{AsyncBufReadExt, BufReader};

fn print_usage() {
    eprintln!("Usage: chat_client [SERVER_ADDR]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  SERVER_ADDR    Server to connect to (default: 127.0.0.1:11111)");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return Ok(());
    }

    let server_addr = match args.get(1) {
        Some(addr) => addr.replace("localhost", "127.0.0.1"),
        None => format!("127.0.0.1:{}", DEFAULT_PORT),
    };

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("chatcast=info".parse()?)
                .add_directive("chat_client=info".parse()?),
        )
        .init();

    let config = ClientConfig::new(server_addr.clone());
    let (mut client, mut events) = ChatClient::new(config);

    if let Err(e) = client.connect().await {
        eprintln!("Failed to connect to {}: {}", server_addr, e);
        std::process::exit(1);
    }

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(ChatEvent::Line(line)) => println!("{}", line),
                Some(ChatEvent::Connected) => {}
                Some(ChatEvent::ServerClosed) => {
                    eprintln!("Connection closed by server.");
                    break;
                }
                Some(ChatEvent::Error(e)) => {
                    eprintln!("Connection error: {}", e);
                    break;
                }
                Some(ChatEvent::Disconnected) | None => break,
            },
            line = stdin.next_line() => match line? {
                Some(text) => {
                    if client.send(text).await.is_err() {
                        eprintln!("Connection lost.");
                        break;
                    }
                }
                None => break, // stdin closed
            },
        }
    }

    client.disconnect().await;
    Ok(())
}
