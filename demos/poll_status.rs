// SPDX-License-Identifier: MPL-2.0

//! Demo program: poll an Autelis interface and print node events.
//!
//! Switches `circuit1` on once the first poll has populated the registry,
//! then keeps polling until Ctrl+C.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example poll_status -- <ipaddress> <username> <password> [pollinginterval]
//! ```
//!
//! # Example
//!
//! ```bash
//! RUST_LOG=debug cargo run --example poll_status -- 192.168.1.60 admin admin 10
//! ```

use std::collections::HashMap;
use std::env;

use autelis_nodeserver::config::NodeServerConfig;
use autelis_nodeserver::event::NodeEvent;
use autelis_nodeserver::manager::NodeServer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 4 || args.len() > 5 {
        eprintln!(
            "Usage: {} <ipaddress> <username> <password> [pollinginterval]",
            args[0]
        );
        eprintln!();
        eprintln!("Example:");
        eprintln!("  cargo run --example poll_status -- 192.168.1.60 admin admin 10");
        std::process::exit(1);
    }

    let mut params = HashMap::from([
        ("ipaddress".to_string(), args[1].clone()),
        ("username".to_string(), args[2].clone()),
        ("password".to_string(), args[3].clone()),
    ]);
    if let Some(interval) = args.get(4) {
        params.insert("pollinginterval".to_string(), interval.clone());
    }

    let server = NodeServer::connect(NodeServerConfig::from_custom_params(&params)?)?;
    let mut events = server.subscribe();

    println!("Polling {}...", server.config().host());
    server.poll_now().await?;
    println!("{} nodes", server.registry().len());

    for node in server.registry().nodes() {
        let heating = server
            .registry()
            .heating_state(&node.address)
            .map(|state| format!(" heating={state:?}"))
            .unwrap_or_default();
        println!(
            "  {:<14} {:<18} {}{heating}",
            node.address,
            format!("{:?}", node.kind),
            node.value
        );
    }

    match server.handle_command("circuit1", "DON", None).await {
        Ok(ack) => println!("Switched circuit1 on (confirmed: {})", ack.refreshed),
        Err(e) => println!("Could not switch circuit1: {e}"),
    }

    let printer = async {
        while let Ok(event) = events.recv().await {
            match event {
                NodeEvent::ValueChanged { update } => {
                    println!("{}: {} -> {}", update.address, update.previous, update.value);
                }
                other => println!("{other:?}"),
            }
        }
    };

    tokio::select! {
        () = server.run(async {
            let _ = tokio::signal::ctrl_c().await;
        }) => {}
        () = printer => {}
    }

    println!(
        "Done: {} polls, {} failed",
        server.stats().successful(),
        server.stats().failed()
    );
    Ok(())
}
