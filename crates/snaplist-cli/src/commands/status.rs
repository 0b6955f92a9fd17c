//! Status command handler

use anyhow::Result;

use snaplist_core::SyncClient;

use crate::output::{Output, OutputFormat};

/// Show server and store status
pub async fn show(client: &SyncClient, output: &Output) -> Result<()> {
    let capabilities = client.capabilities().await;
    let health = client.health().await;

    match output.format {
        OutputFormat::Json => {
            let (version, reachable) = match &capabilities {
                Ok(c) => (Some(c.version.clone()), true),
                Err(_) => (None, false),
            };
            output.print_json_value(&serde_json::json!({
                "server_url": client.base_url(),
                "reachable": reachable,
                "version": version,
                "store_connected": health.as_ref().map(|h| h.store_connected).unwrap_or(false),
                "store_status": health.as_ref().ok().map(|h| h.store_status.clone()),
            }));
        }
        OutputFormat::Quiet => {
            let state = match &health {
                Ok(h) if h.store_connected => "ok",
                Ok(_) => "degraded",
                Err(_) => "unreachable",
            };
            println!("{}", state);
        }
        OutputFormat::Human => {
            println!("snaplist Status");
            println!("===============");
            println!();
            println!("Server:");
            println!("  URL:     {}", client.base_url());
            match &capabilities {
                Ok(c) => {
                    println!("  Status:  {}", c.status);
                    println!("  Version: {}", c.version);
                }
                Err(e) => println!("  Status:  unreachable ({})", e),
            }
            println!();
            println!("Store:");
            match &health {
                Ok(h) => {
                    println!(
                        "  Connected: {}",
                        if h.store_connected { "yes" } else { "no" }
                    );
                    println!("  Reply:     {}", h.store_status);
                }
                Err(e) => println!("  Unknown ({})", e),
            }
        }
    }

    Ok(())
}
