//! Basic example demonstrating the OnApp API client.
//!
//! Run with:
//! ```
//! ONAPP_URL=https://cp.example.com ONAPP_USER=admin ONAPP_API_KEY=your-key \
//!     cargo run --example basic
//! ```

use onapp::{
    Configuration, Get, Hypervisor, List, OnAppClient, Transaction, TransactionFilter,
    TransactionScope, TransactionStatus, VirtualMachine,
};

#[tokio::main]
async fn main() -> onapp::Result<()> {
    // Initialize tracing for debugging (optional)
    tracing_subscriber::fmt::init();

    // Create client from environment variables
    println!("Creating OnApp client...");
    let client = OnAppClient::from_env()?;
    println!("Connected to: {}", client.base_url());

    let config = Configuration::get(&client, ()).await?;
    println!(
        "Control panel host: {}",
        config.system_host.as_deref().unwrap_or("unknown")
    );

    // Hypervisors and their free memory
    println!("\n--- Hypervisors ---");
    let hypervisors = Hypervisor::list_all(&client, &()).await?;
    for hv in &hypervisors {
        let state = if hv.is_available() { "available" } else { "unavailable" };
        println!(
            "  - {} ({}) {} MB free",
            hv.label,
            state,
            hv.free_memory.unwrap_or(0)
        );
    }

    // First page of virtual machines
    println!("\n--- Virtual Machines (first page) ---");
    let page = VirtualMachine::list_page(&client, &(), 1, 10).await?;
    println!("Found {} virtual machines (more: {})", page.len(), page.has_more);

    for vm in &page {
        let power = if vm.booted { "on" } else { "off" };
        println!("  - #{} {} [{}] {}", vm.id, vm.label, power, vm.addresses().join(", "));
    }

    // Follow the most recent provisioning of the first machine
    if let Some(vm) = page.items.first() {
        println!("\n--- Provisioning of {} ---", vm.label);
        match vm
            .last_transaction(&client, TransactionFilter::for_action("provision_virtual_server"))
            .await
        {
            Ok(provision) => {
                let chain = Transaction::list_by_group(
                    &client,
                    &TransactionScope::VirtualMachine(vm.id),
                    provision.id,
                )
                .await?;
                for tx in chain {
                    println!("  #{} {} ({})", tx.id, tx.action, tx.status);
                }
            }
            Err(e) if e.is_not_found() => println!("  No provisioning transaction on record"),
            Err(e) => return Err(e),
        }
    }

    // Recent failures anywhere in the cloud
    println!("\n--- Recent Failures ---");
    let recent = Transaction::list_page(&client, &TransactionScope::All, 1, 50).await?;
    let failed: Vec<_> = recent
        .iter()
        .filter(|tx| tx.status == TransactionStatus::Failed)
        .collect();
    println!("{} of the last {} transactions failed", failed.len(), recent.len());
    for tx in failed.iter().take(5) {
        let parent = tx.parent_type.as_deref().unwrap_or("?");
        println!("  #{} {} on {} #{}", tx.id, tx.action, parent, tx.parent_id.unwrap_or(0));
    }

    println!("\nDone!");
    Ok(())
}
