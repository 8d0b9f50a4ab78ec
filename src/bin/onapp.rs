//! OnApp API CLI binary.
//!
//! A command-line interface for inspecting and operating an OnApp cloud.

use clap::Parser;
use onapp::cli::{Cli, Command, Entity, TransactionCommand};
use onapp::output::PrettyPrint;
use onapp::{
    Backup, DataStore, Delete, Disk, Get, Hypervisor, HypervisorZone, ImageTemplate, IpAddress,
    List, LocationGroup, Network, NoOptions, OnAppClient, OnAppError, Page, PollOptions,
    Transaction, TransactionFilter, TransactionScope, User, UserDeleteOptions, VirtualMachine,
    VirtualMachineAction, VirtualMachineDeleteOptions,
};
use serde::Serialize;
use std::process::ExitCode;
use std::time::Duration;
use tabled::{Table, Tabled};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level())
        .with_writer(std::io::stderr)
        .init();

    let client = match cli.client() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Hint: Set ONAPP_URL, ONAPP_USER and ONAPP_API_KEY environment variables");
            return ExitCode::FAILURE;
        }
    };

    match run(&client, cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(client: &OnAppClient, cli: Cli) -> onapp::Result<()> {
    match cli.command {
        Command::Get { entity, id, parent } => handle_get(client, entity, id, parent, cli.json).await,
        Command::List {
            entity,
            page,
            count,
            parent,
        } => handle_list(client, entity, page, count, parent, cli.json).await,
        Command::Delete {
            entity,
            id,
            destroy_backups,
            force,
        } => handle_delete(client, entity, id, destroy_backups, force).await,
        Command::Vm { action, id, wait } => handle_vm(client, action, id, wait, cli.json).await,
        Command::Transaction(command) => handle_transaction(client, command, cli.json).await,
    }
}

fn require_parent(parent: Option<u64>, what: &str) -> onapp::Result<u64> {
    parent.ok_or_else(|| OnAppError::InvalidArgument(format!("--parent <{what} id> is required")))
}

async fn handle_get(
    client: &OnAppClient,
    entity: Entity,
    id: u64,
    parent: Option<u64>,
    json: bool,
) -> onapp::Result<()> {
    match entity {
        Entity::VirtualMachine => output_single(&VirtualMachine::get(client, id).await?, json)?,
        Entity::Hypervisor => output_single(&Hypervisor::get(client, id).await?, json)?,
        Entity::User => output_single(&User::get(client, id).await?, json)?,
        Entity::Transaction => output_single(&Transaction::get(client, id).await?, json)?,
        Entity::HypervisorZone => output_json(&HypervisorZone::get(client, id).await?)?,
        Entity::DataStore => output_json(&DataStore::get(client, id).await?)?,
        Entity::Network => output_json(&Network::get(client, id).await?)?,
        Entity::IpAddress => {
            let network_id = require_parent(parent, "network")?;
            output_json(&IpAddress::get(client, (network_id, id)).await?)?;
        }
        Entity::Disk => output_json(&Disk::get(client, id).await?)?,
        Entity::Backup => output_json(&Backup::get(client, id).await?)?,
        Entity::ImageTemplate => output_json(&ImageTemplate::get(client, id).await?)?,
        Entity::LocationGroup => output_json(&LocationGroup::get(client, id).await?)?,
    }
    Ok(())
}

async fn handle_list(
    client: &OnAppClient,
    entity: Entity,
    page: Option<u32>,
    count: Option<u32>,
    parent: Option<u64>,
    json: bool,
) -> onapp::Result<()> {
    let page = page.unwrap_or(1);
    let count = count.unwrap_or(20);

    match entity {
        Entity::VirtualMachine => {
            let vms = VirtualMachine::list_page(client, &(), page, count).await?;
            output_page(&vms, json, |x| VirtualMachineRow::from(x))?;
        }
        Entity::Hypervisor => {
            let hvs = Hypervisor::list_page(client, &(), page, count).await?;
            output_page(&hvs, json, |x| HypervisorRow::from(x))?;
        }
        Entity::HypervisorZone => {
            let zones = HypervisorZone::list_page(client, &(), page, count).await?;
            output_page(&zones, json, |z| LabelRow::new(z.id, &z.label))?;
        }
        Entity::DataStore => {
            let stores = DataStore::list_page(client, &(), page, count).await?;
            output_page(&stores, json, |d| LabelRow::new(d.id, &d.label))?;
        }
        Entity::Network => {
            let networks = Network::list_page(client, &(), page, count).await?;
            output_page(&networks, json, |n| LabelRow::new(n.id, &n.label))?;
        }
        Entity::IpAddress => {
            let network_id = require_parent(parent, "network")?;
            let addresses = IpAddress::list_page(client, &network_id, page, count).await?;
            output_page(&addresses, json, |x| IpAddressRow::from(x))?;
        }
        Entity::Disk => {
            let vm_id = require_parent(parent, "virtual machine")?;
            let disks = Disk::list_page(client, &vm_id, page, count).await?;
            output_page(&disks, json, |x| DiskRow::from(x))?;
        }
        Entity::Backup => {
            let vm_id = require_parent(parent, "virtual machine")?;
            let backups = Backup::list_page(client, &vm_id, page, count).await?;
            output_page(&backups, json, |x| BackupRow::from(x))?;
        }
        Entity::ImageTemplate => {
            let templates = ImageTemplate::list_page(client, &(), page, count).await?;
            output_page(&templates, json, |t| LabelRow::new(t.id, &t.label))?;
        }
        Entity::User => {
            let users = User::list_page(client, &(), page, count).await?;
            output_page(&users, json, |x| UserRow::from(x))?;
        }
        Entity::LocationGroup => {
            let groups = LocationGroup::list_page(client, &(), page, count).await?;
            output_page(&groups, json, |g| LabelRow::new(g.id, &g.display_name()))?;
        }
        Entity::Transaction => {
            let scope = parent.map_or(TransactionScope::All, TransactionScope::VirtualMachine);
            let txs = Transaction::list_page(client, &scope, page, count).await?;
            output_page(&txs, json, |x| TransactionRow::from(x))?;
        }
    }
    Ok(())
}

async fn handle_delete(
    client: &OnAppClient,
    entity: Entity,
    id: u64,
    destroy_backups: bool,
    force: bool,
) -> onapp::Result<()> {
    match entity {
        Entity::VirtualMachine => {
            let options = VirtualMachineDeleteOptions {
                destroy_all_backups: destroy_backups.then_some(true),
                ..Default::default()
            };
            VirtualMachine::delete(client, id, options).await?;
        }
        Entity::User => {
            let options = UserDeleteOptions {
                force: force.then_some(true),
            };
            User::delete(client, id, options).await?;
        }
        Entity::Hypervisor => Hypervisor::delete(client, id, NoOptions {}).await?,
        Entity::HypervisorZone => HypervisorZone::delete(client, id, NoOptions {}).await?,
        Entity::DataStore => DataStore::delete(client, id, NoOptions {}).await?,
        Entity::Network => Network::delete(client, id, NoOptions {}).await?,
        Entity::Disk => Disk::delete(client, id, NoOptions {}).await?,
        Entity::Backup => Backup::delete(client, id, NoOptions {}).await?,
        Entity::ImageTemplate => ImageTemplate::delete(client, id, NoOptions {}).await?,
        Entity::IpAddress | Entity::LocationGroup | Entity::Transaction => {
            return Err(OnAppError::InvalidArgument(format!(
                "{entity:?} cannot be deleted via CLI"
            )));
        }
    }
    eprintln!("Deletion of {entity:?} #{id} scheduled");
    Ok(())
}

async fn handle_vm(
    client: &OnAppClient,
    action: VirtualMachineAction,
    id: u64,
    wait: bool,
    json: bool,
) -> onapp::Result<()> {
    if !wait {
        VirtualMachine::action(client, id, action).await?;
        eprintln!("{} queued for virtual machine #{id}", action.as_str());
        return Ok(());
    }

    let Some(tx) = VirtualMachine::action_transaction(client, id, action).await? else {
        eprintln!("{} completes immediately, nothing to wait for", action.as_str());
        return Ok(());
    };
    eprintln!(
        "{} queued for virtual machine #{id} as transaction #{}",
        action.as_str(),
        tx.id
    );

    let tx = Transaction::wait(client, tx.id, PollOptions::default()).await?;
    output_single(&tx, json)
}

async fn handle_transaction(
    client: &OnAppClient,
    command: TransactionCommand,
    json: bool,
) -> onapp::Result<()> {
    match command {
        TransactionCommand::Wait {
            id,
            poll_interval,
            wait_timeout,
        } => {
            let poll = PollOptions {
                interval: Duration::from_secs(poll_interval),
                timeout: Duration::from_secs(wait_timeout),
            };
            let tx = Transaction::wait(client, id, poll).await?;
            output_single(&tx, json)?;
        }
        TransactionCommand::Last { vm, action } => {
            let scope = vm.map_or(TransactionScope::All, TransactionScope::VirtualMachine);
            let filter = TransactionFilter {
                action,
                ..Default::default()
            };
            let tx = Transaction::last(client, &scope, &filter).await?;
            output_single(&tx, json)?;
        }
        TransactionCommand::Group { id, vm } => {
            let scope = vm.map_or(TransactionScope::All, TransactionScope::VirtualMachine);
            let chain = Transaction::list_by_group(client, &scope, id).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&chain)?);
            } else {
                let rows: Vec<TransactionRow> = chain.iter().map(TransactionRow::from).collect();
                println!("{}", Table::new(rows));
            }
        }
    }
    Ok(())
}

fn output_single<T: Serialize + PrettyPrint>(item: &T, json: bool) -> onapp::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(item)?);
    } else {
        println!("{}", item.pretty_print());
    }
    Ok(())
}

fn output_json<T: Serialize>(item: &T) -> onapp::Result<()> {
    println!("{}", serde_json::to_string_pretty(item)?);
    Ok(())
}

fn output_page<T, R, F>(page: &Page<T>, json: bool, to_row: F) -> onapp::Result<()>
where
    T: Serialize,
    R: Tabled,
    F: Fn(&T) -> R,
{
    if json {
        println!("{}", serde_json::to_string_pretty(&page.items)?);
    } else {
        let rows: Vec<R> = page.items.iter().map(to_row).collect();
        println!("{}", Table::new(rows));
        if page.has_more {
            println!("\nPage {} (more available)", page.page);
        } else {
            println!("\nPage {} (end)", page.page);
        }
    }
    Ok(())
}

// Table row types for non-JSON output

#[derive(Tabled)]
struct LabelRow {
    id: u64,
    label: String,
}

impl LabelRow {
    fn new(id: u64, label: &str) -> Self {
        Self {
            id,
            label: label.to_string(),
        }
    }
}

#[derive(Tabled)]
struct VirtualMachineRow {
    id: u64,
    label: String,
    hostname: String,
    power: &'static str,
    addresses: String,
}

impl From<&VirtualMachine> for VirtualMachineRow {
    fn from(vm: &VirtualMachine) -> Self {
        Self {
            id: vm.id,
            label: vm.label.clone(),
            hostname: vm.hostname.clone().unwrap_or_default(),
            power: if vm.booted { "on" } else { "off" },
            addresses: vm.addresses().join(", "),
        }
    }
}

#[derive(Tabled)]
struct HypervisorRow {
    id: u64,
    label: String,
    ip: String,
    #[tabled(rename = "type")]
    hypervisor_type: String,
    online: bool,
}

impl From<&Hypervisor> for HypervisorRow {
    fn from(hv: &Hypervisor) -> Self {
        Self {
            id: hv.id,
            label: hv.label.clone(),
            ip: hv.ip_address.clone().unwrap_or_default(),
            hypervisor_type: hv.hypervisor_type.clone().unwrap_or_default(),
            online: hv.online,
        }
    }
}

#[derive(Tabled)]
struct IpAddressRow {
    id: u64,
    address: String,
    gateway: String,
    free: bool,
}

impl From<&IpAddress> for IpAddressRow {
    fn from(ip: &IpAddress) -> Self {
        Self {
            id: ip.id,
            address: ip.address.clone(),
            gateway: ip.gateway.clone().unwrap_or_default(),
            free: ip.free,
        }
    }
}

#[derive(Tabled)]
struct DiskRow {
    id: u64,
    label: String,
    #[tabled(rename = "size (GB)")]
    size: u64,
    primary: bool,
}

impl From<&Disk> for DiskRow {
    fn from(d: &Disk) -> Self {
        Self {
            id: d.id,
            label: d.label.clone().unwrap_or_default(),
            size: d.disk_size,
            primary: d.primary,
        }
    }
}

#[derive(Tabled)]
struct BackupRow {
    id: u64,
    #[tabled(rename = "type")]
    backup_type: String,
    built: bool,
    created: String,
}

impl From<&Backup> for BackupRow {
    fn from(b: &Backup) -> Self {
        Self {
            id: b.id,
            backup_type: b.backup_type.clone().unwrap_or_default(),
            built: b.built,
            created: b
                .created_at
                .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
struct UserRow {
    id: u64,
    login: String,
    name: String,
    status: String,
}

impl From<&User> for UserRow {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            login: u.login.clone(),
            name: u.display_name(),
            status: u.status.clone().unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
struct TransactionRow {
    id: u64,
    action: String,
    status: String,
    parent: String,
}

impl From<&Transaction> for TransactionRow {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: tx.id,
            action: tx.action.clone(),
            status: tx.status.to_string(),
            parent: match (&tx.parent_type, tx.parent_id) {
                (Some(t), Some(id)) => format!("{t} #{id}"),
                _ => String::new(),
            },
        }
    }
}
