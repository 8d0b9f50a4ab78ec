//! Output formatting for CLI display.
//!
//! Provides the [`PrettyPrint`] trait for human-readable output
//! as an alternative to JSON serialization.

use chrono::{DateTime, Utc};

use crate::{Hypervisor, Transaction, User, VirtualMachine};

/// Trait for human-readable key-value output.
///
/// Implemented by resource types to provide formatted output
/// suitable for terminal display when `--json` is not specified.
pub trait PrettyPrint {
    /// Returns a formatted string for terminal display.
    fn pretty_print(&self) -> String;
}

fn timestamp(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

impl PrettyPrint for VirtualMachine {
    fn pretty_print(&self) -> String {
        let header = format!("Virtual Machine #{}: {}", self.id, self.label);
        let divider = "─".repeat(header.chars().count().max(30));

        let power = if self.booted { "on" } else { "off" };
        let mut lines = vec![header, divider, format!("Power:          {}", power)];

        if let Some(ref hostname) = self.hostname {
            lines.push(format!("Hostname:       {}", hostname));
        }

        let addresses = self.addresses();
        if !addresses.is_empty() {
            lines.push(format!("Addresses:      {}", addresses.join(", ")));
        }

        if let (Some(cpus), Some(memory)) = (self.cpus, self.memory) {
            lines.push(format!("Resources:      {} CPU, {} MB RAM", cpus, memory));
        }

        if let Some(disk) = self.total_disk_size {
            lines.push(format!("Disk:           {} GB", disk));
        }

        if let Some(ref template) = self.template_label {
            lines.push(format!("Template:       {}", template));
        }

        if let Some(hv) = self.hypervisor_id {
            lines.push(format!("Hypervisor:     #{}", hv));
        }

        if self.locked {
            lines.push("Locked:         yes".to_string());
        }

        if self.suspended {
            lines.push("Suspended:      yes".to_string());
        }

        if let Some(ref created) = self.created_at {
            lines.push(format!("Created:        {}", timestamp(created)));
        }

        lines.join("\n")
    }
}

impl PrettyPrint for Hypervisor {
    fn pretty_print(&self) -> String {
        let header = format!("Hypervisor #{}: {}", self.id, self.label);
        let divider = "─".repeat(header.chars().count().max(30));

        let mut lines = vec![
            header,
            divider,
            format!("Online:         {}", yes_no(self.online)),
            format!("Enabled:        {}", yes_no(self.enabled)),
        ];

        if let Some(ref ip) = self.ip_address {
            lines.push(format!("IP Address:     {}", ip));
        }

        if let Some(ref hv_type) = self.hypervisor_type {
            lines.push(format!("Type:           {}", hv_type));
        }

        if let Some(zone) = self.hypervisor_group_id {
            lines.push(format!("Zone:           #{}", zone));
        }

        if let (Some(total), Some(free)) = (self.total_memory, self.free_memory) {
            lines.push(format!("Memory:         {} MB free of {} MB", free, total));
        }

        if self.failure_count > 0 {
            lines.push(format!("Failures:       {}", self.failure_count));
        }

        lines.join("\n")
    }
}

impl PrettyPrint for Transaction {
    fn pretty_print(&self) -> String {
        let header = format!("Transaction #{}", self.id);
        let divider = "─".repeat(header.len().max(30));

        let mut lines = vec![
            header,
            divider,
            format!("Action:         {}", self.action),
            format!("Status:         {}", self.status),
        ];

        if let (Some(ref parent_type), Some(parent_id)) = (&self.parent_type, self.parent_id) {
            lines.push(format!("Parent:         {} #{}", parent_type, parent_id));
        }

        if let (Some(ref assoc_type), Some(assoc_id)) = (&self.associated_type, self.associated_id)
        {
            lines.push(format!("Associated:     {} #{}", assoc_type, assoc_id));
        }

        if let Some(dep) = self.dependent_transaction_id {
            lines.push(format!("Depends on:     #{}", dep));
        }

        if let Some(ref started) = self.started_at {
            lines.push(format!("Started:        {}", timestamp(started)));
        }

        if let Some(ref updated) = self.updated_at {
            lines.push(format!("Updated:        {}", timestamp(updated)));
        }

        lines.join("\n")
    }
}

impl PrettyPrint for User {
    fn pretty_print(&self) -> String {
        let header = format!("User #{}: {}", self.id, self.login);
        let divider = "─".repeat(header.chars().count().max(30));

        let mut lines = vec![header, divider, format!("Name:           {}", self.display_name())];

        if let Some(ref email) = self.email {
            lines.push(format!("E-mail:         {}", email));
        }

        if let Some(ref status) = self.status {
            lines.push(format!("Status:         {}", status));
        }

        let roles = self.role_labels();
        if !roles.is_empty() {
            lines.push(format!("Roles:          {}", roles.join(", ")));
        }

        if let Some(plan) = self.billing_plan_id {
            lines.push(format!("Billing Plan:   #{}", plan));
        }

        if let Some(ref activated) = self.activated_at {
            lines.push(format!("Activated:      {}", timestamp(activated)));
        }

        lines.join("\n")
    }
}
