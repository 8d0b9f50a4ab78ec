//! OnApp API model types.

mod backup;
mod backup_server;
mod backup_server_join;
mod billing_plan;
mod configuration;
mod data_store;
mod data_store_join;
mod disk;
mod firewall_rule;
mod hypervisor;
mod hypervisor_zone;
mod image_template;
mod image_template_group;
mod instance_package;
mod ip_address;
mod ip_address_join;
mod ip_net;
mod ip_range;
mod location_group;
mod network;
mod network_interface;
mod network_join;
mod role;
mod ssh_key;
mod target;
mod transaction;
mod user;
mod user_group;
mod user_white_list;
mod virtual_machine;
mod zone;

pub use backup::*;
pub use backup_server::*;
pub use backup_server_join::*;
pub use billing_plan::*;
pub use configuration::*;
pub use data_store::*;
pub use data_store_join::*;
pub use disk::*;
pub use firewall_rule::*;
pub use hypervisor::*;
pub use hypervisor_zone::*;
pub use image_template::*;
pub use image_template_group::*;
pub use instance_package::*;
pub use ip_address::*;
pub use ip_address_join::*;
pub use ip_net::*;
pub use ip_range::*;
pub use location_group::*;
pub use network::*;
pub use network_interface::*;
pub use network_join::*;
pub use role::*;
pub use ssh_key::*;
pub use target::*;
pub use transaction::*;
pub use user::*;
pub use user_group::*;
pub use user_white_list::*;
pub use virtual_machine::*;
pub use zone::*;
