pub mod unknown_domain_aux_server;
pub mod unknown_domain_client;
pub mod unknown_domain_server;

pub use unknown_domain_aux_server::{ThresholdParams, UnknownDomainAuxServer};
pub use unknown_domain_client::on_device_algorithm;
pub use unknown_domain_server::UnknownDomainServer;
