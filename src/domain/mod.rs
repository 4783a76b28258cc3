pub mod cluster;
pub mod reroute;
