pub mod advisory;
pub mod arrivals;
pub mod board;
pub mod config;
pub mod error;
pub mod fetch;
pub mod parser;
pub mod scheduler;
pub mod server;
pub mod snapshot;

pub mod gtfs_rt {
    include!(concat!(env!("OUT_DIR"), "/transit_realtime.rs"));
}
