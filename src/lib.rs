pub mod aggregator;
pub mod classifier;
pub mod error;
pub mod model;
pub mod normalizer;
pub mod tracing;

pub mod config {
    pub mod env_loader;
    pub mod model;
}

pub mod parsing {
    pub mod date;
    pub mod time;
}

pub mod sources {
    pub mod adapter;
    pub mod demo;
    pub mod html;
    pub mod http;
    pub mod json_feed;
    pub mod registry;
}
