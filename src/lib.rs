pub mod api;
pub mod config;
pub mod effects;
pub mod fetch;
pub mod http_client;
pub mod state;
pub mod store;
pub mod view_model;

pub use config::StoreConfig;
pub use effects::Intent;
pub use fetch::{DataFetch, HttpError, HttpFetcher};
pub use store::StatsStore;
pub use view_model::StatisticsViewModel;
