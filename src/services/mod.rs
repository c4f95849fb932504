pub mod backend_client;
pub mod data_source;
pub mod exchange_client;
mod http;

pub use backend_client::BackendClient;
pub use data_source::{DataGroup, DataSource, FetchFuture, HttpDataSource, Payload};
pub use exchange_client::ExchangeClient;
