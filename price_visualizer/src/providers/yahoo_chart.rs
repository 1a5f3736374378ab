pub mod params;
pub mod provider;
pub mod response;

pub use params::ChartQuery;
pub use provider::YahooChartProvider;
