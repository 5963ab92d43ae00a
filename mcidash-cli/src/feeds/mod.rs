mod fake;

pub use fake::FakeFeed;
