pub mod connection;
pub mod pair;

pub use connection::Decision;
pub use pair::PairKey;
