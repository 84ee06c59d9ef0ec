pub mod credentials;
pub mod diff;
pub mod migrate;
pub mod sync;
pub mod youtube;
