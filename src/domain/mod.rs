//! Domain logic - release-train rules independent of git and CI

pub mod train;
pub mod version;

pub use train::ReleaseTrain;
pub use version::ReleaseVersion;
