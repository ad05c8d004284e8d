mod context;

pub mod snapshot_apply;
pub mod snapshot_show;
pub mod traces_decode;
pub mod traces_show;
pub mod traces_stats;

pub use context::Workspace;
