pub mod defs;
pub mod glb;
pub mod util;
