pub mod depgraph;
pub mod disas;
pub mod dmesg;
pub mod layout;

pub use depgraph::*;
pub use disas::*;
pub use dmesg::*;
pub use layout::*;
