pub mod node_util;

pub(crate) use node_util::*;
