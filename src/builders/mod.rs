pub mod value_net;
pub mod graph;

pub use value_net::ValueNetBuilder;
pub use graph::GraphBuilder;
