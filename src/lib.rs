pub mod bus;
pub mod commit;
pub mod constants;
pub mod discovery;
pub mod helpers;
pub mod hw;
pub mod model;
pub mod proxy;
pub mod registry;
pub mod tree;
