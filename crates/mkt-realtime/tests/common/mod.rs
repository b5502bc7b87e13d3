#![allow(unused_imports)]

pub(crate) mod mock_transport;

pub use mock_transport::*;
