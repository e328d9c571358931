mod impls;
mod media_gateway;
mod traits;

pub(crate) use media_gateway::*;
pub(crate) use traits::*;

#[cfg(test)]
pub(crate) mod mocks;
