mod audio_extractor;
pub(crate) use audio_extractor::*;

mod cache_store;
pub(crate) use cache_store::*;

mod media_gateway;
pub(crate) use media_gateway::*;

#[cfg(test)]
pub(crate) use media_gateway::mocks;
