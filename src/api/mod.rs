pub(crate) mod backoff;
pub(crate) mod chunk;
pub(crate) mod fetcher;
pub(crate) mod params;
pub(crate) mod response;
