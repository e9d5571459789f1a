pub mod normalize;
pub mod upstream;

pub use normalize::{NormalizedResponse, normalize};
pub use upstream::{HttpUpstream, TransportError, UpstreamTransport};
