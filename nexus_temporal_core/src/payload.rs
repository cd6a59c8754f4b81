use bytes::Bytes;
use prost::Message;

use crate::error::PayloadError;

/// The "no value" payload of operations without an input or an output.
pub type NoValue = ();

/// Anything that can travel as an operation input or output.
///
/// Every prost message qualifies, including [`NoValue`] which encodes to
/// zero bytes.
pub trait Payload: Message + Default + Send + 'static {}

impl<T> Payload for T where T: Message + Default + Send + 'static {}

pub fn encode_payload<P: Payload>(value: &P) -> Bytes {
    Bytes::from(value.encode_to_vec())
}

pub fn decode_payload<P: Payload>(data: &[u8]) -> Result<P, PayloadError> {
    P::decode(data).map_err(PayloadError::Decode)
}
