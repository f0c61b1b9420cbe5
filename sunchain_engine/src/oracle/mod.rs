//! The oracle protocol: building price requests, and making sense of the responses.
//!
//! A request and its response live in two unrelated transactions. The only thing linking them is the
//! [`CorrelationId`], which encodes the order id as `Order:{id}` in the request's `client_id` field and comes back
//! verbatim in the response.
mod correlation;
mod price;
mod request;
mod response;

pub use correlation::{correlate, CorrelationId, CORRELATION_NAMESPACE};
pub use price::{decode_price, Price, PRICE_RESULT_LEN};
pub use request::{multiplier_calldata, OracleRequest};
pub use response::{OracleResponse, ResolveStatus};
