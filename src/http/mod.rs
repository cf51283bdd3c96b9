//! HTTP message types shared by the gateway and the client.
//!
//! # Data Flow
//! ```text
//! intercepted http::Request<Bytes>
//!     → request.rs (GatewayRequest, raw body)
//!     → [pipeline normalizes body into form.rs FormData or JSON]
//!     → handler
//!     → response.rs (GatewayResponse)
//!     → http::Response<Bytes> back across the interception boundary
//! ```

pub mod form;
pub mod request;
pub mod response;

pub use form::{FormData, FormError, FormValue};
pub use request::{GatewayRequest, RequestBody};
pub use response::{GatewayResponse, INTERNAL_ERROR_BODY};
