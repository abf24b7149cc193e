//! Response Gateway
//!
//! One request, one complete reply. The session depends only on the
//! [`CompletionGateway`] trait; [`HttpGateway`] is the production
//! implementation that posts to the chat proxy endpoint.
//!
//! # Usage
//!
//! ```ignore
//! use reelchat_core::gateway::{CompletionGateway, GatewayRequest, HttpGateway};
//! use tokio_util::sync::CancellationToken;
//!
//! let gateway = HttpGateway::new("http://localhost:3000/api/chat");
//! let request = GatewayRequest::new(&history, system_instruction);
//! let reply = gateway.complete(&request, &CancellationToken::new()).await?;
//! ```

mod http;
mod retry;
mod traits;

pub use http::{HttpGateway, DEFAULT_TIMEOUT};
pub use retry::RetryPolicy;
pub use traits::{CompletionGateway, GatewayError, GatewayRequest, GENERIC_FAILURE_MESSAGE};
