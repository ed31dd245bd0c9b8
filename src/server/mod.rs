//! # Server Module
//!
//! The request/response surface handlers work against, and the load balancer event shapes
//! it is converted from and to.

mod event;
mod request;
mod response;

pub use event::{
    AlbTargetGroupRequest, AlbTargetGroupRequestContext, AlbTargetGroupResponse, ElbContext,
};
pub use request::{Request, TRACE_ID_HEADER};
pub use response::Response;
