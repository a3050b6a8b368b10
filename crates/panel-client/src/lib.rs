//! `panel-client`: HTTP implementation of the schedule persistence gateway
//! against the panel's client API.

mod http;

pub use http::HttpGateway;
