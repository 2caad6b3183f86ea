pub mod delay;
pub mod http;
pub mod kv;

pub use self::delay::{Delay, DelayOperation, DelayOutput, TimerId};
pub use self::http::{CatalogEndpoints, EndpointError, ValidatedUrl};
pub use self::kv::{KeyNamespace, KvError, KvKey};

pub use crux_core::render::Render;
pub use crux_http::Http;
pub use crux_kv::KeyValue;

use crate::event::Event;

#[derive(crux_core::macros::Effect)]
pub struct Capabilities {
    pub http: Http<Event>,
    pub key_value: KeyValue<Event>,
    pub render: Render<Event>,
    pub delay: Delay<Event>,
}
