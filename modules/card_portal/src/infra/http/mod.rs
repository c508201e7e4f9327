pub mod gateway;

pub use gateway::{ApiRequest, NoToken, Payload, RequestGateway, TokenSource};
