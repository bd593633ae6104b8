//! Mock transport for isolating the client in tests.

use futures::future::BoxFuture;
use mockall::mock;

use crate::client::transport::{Transport, TransportError, TransportResponse};

mock! {
    pub Transport {}

    impl Transport for Transport {
        fn get(&self, url: &str) -> BoxFuture<'static, Result<TransportResponse, TransportError>>;
    }
}
