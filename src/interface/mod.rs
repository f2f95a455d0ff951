//! Interface subsystem: the externally reachable control surfaces.
//!
//! # Data Flow
//! ```text
//! interfaces[] section
//!     → registry decodes kind-specific params (InterfaceConfig)
//!     → InterfaceConfig::build(context) during bootstrap
//!         context = dtab store + namer table + broadcast sinks
//!     → Arc<dyn Servable>
//!
//! Serving (ServiceInstance::run):
//!     bind Servable::addr() → Servable::serve(listener, shutdown)
//! ```
//!
//! # Design Decisions
//! - Building an interface never binds a socket; binding happens at run time
//! - Every interface of an instance shares one store and one namer table

pub mod http;

use std::fmt;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::config::ComponentError;
use crate::routing::NamerTable;
use crate::storage::DtabStore;
use crate::telemetry::{BroadcastStats, BroadcastTracer};

/// Future returned by [`Servable::serve`].
pub type ServeFuture = BoxFuture<'static, io::Result<()>>;

/// Everything an interface is built with.
#[derive(Debug, Clone)]
pub struct InterfaceContext {
    pub store: Arc<dyn DtabStore>,
    pub namers: Arc<NamerTable>,
    pub stats: Arc<BroadcastStats>,
    pub tracer: Arc<BroadcastTracer>,
}

/// A network-facing control surface.
pub trait Servable: Send + Sync + fmt::Debug {
    fn kind(&self) -> &str;

    /// Address this interface wants to listen on.
    fn addr(&self) -> SocketAddr;

    /// Serve on `listener` until `shutdown` fires.
    fn serve(&self, listener: TcpListener, shutdown: broadcast::Receiver<()>) -> ServeFuture;
}

/// Kind-specific interface parameters, decoded by the registry.
pub trait InterfaceConfig: Send + Sync + fmt::Debug {
    fn build(&self, context: &InterfaceContext) -> Result<Arc<dyn Servable>, ComponentError>;
}

/// Resolve once the shutdown broadcast fires or its sender is dropped.
pub(crate) async fn shutdown_signal(mut shutdown: broadcast::Receiver<()>) {
    let _ = shutdown.recv().await;
}
