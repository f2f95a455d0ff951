//! The composed service instance.

use std::io;
use std::sync::Arc;

use futures_util::future::{try_join_all, BoxFuture};
use tokio::net::TcpListener;

use crate::admin::AdminHandle;
use crate::interface::Servable;
use crate::lifecycle::Shutdown;
use crate::routing::NamerTable;
use crate::storage::DtabStore;
use crate::telemetry::{BroadcastStats, BroadcastTracer, Telemeter, Telemetry};

/// Everything a valid document describes, built and wired together.
///
/// Only produced by [`compose`](crate::lifecycle::compose); holding one means
/// every check passed and every factory succeeded.
#[derive(Debug)]
pub struct ServiceInstance {
    admin: AdminHandle,
    telemetry: Telemetry,
    store: Arc<dyn DtabStore>,
    namers: Arc<NamerTable>,
    interfaces: Vec<Arc<dyn Servable>>,
}

impl ServiceInstance {
    pub(crate) fn new(
        admin: AdminHandle,
        telemetry: Telemetry,
        store: Arc<dyn DtabStore>,
        namers: Arc<NamerTable>,
        interfaces: Vec<Arc<dyn Servable>>,
    ) -> Self {
        Self {
            admin,
            telemetry,
            store,
            namers,
            interfaces,
        }
    }

    pub fn admin(&self) -> &AdminHandle {
        &self.admin
    }

    pub fn telemeters(&self) -> &[Arc<dyn Telemeter>] {
        &self.telemetry.telemeters
    }

    /// The stats sink interfaces were built with.
    pub fn stats(&self) -> &Arc<BroadcastStats> {
        &self.telemetry.stats
    }

    pub fn tracer(&self) -> &Arc<BroadcastTracer> {
        &self.telemetry.tracer
    }

    pub fn store(&self) -> &Arc<dyn DtabStore> {
        &self.store
    }

    pub fn namers(&self) -> &NamerTable {
        &self.namers
    }

    pub fn interfaces(&self) -> &[Arc<dyn Servable>] {
        &self.interfaces
    }

    /// Bind the admin server and every interface at their configured
    /// addresses, then serve until `shutdown` fires.
    pub async fn run(&self, shutdown: &Shutdown) -> io::Result<()> {
        let admin = TcpListener::bind(self.admin.addr()).await?;
        let mut listeners = Vec::with_capacity(self.interfaces.len());
        for interface in &self.interfaces {
            listeners.push(TcpListener::bind(interface.addr()).await?);
        }
        self.serve(admin, listeners, shutdown).await
    }

    /// Serve on already-bound listeners, one per interface in declaration order.
    pub async fn serve(
        &self,
        admin: TcpListener,
        listeners: Vec<TcpListener>,
        shutdown: &Shutdown,
    ) -> io::Result<()> {
        if listeners.len() != self.interfaces.len() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "{} listeners for {} interfaces",
                    listeners.len(),
                    self.interfaces.len()
                ),
            ));
        }

        let mut servers: Vec<BoxFuture<'_, io::Result<()>>> = Vec::with_capacity(listeners.len() + 1);
        servers.push(Box::pin(self.admin.serve(admin, shutdown.subscribe())));
        for (interface, listener) in self.interfaces.iter().zip(listeners) {
            servers.push(interface.serve(listener, shutdown.subscribe()));
        }

        tracing::info!(servers = servers.len(), "Instance serving");
        try_join_all(servers).await?;
        tracing::info!("Instance stopped");
        Ok(())
    }
}
