use crate::binding::ListenerBinding;
use crate::handler::{Responder, ResponseLock};
use crate::listener::Listener;
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Starts one listener task per binding. A port that fails to bind is logged
/// and dropped; the rest keep serving.
pub struct FanOut {
    listeners: Vec<Listener>,
}

impl FanOut {
    pub fn new(bindings: Vec<ListenerBinding>, message: &str, serialize_responses: bool) -> Self {
        let lock: Option<ResponseLock> = if serialize_responses {
            Some(Arc::new(Mutex::new(())))
        } else {
            None
        };

        let listeners = bindings
            .into_iter()
            .map(|binding| {
                let responder = Responder::new(
                    binding.rule,
                    binding.port.clone(),
                    message.to_string(),
                    lock.clone(),
                );
                Listener::new(binding, responder)
            })
            .collect();

        Self { listeners }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn spawn(self) -> Vec<JoinHandle<()>> {
        self.listeners
            .into_iter()
            .map(|listener| {
                tokio::spawn(async move {
                    if let Err(e) = listener.run().await {
                        error!("{}", e);
                    }
                })
            })
            .collect()
    }

    pub async fn run(self) {
        info!("Starting {} listeners", self.len());

        for result in join_all(self.spawn()).await {
            if let Err(e) = result {
                error!("Listener task failed: {}", e);
            }
        }

        warn!("No listener is serving; idling until terminated");
        std::future::pending::<()>().await;
    }
}
