//! Route resolution into a [`RenderState`].

use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use hydrate_ssr_core::{
    FailureCause, RenderState, ResolutionPhase, SsrOptions, Store, StoreDescriptors, View,
};
use tokio::sync::OnceCell;

use crate::client::EmbeddedSnapshot;
use crate::error::RouteError;
use crate::router::{RouteContext, Router};

/// Where a resolution gets its store from.
#[async_trait]
pub trait StoreSource: Send + Sync {
    async fn acquire(&self) -> Arc<Store>;
}

/// Server side: a fresh store for every resolution.
#[derive(Debug, Clone)]
pub struct PerRequestStore {
    descriptors: StoreDescriptors,
    options: SsrOptions,
}

impl PerRequestStore {
    pub fn new(descriptors: StoreDescriptors, options: SsrOptions) -> Self {
        Self {
            descriptors,
            options,
        }
    }
}

#[async_trait]
impl StoreSource for PerRequestStore {
    async fn acquire(&self) -> Arc<Store> {
        Arc::new(self.descriptors.init(&self.options))
    }
}

/// Client side: one store per process, hydrated once from the embedded
/// snapshot.
///
/// Concurrent first acquisitions wait for the same initialization instead
/// of each building and merging their own store.
#[derive(Debug)]
pub struct SingletonStore {
    descriptors: StoreDescriptors,
    options: SsrOptions,
    embedded: EmbeddedSnapshot,
    store: OnceCell<Arc<Store>>,
}

impl SingletonStore {
    pub fn new(descriptors: StoreDescriptors, options: SsrOptions, embedded: EmbeddedSnapshot) -> Self {
        Self {
            descriptors,
            options,
            embedded,
            store: OnceCell::new(),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.store.initialized()
    }
}

#[async_trait]
impl StoreSource for SingletonStore {
    async fn acquire(&self) -> Arc<Store> {
        let store = self
            .store
            .get_or_init(|| async {
                let store = self.descriptors.init(&self.options);
                if let Some(snapshot) = self.embedded.take() {
                    store.hydrate(&snapshot);
                    tracing::debug!("Store hydrated from embedded snapshot");
                }
                Arc::new(store)
            })
            .await;
        Arc::clone(store)
    }
}

/// Resolves paths through a [`Router`] into render states.
pub struct RouteResolver {
    router: Router,
    stores: Arc<dyn StoreSource>,
}

impl RouteResolver {
    pub fn new(router: Router, stores: Arc<dyn StoreSource>) -> Self {
        Self { router, stores }
    }

    /// Resolve into a new state (server, one per request).
    pub async fn resolve(&self, path: &str, query: BTreeMap<String, String>) -> RenderState {
        let mut state = RenderState::new();
        self.resolve_into(&mut state, path, query).await;
        state
    }

    /// Resolve into an existing state (client, reused across navigations).
    pub async fn resolve_into(
        &self,
        state: &mut RenderState,
        path: &str,
        query: BTreeMap<String, String>,
    ) {
        state.reset();
        state.phase = ResolutionPhase::Matching;

        let store = self.stores.acquire().await;
        // Handlers must observe the location they are rendering.
        store.router().set(path, query.clone());
        state.store = Some(Arc::clone(&store));

        let mut cx = RouteContext::new(path, query, Arc::clone(&store));
        let result = self.router.dispatch(&mut cx).await;

        match result {
            Ok(()) => {
                state.draw_target = cx.draw_target.take().map(|view| View::provider(store, view));
                state.phase = ResolutionPhase::Rendered;
            }
            Err(RouteError::Redirect(target)) => {
                tracing::debug!(path, target = %target, "Route redirected");
                state.redirect_target = Some(target);
                state.draw_target = None;
                state.phase = ResolutionPhase::Redirected;
            }
            Err(RouteError::NotFound(_)) => {
                tracing::debug!(path, "No route matched");
                state.draw_target = cx.draw_target.take();
                state.failure = Some(FailureCause::NotFound);
                state.phase = ResolutionPhase::Failed;
            }
            Err(RouteError::Failed(error)) => {
                tracing::error!(path, error = ?error, "Route handler failed");
                state.draw_target = cx.draw_target.take();
                state.failure = Some(FailureCause::Handler(format!("{error:#}")));
                state.phase = ResolutionPhase::Failed;
            }
        }

        tracing::debug!(path, phase = ?state.phase, "Route resolved");
    }
}

impl std::fmt::Debug for RouteResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteResolver")
            .field("router", &self.router)
            .finish_non_exhaustive()
    }
}
