use std::sync::Arc;

use shared::{
    domain::ProductId,
    protocol::{NewProduct, Product},
};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, error, info, warn};

pub mod drafts;
pub mod error;
pub mod store;
pub mod view;

pub use drafts::{coerce_number, EditableDraft, ProductField, UnknownField};
pub use error::StoreError;
pub use store::{HttpProductStore, ProductStore};

/// What the controller does with a failed store call. Local state is left
/// untouched either way and the failure is always logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureHandling {
    /// Swallow the failure after logging it; the operation returns `Ok(())`.
    #[default]
    LogOnly,
    /// Log the failure and hand it back to the caller.
    Propagate,
}

impl std::str::FromStr for FailureHandling {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "log_only" | "log" => Ok(Self::LogOnly),
            "propagate" => Ok(Self::Propagate),
            other => Err(format!(
                "unknown failure handling '{other}' (expected log_only or propagate)"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ControllerEvent {
    ProductsLoaded { count: usize },
    ProductCreated(Product),
    ProductUpdated(Product),
    ProductDeleted(ProductId),
    NewDraftChanged(NewProduct),
    EditStarted(Product),
    EditChanged(Product),
    EditCleared,
}

/// Local view of the product collection plus the two form drafts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductListState {
    pub products: Vec<Product>,
    pub new_product: NewProduct,
    pub editing_product: Option<Product>,
}

/// Keeps a product list in step with a remote `ProductStore`.
///
/// Every operation issues at most one request and applies its response once
/// it resolves. The state lock is never held across a request, so overlapping
/// operations apply in the order their responses arrive.
pub struct ProductListController {
    store: Arc<dyn ProductStore>,
    failure_handling: FailureHandling,
    inner: Mutex<ProductListState>,
    events: broadcast::Sender<ControllerEvent>,
}

impl ProductListController {
    pub fn new(store: Arc<dyn ProductStore>) -> Self {
        Self::with_failure_handling(store, FailureHandling::default())
    }

    pub fn with_failure_handling(
        store: Arc<dyn ProductStore>,
        failure_handling: FailureHandling,
    ) -> Self {
        let (events, _) = broadcast::channel(256);
        Self {
            store,
            failure_handling,
            inner: Mutex::new(ProductListState::default()),
            events,
        }
    }

    pub fn failure_handling(&self) -> FailureHandling {
        self.failure_handling
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ControllerEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> ProductListState {
        self.inner.lock().await.clone()
    }

    pub async fn products(&self) -> Vec<Product> {
        self.inner.lock().await.products.clone()
    }

    pub async fn editing_product(&self) -> Option<Product> {
        self.inner.lock().await.editing_product.clone()
    }

    pub async fn new_product(&self) -> NewProduct {
        self.inner.lock().await.new_product.clone()
    }

    /// Replaces the local list with the store's collection.
    pub async fn load(&self) -> Result<(), StoreError> {
        let products = match self.store.list().await {
            Ok(products) => products,
            Err(err) => return self.report("load", None, err),
        };

        let count = products.len();
        self.inner.lock().await.products = products;
        info!(count, "loaded products");
        self.emit(ControllerEvent::ProductsLoaded { count });
        Ok(())
    }

    /// Submits the `new_product` draft.
    pub async fn create(&self) -> Result<(), StoreError> {
        let draft = self.new_product().await;
        self.create_from(draft).await
    }

    /// Submits `draft`; on success the stored record is appended and the
    /// `new_product` draft is reset.
    pub async fn create_from(&self, draft: NewProduct) -> Result<(), StoreError> {
        let created = match self.store.create(&draft).await {
            Ok(created) => created,
            Err(err) => return self.report("create", None, err),
        };

        {
            let mut guard = self.inner.lock().await;
            // Ids stay unique even if the store hands back one we already list.
            match guard.products.iter().position(|p| p.id == created.id) {
                Some(index) => {
                    warn!(product_id = %created.id, "store returned an id already in the list");
                    guard.products[index] = created.clone();
                }
                None => guard.products.push(created.clone()),
            }
            guard.new_product = NewProduct::default();
        }

        info!(product_id = %created.id, "created product");
        self.emit(ControllerEvent::ProductCreated(created));
        self.emit(ControllerEvent::NewDraftChanged(NewProduct::default()));
        Ok(())
    }

    /// Submits the active edit draft. Without one this does nothing.
    /// A failed update keeps the draft so the edit can be retried.
    pub async fn update(&self) -> Result<(), StoreError> {
        let Some(product) = self.editing_product().await else {
            debug!("update requested with no product being edited");
            return Ok(());
        };

        if let Err(err) = self.store.update(&product).await {
            return self.report("update", Some(&product.id), err);
        }

        let cleared = {
            let mut guard = self.inner.lock().await;
            if let Some(existing) = guard.products.iter_mut().find(|p| p.id == product.id) {
                *existing = product.clone();
            }
            // A different row may have been selected while the request was in flight.
            let same_row = guard
                .editing_product
                .as_ref()
                .is_some_and(|draft| draft.id == product.id);
            if same_row {
                guard.editing_product = None;
            }
            same_row
        };

        info!(product_id = %product.id, "updated product");
        self.emit(ControllerEvent::ProductUpdated(product));
        if cleared {
            self.emit(ControllerEvent::EditCleared);
        }
        Ok(())
    }

    pub async fn delete(&self, id: &ProductId) -> Result<(), StoreError> {
        if let Err(err) = self.store.delete(id).await {
            return self.report("delete", Some(id), err);
        }

        self.inner.lock().await.products.retain(|p| &p.id != id);
        info!(product_id = %id, "deleted product");
        self.emit(ControllerEvent::ProductDeleted(id.clone()));
        Ok(())
    }

    pub async fn select_for_edit(&self, product: &Product) {
        self.inner.lock().await.editing_product = Some(product.clone());
        self.emit(ControllerEvent::EditStarted(product.clone()));
    }

    /// Starts editing the listed product with `id`. Returns false when no row matches.
    pub async fn select_for_edit_by_id(&self, id: &ProductId) -> bool {
        let found = {
            let guard = self.inner.lock().await;
            guard.products.iter().find(|p| &p.id == id).cloned()
        };
        match found {
            Some(product) => {
                self.select_for_edit(&product).await;
                true
            }
            None => false,
        }
    }

    /// Drops the edit draft. Never contacts the store.
    pub async fn cancel_edit(&self) {
        self.inner.lock().await.editing_product = None;
        self.emit(ControllerEvent::EditCleared);
    }

    /// Returns false when nothing is being edited.
    pub async fn edit_field(&self, field: ProductField, text: &str) -> bool {
        let edited = {
            let mut guard = self.inner.lock().await;
            guard.editing_product.as_mut().map(|draft| {
                draft.set_field(field, text);
                draft.clone()
            })
        };
        match edited {
            Some(draft) => {
                self.emit(ControllerEvent::EditChanged(draft));
                true
            }
            None => false,
        }
    }

    pub async fn edit_new_field(&self, field: ProductField, text: &str) {
        let draft = {
            let mut guard = self.inner.lock().await;
            guard.new_product.set_field(field, text);
            guard.new_product.clone()
        };
        self.emit(ControllerEvent::NewDraftChanged(draft));
    }

    fn report(
        &self,
        operation: &'static str,
        product_id: Option<&ProductId>,
        err: StoreError,
    ) -> Result<(), StoreError> {
        error!(
            operation,
            product_id = product_id.map(ProductId::as_str),
            kind = err.kind(),
            "product store request failed: {err}"
        );
        match self.failure_handling {
            FailureHandling::LogOnly => Ok(()),
            FailureHandling::Propagate => Err(err),
        }
    }

    fn emit(&self, event: ControllerEvent) {
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
