use super::*;
use async_trait::async_trait;
use client_core::{FailureHandling, ProductStore, StoreError};
use shared::protocol::{NewProduct, Product};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use tokio::sync::Mutex;

#[derive(Default)]
struct InMemoryStore {
    records: Mutex<Vec<Product>>,
    next_id: AtomicUsize,
}

#[async_trait]
impl ProductStore for InMemoryStore {
    async fn list(&self) -> Result<Vec<Product>, StoreError> {
        Ok(self.records.lock().await.clone())
    }

    async fn create(&self, draft: &NewProduct) -> Result<Product, StoreError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let created = Product::from_new(ProductId(format!("p{id}")), draft.clone());
        self.records.lock().await.push(created.clone());
        Ok(created)
    }

    async fn update(&self, product: &Product) -> Result<(), StoreError> {
        let mut records = self.records.lock().await;
        if let Some(existing) = records.iter_mut().find(|p| p.id == product.id) {
            *existing = product.clone();
        }
        Ok(())
    }

    async fn delete(&self, id: &ProductId) -> Result<(), StoreError> {
        self.records.lock().await.retain(|p| &p.id != id);
        Ok(())
    }
}

async fn run_script(controller: &ProductListController, script: &str) -> String {
    let mut output = Vec::new();
    run(controller, script.as_bytes(), &mut output)
        .await
        .expect("shell run");
    String::from_utf8(output).expect("utf8")
}

#[test]
fn parses_commands_with_free_text_values() {
    assert_eq!(
        parse_command("new description  A small desk lamp ").expect("parse"),
        Some(ShellCommand::New {
            field: ProductField::Description,
            value: "A small desk lamp".to_string(),
        })
    );
    assert_eq!(
        parse_command("EDIT 65f1").expect("parse"),
        Some(ShellCommand::Edit(ProductId::from("65f1")))
    );
    assert_eq!(parse_command("   ").expect("parse"), None);
}

#[test]
fn rejects_malformed_commands() {
    assert!(parse_command("delete").is_err());
    assert!(parse_command("set colour red").is_err());
    assert!(parse_command("frobnicate").is_err());
}

#[tokio::test]
async fn scripted_session_adds_edits_and_deletes() {
    let controller = ProductListController::with_failure_handling(
        Arc::new(InMemoryStore::default()),
        FailureHandling::Propagate,
    );
    controller.load().await.expect("load");

    let output = run_script(
        &controller,
        "new name Lamp\nnew price 19.5\nnew quantity 3\nadd\nnew name Desk\nadd\n\
         edit p1\nset name Floor lamp\nupdate\ndelete p2\nquit\nlist\n",
    )
    .await;

    let products = controller.products().await;
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].name, "Floor lamp");
    assert_eq!(products[0].price, 19.5);
    assert!(controller.editing_product().await.is_none());
    assert!(output.contains("$19.5"));
}

#[tokio::test]
async fn cancel_discards_edit_without_saving() {
    let store = Arc::new(InMemoryStore::default());
    let controller = ProductListController::new(store.clone());
    controller
        .create_from(NewProduct::new("Lamp", "", 10.0, 1))
        .await
        .expect("create");

    let output = run_script(&controller, "edit p1\nset price 99\ncancel\ndrafts\n").await;

    assert!(output.contains("edit cancelled"));
    assert!(output.contains("editing: (none)"));
    assert_eq!(controller.products().await[0].price, 10.0);
    assert_eq!(store.records.lock().await[0].price, 10.0);
}

#[tokio::test]
async fn reports_unknown_rows_and_missing_edit() {
    let controller = ProductListController::new(Arc::new(InMemoryStore::default()));

    let output = run_script(&controller, "edit nope\nset name x\nupdate\nbogus\n").await;

    assert!(output.contains("error: no product with id nope"));
    assert!(output.contains("error: no product is being edited"));
    assert!(output.contains("error: unknown command 'bogus'"));
}
