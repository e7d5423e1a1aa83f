//! Interactive line-oriented front end over the product list controller.

use client_core::{view, ProductField, ProductListController};
use shared::domain::ProductId;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

const HELP: &str = "\
commands:
  list                      show the product table
  new <field> <value>       edit the new-product form (name, description, price, quantity)
  add                       create a product from the form
  edit <id>                 start editing a listed product
  set <field> <value>       change a field of the product being edited
  update                    save the product being edited
  cancel                    stop editing without saving
  delete <id>               delete a product
  drafts                    show the new-product form and the edit form
  help                      show this text
  quit                      leave the shell
";

#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    List,
    New { field: ProductField, value: String },
    Add,
    Edit(ProductId),
    Set { field: ProductField, value: String },
    Update,
    Cancel,
    Delete(ProductId),
    Drafts,
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<Option<ShellCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "list" | "ls" => ShellCommand::List,
        "new" => {
            let (field, value) = field_and_value(rest)?;
            ShellCommand::New { field, value }
        }
        "add" => ShellCommand::Add,
        "edit" => ShellCommand::Edit(required_id(rest)?),
        "set" => {
            let (field, value) = field_and_value(rest)?;
            ShellCommand::Set { field, value }
        }
        "update" | "save" => ShellCommand::Update,
        "cancel" => ShellCommand::Cancel,
        "delete" | "rm" => ShellCommand::Delete(required_id(rest)?),
        "drafts" => ShellCommand::Drafts,
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" => ShellCommand::Quit,
        other => return Err(format!("unknown command '{other}' (try 'help')")),
    };
    Ok(Some(command))
}

fn field_and_value(rest: &str) -> Result<(ProductField, String), String> {
    let (field, value) = match rest.split_once(char::is_whitespace) {
        Some((field, value)) => (field, value.trim()),
        None => (rest, ""),
    };
    if field.is_empty() {
        return Err("expected <field> <value>".to_string());
    }
    let field = field.parse::<ProductField>().map_err(|err| err.to_string())?;
    Ok((field, value.to_string()))
}

fn required_id(rest: &str) -> Result<ProductId, String> {
    if rest.is_empty() {
        return Err("expected a product id".to_string());
    }
    Ok(ProductId::from(rest))
}

pub async fn run<R, W>(
    controller: &ProductListController,
    input: R,
    output: &mut W,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    output.write_all(b"type 'help' for commands\n").await?;
    output.write_all(b"> ").await?;
    output.flush().await?;

    while let Some(line) = lines.next_line().await? {
        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => {
                output.write_all(b"> ").await?;
                output.flush().await?;
                continue;
            }
            Err(message) => {
                output.write_all(format!("error: {message}\n> ").as_bytes()).await?;
                output.flush().await?;
                continue;
            }
        };
        if command == ShellCommand::Quit {
            break;
        }

        let reply = execute(controller, command).await;
        output.write_all(reply.as_bytes()).await?;
        output.write_all(b"> ").await?;
        output.flush().await?;
    }

    output.write_all(b"\n").await?;
    output.flush().await?;
    Ok(())
}

async fn execute(controller: &ProductListController, command: ShellCommand) -> String {
    let result = match command {
        ShellCommand::List => Ok(()),
        ShellCommand::New { field, value } => {
            controller.edit_new_field(field, &value).await;
            return format!("new: {}\n", view::render_draft(&controller.new_product().await));
        }
        ShellCommand::Add => controller.create().await,
        ShellCommand::Edit(id) => {
            if !controller.select_for_edit_by_id(&id).await {
                return format!("error: no product with id {id}\n");
            }
            return edit_line(controller).await;
        }
        ShellCommand::Set { field, value } => {
            if !controller.edit_field(field, &value).await {
                return "error: no product is being edited (use 'edit <id>')\n".to_string();
            }
            return edit_line(controller).await;
        }
        ShellCommand::Update => {
            if controller.editing_product().await.is_none() {
                return "error: no product is being edited (use 'edit <id>')\n".to_string();
            }
            controller.update().await
        }
        ShellCommand::Cancel => {
            controller.cancel_edit().await;
            return "edit cancelled\n".to_string();
        }
        ShellCommand::Delete(id) => controller.delete(&id).await,
        ShellCommand::Drafts => {
            let state = controller.snapshot().await;
            let editing = state
                .editing_product
                .as_ref()
                .map(view::render_edit)
                .unwrap_or_else(|| "(none)".to_string());
            return format!(
                "new: {}\nediting: {editing}\n",
                view::render_draft(&state.new_product)
            );
        }
        ShellCommand::Help => return HELP.to_string(),
        ShellCommand::Quit => return String::new(),
    };

    let mut reply = match result {
        Ok(()) => String::new(),
        Err(err) => format!("error: {err}\n"),
    };
    reply.push_str(&view::render_table(&controller.products().await));
    reply
}

async fn edit_line(controller: &ProductListController) -> String {
    match controller.editing_product().await {
        Some(product) => format!("editing: {}\n", view::render_edit(&product)),
        None => "editing: (none)\n".to_string(),
    }
}

#[cfg(test)]
#[path = "tests/shell_tests.rs"]
mod tests;
