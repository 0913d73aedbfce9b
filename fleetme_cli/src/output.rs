use comfy_table::{Table, presets::UTF8_FULL};
use fleetme_core::form::{FormState, ToastKind};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Table,
    Json,
}

impl Format {
    pub fn from_json_flag(json: bool) -> Self {
        if json { Format::Json } else { Format::Table }
    }
}

pub fn table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(header.to_vec());
    table
}

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Prints a form action result. A failed action becomes an error so the
/// process exits non-zero.
pub fn print_state(state: &FormState, format: Format) -> anyhow::Result<()> {
    if format == Format::Json {
        print_json(state)?;
    } else {
        for (field, messages) in state.errors.iter() {
            for message in messages {
                eprintln!("  {field}: {message}");
            }
        }
    }

    let message = state.message.clone().unwrap_or_default();
    match &state.toast {
        Some(toast) if toast.kind == ToastKind::Success => {
            if format == Format::Table {
                println!("{message}");
            }
            Ok(())
        }
        _ => anyhow::bail!("{message}"),
    }
}

pub fn or_dash(value: Option<&str>) -> String {
    value.unwrap_or("-").to_owned()
}
