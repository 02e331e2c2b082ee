//! Filters available to every template

use std::collections::HashMap;
use tera::{Error, Result, Value};

/// `indent(spaces=N)`: pad the first line and every line after a newline.
pub fn indent_filter(value: &Value, args: &HashMap<String, Value>) -> Result<Value> {
    let text = value
        .as_str()
        .ok_or_else(|| Error::msg(format!("indent expects a string, got {value}")))?;
    let spaces = args
        .get("spaces")
        .ok_or_else(|| Error::msg("indent requires a `spaces` argument"))?
        .as_u64()
        .ok_or_else(|| Error::msg("indent `spaces` must be a non-negative integer"))?;

    Ok(Value::String(indent(text, spaces as usize)))
}

/// `join(sep=S)`: join a list of strings with `sep`.
pub fn join_filter(value: &Value, args: &HashMap<String, Value>) -> Result<Value> {
    let items = value
        .as_array()
        .ok_or_else(|| Error::msg(format!("join expects a list, got {value}")))?;
    let sep = args
        .get("sep")
        .ok_or_else(|| Error::msg("join requires a `sep` argument"))?
        .as_str()
        .ok_or_else(|| Error::msg("join `sep` must be a string"))?;

    let parts = items
        .iter()
        .map(|item| {
            item.as_str()
                .ok_or_else(|| Error::msg(format!("join expects strings, got {item}")))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Value::String(parts.join(sep)))
}

pub fn trim_filter(value: &Value, args: &HashMap<String, Value>) -> Result<Value> {
    if !args.is_empty() {
        return Err(Error::msg("trim takes no arguments"));
    }
    let text = value
        .as_str()
        .ok_or_else(|| Error::msg(format!("trim expects a string, got {value}")))?;
    Ok(Value::String(text.trim().to_string()))
}

fn indent(text: &str, spaces: usize) -> String {
    let pad = " ".repeat(spaces);
    format!("{pad}{}", text.replace('\n', &format!("\n{pad}")))
}
