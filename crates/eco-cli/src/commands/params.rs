use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use eco_simulation::{PARAMETER_NAMES, SimConfig};

pub fn run(config: Option<&Path>) -> Result<(), String> {
    let config = super::load_config(config)?;
    let defaults = SimConfig::default();

    println!(
        "  {} {}",
        "Parameters".bold(),
        format!("({} tunable)", PARAMETER_NAMES.len()).dimmed()
    );
    println!();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Name", "Value", "Default"]);
    for &name in PARAMETER_NAMES {
        let value = config.get_parameter(name);
        let default = defaults.get_parameter(name);
        let shown = format_value(value);
        let shown = if value == default {
            shown
        } else {
            shown.yellow().to_string()
        };
        table.add_row(vec![name.to_string(), shown, format_value(default)]);
    }
    println!("{table}");
    Ok(())
}

fn format_value(value: Option<f64>) -> String {
    value.map_or_else(|| "--".to_string(), |v| v.to_string())
}
